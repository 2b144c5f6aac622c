// SPDX-License-Identifier: Apache-2.0
//! Typed views of the engine's run status, restart and stop-point codes,
//! plus the run-loop state machine.

use std::fmt;

use crate::error::{FvsError, Result};
use crate::ffi;

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

/// Coarse engine state, read from `fvsGetRtnCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// -1: no input has been supplied yet.
    NotStarted,
    /// 0: good running state.
    Running,
    /// 1: the engine detected an error and must be reset with new input.
    Error,
    /// 2: all stands processed; new input may be supplied.
    Finished,
    /// Any other value the engine reported.
    Other(i32),
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            ffi::ITRNCD_NOT_STARTED => RunStatus::NotStarted,
            ffi::ITRNCD_GOOD => RunStatus::Running,
            ffi::ITRNCD_ERROR => RunStatus::Error,
            ffi::ITRNCD_FINISHED => RunStatus::Finished,
            other => RunStatus::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            RunStatus::NotStarted => ffi::ITRNCD_NOT_STARTED,
            RunStatus::Running => ffi::ITRNCD_GOOD,
            RunStatus::Error => ffi::ITRNCD_ERROR,
            RunStatus::Finished => ffi::ITRNCD_FINISHED,
            RunStatus::Other(code) => code,
        }
    }

    /// Whether the engine can accept a new keyfile without losing work.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            RunStatus::NotStarted | RunStatus::Error | RunStatus::Finished
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NotStarted => write!(f, "not started (-1)"),
            RunStatus::Running => write!(f, "running (0)"),
            RunStatus::Error => write!(f, "error (1)"),
            RunStatus::Finished => write!(f, "finished (2)"),
            RunStatus::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stop points
// ---------------------------------------------------------------------------

/// A location within the simulation where the engine can pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StopPoint {
    /// 1: beginning of a cycle, before the first event monitor call.
    CycleStart = 1,
    /// 2: after the first event monitor call.
    AfterFirstEvmon = 2,
    /// 3: just before the second event monitor call.
    BeforeSecondEvmon = 3,
    /// 4: after the second event monitor call.
    AfterSecondEvmon = 4,
    /// 5: growth and mortality computed but not yet applied.
    BeforeGrowthApplied = 5,
    /// 6: just before establishment.
    BeforeEstablishment = 6,
    /// 7: inventory loaded, before the first cycle.
    AfterInventoryLoad = 7,
}

impl StopPoint {
    pub const ALL: [StopPoint; ffi::STOP_CODE_MAX as usize] = [
        StopPoint::CycleStart,
        StopPoint::AfterFirstEvmon,
        StopPoint::BeforeSecondEvmon,
        StopPoint::AfterSecondEvmon,
        StopPoint::BeforeGrowthApplied,
        StopPoint::BeforeEstablishment,
        StopPoint::AfterInventoryLoad,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        if !(1..=ffi::STOP_CODE_MAX).contains(&code) {
            return None;
        }
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Where the engine should pause (`spptcd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopPointCode {
    /// -1: at every stop point.
    Every,
    /// 0: never.
    Never,
    /// 1..=7: at one specific stop point.
    At(StopPoint),
}

impl StopPointCode {
    pub fn code(self) -> i32 {
        match self {
            StopPointCode::Every => ffi::STOP_CODE_EVERY,
            StopPointCode::Never => ffi::STOP_CODE_NEVER,
            StopPointCode::At(point) => point.code(),
        }
    }
}

impl TryFrom<i32> for StopPointCode {
    type Error = FvsError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            ffi::STOP_CODE_EVERY => Ok(StopPointCode::Every),
            ffi::STOP_CODE_NEVER => Ok(StopPointCode::Never),
            other => StopPoint::from_code(other)
                .map(StopPointCode::At)
                .ok_or(FvsError::InvalidStopPointCode(other)),
        }
    }
}

/// When the engine should pause (`spptyr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopYear {
    /// 0: never.
    Never,
    /// -1: in every cycle.
    EveryCycle,
    /// In the cycle containing this calendar year.
    Year(i32),
}

impl StopYear {
    pub fn code(self) -> i32 {
        match self {
            StopYear::Never => ffi::STOP_YEAR_NEVER,
            StopYear::EveryCycle => ffi::STOP_YEAR_EVERY_CYCLE,
            StopYear::Year(year) => year,
        }
    }
}

impl From<i32> for StopYear {
    fn from(year: i32) -> Self {
        match year {
            ffi::STOP_YEAR_NEVER => StopYear::Never,
            ffi::STOP_YEAR_EVERY_CYCLE => StopYear::EveryCycle,
            year => StopYear::Year(year),
        }
    }
}

/// The stop point most recently sent to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StopPointRequest {
    pub code: StopPointCode,
    pub year: StopYear,
}

impl StopPointRequest {
    /// The request in effect before any explicit one: never pause.
    pub const NEVER: StopPointRequest = StopPointRequest {
        code: StopPointCode::Never,
        year: StopYear::EveryCycle,
    };

    /// Apply the update rules for one `set_stop_point_codes` call.
    ///
    /// * `code`, when given, must lie in `-1..=7`.
    /// * `year` may only be given together with `code` in the same call.
    /// * Omitting both keeps the previous request unchanged, or 0 (never)
    ///   with -1 (every cycle) if there is none.
    /// * A `code` given without a `year` pauses in every cycle (-1).
    pub fn resolve(
        previous: Option<&StopPointRequest>,
        code: Option<i32>,
        year: Option<i32>,
    ) -> Result<Self> {
        match (code, year) {
            (Some(code), year) => Ok(Self {
                code: StopPointCode::try_from(code)?,
                year: year.map_or(StopYear::EveryCycle, StopYear::from),
            }),
            (None, Some(year)) => Err(FvsError::YearWithoutCode(year)),
            (None, None) => Ok(previous.copied().unwrap_or(Self::NEVER)),
        }
    }
}

// ---------------------------------------------------------------------------
// Restart code
// ---------------------------------------------------------------------------

/// Why the engine last returned control, read from `fvsGetRestartCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestartCode {
    /// 0: not stopped yet.
    Initial,
    /// 1..=7: paused at a stop point.
    Stopped(StopPoint),
    /// 100: a stand was completely processed.
    StandComplete,
    /// Any other value the engine reported.
    Other(i32),
}

impl RestartCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            ffi::RESTART_INITIAL => RestartCode::Initial,
            ffi::RESTART_STAND_COMPLETE => RestartCode::StandComplete,
            other => StopPoint::from_code(other).map_or(RestartCode::Other(other), RestartCode::Stopped),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            RestartCode::Initial => ffi::RESTART_INITIAL,
            RestartCode::Stopped(point) => point.code(),
            RestartCode::StandComplete => ffi::RESTART_STAND_COMPLETE,
            RestartCode::Other(code) => code,
        }
    }
}

impl fmt::Display for RestartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartCode::Initial => write!(f, "initial (0)"),
            RestartCode::Stopped(point) => write!(f, "stopped at {point:?} ({})", point.code()),
            RestartCode::StandComplete => write!(f, "stand complete (100)"),
            RestartCode::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Result of one `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub restart: RestartCode,
    /// Native step calls made during this `run`.
    pub steps: usize,
}

impl RunOutcome {
    /// The call returned because a stand finished.
    pub fn stand_complete(&self) -> bool {
        self.status == RunStatus::Running && self.restart == RestartCode::StandComplete
    }

    /// The call returned at a requested stop point.
    pub fn stopped_at(&self) -> Option<StopPoint> {
        match (self.status, self.restart) {
            (RunStatus::Running, RestartCode::Stopped(point)) => Some(point),
            _ => None,
        }
    }
}

/// What the run loop does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    /// Call the native step routine again.
    Step,
    /// Return control to the caller.
    Yield,
}

/// Transition function of the run loop.
///
/// The loop steps only while the engine reports [`RunStatus::Running`], and
/// after at least one step yields as soon as the restart code is non-zero.
pub(crate) fn next_control(status: RunStatus, restart: RestartCode, steps: usize) -> LoopControl {
    if status != RunStatus::Running {
        return LoopControl::Yield;
    }
    if steps > 0 && restart != RestartCode::Initial {
        return LoopControl::Yield;
    }
    LoopControl::Step
}
