// SPDX-License-Identifier: Apache-2.0
//! FVS session control.
//!
//! An [`FvsSession`] owns a loaded library and every piece of state the
//! native calls read or write: the run status code, the restart code, the
//! last stop-point request and the loaded keyfile. Sessions are created via
//! [`FvsSession::open`] and release the library when dropped.
//!
//! The protocol is:
//!
//! ```text
//! open ─▶ load_keyfile ─▶ [set_stop_point_codes] ─▶ run ─▶ run ─▶ … ─▶ run
//!            ▲                                                        │
//!            └──────────── status Finished or Error ◀─────────────────┘
//! ```
//!
//! Each `run` steps the engine until it pauses at a stop point, finishes a
//! stand (restart code 100) or leaves the running state. Once every stand
//! is done, one more `run` moves the status to finished and lets the engine
//! finalize its output files.

use std::cell::Cell;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};

use crate::error::{FvsError, Result};
use crate::ffi;
use crate::library::FvsLibrary;
use crate::status::{
    LoopControl, RestartCode, RunOutcome, RunStatus, StopPointRequest, next_control,
};

/// A keyfile handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyfile {
    /// Absolute path passed on the command line.
    pub path: PathBuf,
    /// Raw file content, read when the keyfile was loaded.
    pub content: String,
}

/// Dimension counts reported by `fvsDimSizes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub ntrees: i32,
    pub ncycles: i32,
    pub nplots: i32,
    pub maxtrees: i32,
    pub maxspecies: i32,
    pub maxplots: i32,
    pub maxcycles: i32,
}

/// Identifiers of the stand currently (or most recently) in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandIdentifiers {
    pub stand_id: String,
    pub stand_cn: String,
    pub mgmt_id: String,
}

/// An active FVS engine session.
///
/// The engine keeps process-global state, so a session is `Send` but not
/// `Sync`: it can move to another thread but only one thread drives it.
/// Two sessions over *different* library files are independent; two over
/// the same file share engine state and must not be driven concurrently.
pub struct FvsSession {
    pub(crate) library: FvsLibrary,

    /// Run status code storage handed to the engine (`itrncd`).
    itrncd: Cell<c_int>,
    /// Last restart code read back from the engine.
    restart: Cell<c_int>,

    stop_point: Option<StopPointRequest>,
    keyfile: Option<Keyfile>,

    /// Whether `fvs` has been called since the keyfile was loaded.
    stepped: bool,
}

impl FvsSession {
    /// Load the library at `path` and start an idle session.
    ///
    /// # Errors
    ///
    /// Propagates [`FvsLibrary::load`] errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_library(FvsLibrary::load(path)?))
    }

    /// Start an idle session over an already-loaded library.
    pub fn with_library(library: FvsLibrary) -> Self {
        Self {
            library,
            itrncd: Cell::new(ffi::ITRNCD_NOT_STARTED),
            restart: Cell::new(ffi::RESTART_INITIAL),
            stop_point: None,
            keyfile: None,
            stepped: false,
        }
    }

    /// The underlying library.
    pub fn library(&self) -> &FvsLibrary {
        &self.library
    }

    /// Variant code of the loaded library.
    pub fn variant(&self) -> &str {
        self.library.variant()
    }

    /// The loaded keyfile, if any.
    pub fn keyfile(&self) -> Option<&Keyfile> {
        self.keyfile.as_ref()
    }

    /// Absolute path of the loaded keyfile, if any.
    pub fn keyfile_path(&self) -> Option<&Path> {
        self.keyfile.as_ref().map(|k| k.path.as_path())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Hand a keyfile to the engine.
    ///
    /// Reads the file, then calls `fvsSetCmdLine` with
    /// `--keywordfile=<absolute path>`. The engine updates the run status
    /// code synchronously (0 on success). Calling again starts over with
    /// new input.
    ///
    /// # Errors
    ///
    /// [`FvsError::Io`] if the file cannot be read. An engine that rejects
    /// the keyfile is not an error: [`FvsSession::status`] reports it.
    pub fn load_keyfile(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = std::path::absolute(path.as_ref())?;
        let content = std::fs::read_to_string(&path)?;

        let cmdline = format!("--keywordfile={}", path.display());
        let nch = to_c_len(cmdline.len())?;
        let cmdline = CString::new(cmdline)
            .map_err(|_| FvsError::InvalidArgument("keyfile path contains a NUL byte".into()))?;

        let mut itrncd = self.itrncd.get();
        // SAFETY: `cmdline` is NUL-terminated and `nch` bytes long; the
        // out-pointer refers to a live local.
        unsafe { (self.library.fn_set_cmd_line())(cmdline.as_ptr(), &nch, &mut itrncd) };
        self.itrncd.set(itrncd);

        tracing::info!(
            "loaded keyfile '{}' into variant {} (return code {itrncd})",
            path.display(),
            self.variant()
        );

        self.keyfile = Some(Keyfile { path, content });
        self.stepped = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stop points
    // -----------------------------------------------------------------------

    /// Tell the engine where and when to pause.
    ///
    /// `code` must be in `-1..=7` (-1 every stop point, 0 never). `year` is
    /// 0 (never), -1 (every cycle) or a calendar year, and may only be given
    /// together with `code`. Omitting both keeps the previous request; a
    /// `code` without a `year` pauses in every cycle.
    ///
    /// # Errors
    ///
    /// [`FvsError::InvalidStopPointCode`] or [`FvsError::YearWithoutCode`];
    /// in both cases nothing is sent to the engine.
    pub fn set_stop_point_codes(&mut self, code: Option<i32>, year: Option<i32>) -> Result<()> {
        let request = StopPointRequest::resolve(self.stop_point.as_ref(), code, year)?;

        let spptcd: c_int = request.code.code();
        let spptyr: c_int = request.year.code();
        // SAFETY: both pointers refer to live locals.
        unsafe { (self.library.fn_set_stoppoint_codes())(&spptcd, &spptyr) };

        tracing::debug!("stop point set to code {spptcd}, year {spptyr}");
        self.stop_point = Some(request);
        Ok(())
    }

    /// Last stop-point code sent to the engine.
    pub fn stop_point_code(&self) -> Option<i32> {
        self.stop_point.map(|r| r.code.code())
    }

    /// Last stop-point year sent to the engine.
    pub fn stop_point_year(&self) -> Option<i32> {
        self.stop_point.map(|r| r.year.code())
    }

    /// Last stop-point request sent to the engine.
    pub fn stop_point(&self) -> Option<StopPointRequest> {
        self.stop_point
    }

    // -----------------------------------------------------------------------
    // Run loop
    // -----------------------------------------------------------------------

    /// Drive the engine forward.
    ///
    /// Applies the stop point first (see [`FvsSession::set_stop_point_codes`]),
    /// then calls `fvs` while the status is running, re-reading status and
    /// restart code after every call, until the restart code becomes
    /// non-zero or the status leaves running.
    ///
    /// An engine error (status 1) is returned as an ordinary outcome.
    ///
    /// # Errors
    ///
    /// [`FvsError::NoKeyfile`] before [`FvsSession::load_keyfile`], or a
    /// stop-point validation error.
    pub fn run(&mut self, code: Option<i32>, year: Option<i32>) -> Result<RunOutcome> {
        if self.keyfile.is_none() {
            return Err(FvsError::NoKeyfile);
        }
        self.set_stop_point_codes(code, year)?;

        let mut steps = 0;
        let mut status = self.status();
        let mut restart = RestartCode::from_code(self.restart.get());

        while next_control(status, restart, steps) == LoopControl::Step {
            let mut itrncd = self.itrncd.get();
            // SAFETY: the out-pointer refers to a live local.
            unsafe { (self.library.fn_fvs())(&mut itrncd) };
            self.itrncd.set(itrncd);
            self.stepped = true;
            steps += 1;

            status = self.status();
            restart = self.restart();
            tracing::debug!("step {steps}: status {status}, restart {restart}");
        }

        match status {
            RunStatus::Error => tracing::warn!("engine reported an error state after {steps} step(s)"),
            RunStatus::Finished => tracing::info!("engine finished all stands"),
            RunStatus::Other(code) => tracing::warn!("engine reported unknown status code {code}"),
            RunStatus::NotStarted | RunStatus::Running => {}
        }

        Ok(RunOutcome {
            status,
            restart,
            steps,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current run status, read from the engine.
    pub fn status(&self) -> RunStatus {
        RunStatus::from_code(self.status_code())
    }

    /// Current raw run status code (`itrncd`), read from the engine.
    pub fn status_code(&self) -> i32 {
        let mut itrncd = self.itrncd.get();
        // SAFETY: the out-pointer refers to a live local.
        unsafe { (self.library.fn_get_rtn_code())(&mut itrncd) };
        self.itrncd.set(itrncd);
        itrncd
    }

    /// Why the engine last returned control, read from the engine.
    pub fn restart(&self) -> RestartCode {
        RestartCode::from_code(self.restart_code())
    }

    /// Raw restart code, read from the engine.
    pub fn restart_code(&self) -> i32 {
        let mut code = self.restart.get();
        // SAFETY: the out-pointer refers to a live local.
        unsafe { (self.library.fn_get_restart_code())(&mut code) };
        self.restart.set(code);
        code
    }

    /// The engine's exit code (`fvsGetICCode`).
    ///
    /// # Errors
    ///
    /// [`FvsError::NoKeyfile`] before a keyfile is loaded.
    pub fn exit_code(&self) -> Result<i32> {
        self.require_keyfile()?;
        let mut code: c_int = 0;
        // SAFETY: the out-pointer refers to a live local.
        unsafe { (self.library.fn_get_ic_code())(&mut code) };
        Ok(code)
    }

    /// Current dimension counts and static maxima.
    ///
    /// Before the first `run` only the maxima are populated.
    ///
    /// # Errors
    ///
    /// [`FvsError::NoKeyfile`] before a keyfile is loaded.
    pub fn dimensions(&self) -> Result<Dimensions> {
        self.require_keyfile()?;
        let mut d = Dimensions::default();
        // SAFETY: every out-pointer refers to a field of a live local.
        unsafe {
            (self.library.fn_dim_sizes())(
                &mut d.ntrees,
                &mut d.ncycles,
                &mut d.nplots,
                &mut d.maxtrees,
                &mut d.maxspecies,
                &mut d.maxplots,
                &mut d.maxcycles,
            );
        }
        Ok(d)
    }

    /// Identifiers of the stand in memory.
    ///
    /// # Errors
    ///
    /// [`FvsError::NoKeyfile`] before a keyfile is loaded, and
    /// [`FvsError::NoInventory`] before the first `run` step.
    pub fn stand_ids(&self) -> Result<StandIdentifiers> {
        self.require_inventory()?;

        let mut sid = [0 as c_char; ffi::STAND_ID_LEN + 1];
        let mut scn = [0 as c_char; ffi::STAND_CN_LEN + 1];
        let mut mid = [0 as c_char; ffi::MGMT_ID_LEN + 1];
        let (mut ncsid, mut nccn, mut ncmid): (c_int, c_int, c_int) = (0, 0, 0);

        // SAFETY: each buffer has room for its fixed field width plus a NUL,
        // and every length out-pointer refers to a live local.
        unsafe {
            (self.library.fn_stand_id())(
                sid.as_mut_ptr(),
                scn.as_mut_ptr(),
                mid.as_mut_ptr(),
                &mut ncsid,
                &mut nccn,
                &mut ncmid,
            );
        }

        Ok(StandIdentifiers {
            stand_id: fixed_field(&sid, ncsid),
            stand_cn: fixed_field(&scn, nccn),
            mgmt_id: fixed_field(&mid, ncmid),
        })
    }

    pub(crate) fn require_keyfile(&self) -> Result<&Keyfile> {
        self.keyfile.as_ref().ok_or(FvsError::NoKeyfile)
    }

    pub(crate) fn require_inventory(&self) -> Result<()> {
        self.require_keyfile()?;
        if self.stepped {
            Ok(())
        } else {
            Err(FvsError::NoInventory)
        }
    }
}

impl std::fmt::Debug for FvsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FvsSession")
            .field("variant", &self.variant())
            .field("itrncd", &self.itrncd.get())
            .field("restart", &self.restart.get())
            .field("stop_point", &self.stop_point)
            .field("keyfile", &self.keyfile_path())
            .finish_non_exhaustive()
    }
}

impl Drop for FvsSession {
    fn drop(&mut self) {
        tracing::debug!(
            "closing session on variant {} (last status {})",
            self.library.variant(),
            self.itrncd.get()
        );
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a Rust length to the engine's `int` length argument.
pub(crate) fn to_c_len(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| FvsError::InvalidArgument(format!("length {len} exceeds C int range")))
}

/// Decode a fixed-width character field, honouring the returned length and
/// trimming Fortran blank padding.
pub(crate) fn fixed_field(buf: &[c_char], len: c_int) -> String {
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    let bytes: Vec<u8> = buf[..len].iter().map(|&c| c as u8).collect();
    let text = String::from_utf8_lossy(&bytes);
    text.trim_end_matches(['\0', ' ']).to_string()
}
