// SPDX-License-Identifier: Apache-2.0
//! Error types for FVS library binding and session control.
//!
//! Only local failures become errors. An engine that reports run status 1
//! is in a normal, inspectable state and never turns into an [`FvsError`].

/// Hint appended to the missing-routine listing.
pub(crate) const MISSING_ROUTINES_HINT: &str = "are needed routines that are not available in library, \
     (maybe they weren't exported when library was built)";

/// Errors arising from FVS library loading and session operations.
#[derive(Debug, thiserror::Error)]
pub enum FvsError {
    #[error("failed to load FVS library at '{path}': {cause}")]
    LoadFailed { path: String, cause: String },

    #[error("{} {}", .missing.join(", "), MISSING_ROUTINES_HINT)]
    MissingRoutines { missing: Vec<String> },

    #[error("invalid stop point code {0}; expected a value in -1..=7")]
    InvalidStopPointCode(i32),

    #[error("stop point year {0} was given without a stop point code")]
    YearWithoutCode(i32),

    #[error("no keyfile loaded; call load_keyfile first")]
    NoKeyfile,

    #[error("no inventory data loaded yet; call run first")]
    NoInventory,

    #[error("{routine} rejected '{name}' (return code {code})")]
    Attribute {
        routine: &'static str,
        name: String,
        code: i32,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FvsError {
    /// Whether this error is a local precondition failure (no keyfile, no inventory).
    pub fn is_precondition(&self) -> bool {
        matches!(self, FvsError::NoKeyfile | FvsError::NoInventory)
    }

    /// Whether this error is a stop-point validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FvsError::InvalidStopPointCode(_) | FvsError::YearWithoutCode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FvsError>;
