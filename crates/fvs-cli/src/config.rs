//! Configuration for the `fvs` command.
//!
//! Supports loading configuration from:
//! 1. A YAML file (`--config`, else `~/.fvs/config.yaml` when present)
//! 2. Environment variables (with FVS_ prefix)
//!
//! Precedence (highest to lowest): command-line flags, environment
//! variables, configuration file, defaults. Flags are applied by the
//! commands themselves; this module covers the rest.

use std::path::{Path, PathBuf};

use fvs_ffi::StopPointCode;
use serde::{Deserialize, Serialize};

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR: &str = ".fvs";
pub const CONFIG_FILE: &str = "config.yaml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Everything `fvs` can take from a file or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// FVS variant library, e.g. `/opt/fvs/lib/FVSpn.so`
    #[serde(default)]
    pub library: Option<PathBuf>,

    /// Keyfile to run
    #[serde(default)]
    pub keyfile: Option<PathBuf>,

    /// Where the engine should pause
    #[serde(default)]
    pub stop_point: StopPointConfig,

    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Stop-point request as written in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopPointConfig {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl CliConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let config: CliConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// `~/.fvs/config.yaml`, if the home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration with the following precedence:
    /// 1. Explicit file if provided, else the default file if it exists
    /// 2. Environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!("reading configuration from {}", path.display());
                    Self::from_file(path)?
                }
                _ => Self::default(),
            },
        };

        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `FVS_*` environment variables into this configuration.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Only variables that are present
    /// replace the corresponding fields.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FVS_LIBRARY") {
            self.library = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FVS_KEYFILE") {
            self.keyfile = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FVS_STOP_CODE") {
            self.stop_point.code = Some(parse_int("FVS_STOP_CODE", &v)?);
        }
        if let Some(v) = lookup("FVS_STOP_YEAR") {
            self.stop_point.year = Some(parse_int("FVS_STOP_YEAR", &v)?);
        }
        if let Some(v) = lookup("FVS_LOG_LEVEL") {
            self.log_level = Some(v);
        }
        Ok(self)
    }

    /// Validate configuration values.
    ///
    /// A configured stop-point code must be one the session accepts. The
    /// year-needs-a-code rule is checked once flags are merged in, since a
    /// `--stop-code` flag can complete a configured year.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {level}"
                )));
            }
        }

        if let Some(code) = self.stop_point.code {
            StopPointCode::try_from(code)
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<i32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} must be an integer, got '{value}'")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
