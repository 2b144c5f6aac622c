//! Shared helpers for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use fvs_ffi::{FvsSession, RunOutcome, StopPointRequest};

use crate::config::CliConfig;

/// Library, keyfile and stop point after flags, environment and file
/// have been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    pub library: PathBuf,
    pub keyfile: PathBuf,
    pub stop_code: Option<i32>,
    pub stop_year: Option<i32>,
}

impl RunInputs {
    /// Merge command-line flags over the loaded configuration.
    pub fn resolve(
        config: &CliConfig,
        library: Option<PathBuf>,
        keyfile: Option<PathBuf>,
        stop_code: Option<i32>,
        stop_year: Option<i32>,
    ) -> Result<Self> {
        let library = library.or_else(|| config.library.clone()).ok_or_else(|| {
            anyhow::anyhow!(
                "No FVS library given. Pass --library, set FVS_LIBRARY, or add `library:` to the config file"
            )
        })?;
        let keyfile = keyfile.or_else(|| config.keyfile.clone()).ok_or_else(|| {
            anyhow::anyhow!(
                "No keyfile given. Pass --keyfile, set FVS_KEYFILE, or add `keyfile:` to the config file"
            )
        })?;

        // Flags win field by field over the configured pair.
        let stop_code = stop_code.or(config.stop_point.code);
        let stop_year = stop_year.or(config.stop_point.year);
        StopPointRequest::resolve(None, stop_code, stop_year)
            .context("Invalid stop point")?;

        Ok(Self {
            library,
            keyfile,
            stop_code,
            stop_year,
        })
    }
}

/// Load the library and the keyfile.
pub fn open_session(inputs: &RunInputs) -> Result<FvsSession> {
    let mut fvs = FvsSession::open(&inputs.library)
        .with_context(|| format!("Failed to load FVS library: {}", inputs.library.display()))?;
    load_keyfile(&mut fvs, &inputs.keyfile)?;
    Ok(fvs)
}

fn load_keyfile(fvs: &mut FvsSession, keyfile: &Path) -> Result<()> {
    if !keyfile.exists() {
        anyhow::bail!("File not found: {}", keyfile.display());
    }
    fvs.load_keyfile(keyfile)
        .with_context(|| format!("Failed to read keyfile: {}", keyfile.display()))
}

/// Print one run outcome with whatever the engine can report about it.
pub fn print_outcome(fvs: &FvsSession, call: usize, outcome: &RunOutcome) {
    println!(
        "\n{} run {} ({} step{}): status {}, restart {}",
        style("→").cyan().bold(),
        call,
        outcome.steps,
        if outcome.steps == 1 { "" } else { "s" },
        style(outcome.status).yellow(),
        style(outcome.restart).yellow()
    );

    if let Ok(ids) = fvs.stand_ids() {
        println!(
            "  Stand:      {} (cn {}, mgmt {})",
            style(&ids.stand_id).green(),
            display_or_dash(&ids.stand_cn),
            display_or_dash(&ids.mgmt_id)
        );
    }
    if let Ok(dims) = fvs.dimensions() {
        println!(
            "  Dimensions: {} trees, {} cycles, {} plots",
            dims.ntrees, dims.ncycles, dims.nplots
        );
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
