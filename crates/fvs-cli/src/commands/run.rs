//! Run command implementation.

use anyhow::Result;
use console::style;

use fvs_ffi::RunStatus;

use super::common::{RunInputs, open_session, print_outcome};

/// Execute the run command.
///
/// Calls `run` until the status leaves running, which includes the final
/// call that lets the engine close its output files.
pub fn execute(inputs: &RunInputs, max_steps: Option<usize>) -> Result<()> {
    let mut fvs = open_session(inputs)?;
    println!(
        "{} Running {} with variant {}",
        style("→").cyan().bold(),
        style(inputs.keyfile.display()).green(),
        style(fvs.variant()).yellow()
    );

    let mut calls = 0;
    let mut stands = 0;
    let status = loop {
        if max_steps.is_some_and(|max| calls >= max) {
            println!(
                "\n{} Stopped after {} run call(s)",
                style("!").yellow().bold(),
                calls
            );
            return Ok(());
        }

        let outcome = fvs.run(inputs.stop_code, inputs.stop_year)?;
        calls += 1;
        if outcome.stand_complete() {
            stands += 1;
        }
        print_outcome(&fvs, calls, &outcome);

        if outcome.status != RunStatus::Running {
            break outcome.status;
        }
    };

    match status {
        RunStatus::Finished => {
            println!(
                "\n{} Finished {} stand(s) in {} run call(s)",
                style("✓").green().bold(),
                stands,
                calls
            );
            Ok(())
        }
        other => {
            let exit_code = fvs.exit_code()?;
            anyhow::bail!("Engine stopped in state '{other}' (exit code {exit_code})")
        }
    }
}
