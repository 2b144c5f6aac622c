//! Dims command implementation.

use anyhow::Result;
use console::style;

use fvs_ffi::StopPoint;

use super::common::{RunInputs, open_session};

/// Execute the dims command: stop right after the inventory is loaded.
pub fn execute(inputs: &RunInputs) -> Result<()> {
    let mut fvs = open_session(inputs)?;

    let outcome = fvs.run(Some(StopPoint::AfterInventoryLoad.code()), None)?;
    if outcome.stopped_at() != Some(StopPoint::AfterInventoryLoad) {
        anyhow::bail!(
            "Engine did not pause after loading the inventory (status {}, restart {})",
            outcome.status,
            outcome.restart
        );
    }

    let ids = fvs.stand_ids()?;
    let dims = fvs.dimensions()?;
    let svs = fvs.svs_dimensions()?;

    println!(
        "{} Stand {} (variant {})",
        style("✓").green().bold(),
        style(&ids.stand_id).cyan(),
        style(fvs.variant()).yellow()
    );
    println!();
    println!("  {:<10} {:>8} {:>8}", "", "current", "max");
    println!("  {:<10} {:>8} {:>8}", "trees", dims.ntrees, dims.maxtrees);
    println!("  {:<10} {:>8} {:>8}", "cycles", dims.ncycles, dims.maxcycles);
    println!("  {:<10} {:>8} {:>8}", "plots", dims.nplots, dims.maxplots);
    println!("  {:<10} {:>8} {:>8}", "species", "", dims.maxspecies);
    println!("  {:<10} {:>8} {:>8}", "svs objs", svs.nsvsobjs, svs.mxsvsobjs);
    println!("  {:<10} {:>8} {:>8}", "snags", svs.ndeadobjs, svs.mxdeadobjs);
    println!("  {:<10} {:>8} {:>8}", "cwd", svs.ncwdobjs, svs.mxcwdobjs);
    Ok(())
}
