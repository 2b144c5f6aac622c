//! Inspect command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use fvs_ffi::{FvsLibrary, Spelling};

/// Execute the inspect command.
pub fn execute(library: &Path) -> Result<()> {
    let lib = FvsLibrary::load(library)
        .with_context(|| format!("Failed to load FVS library: {}", library.display()))?;

    println!(
        "{} {} (variant {})",
        style("✓").green().bold(),
        style(lib.path().display()).cyan(),
        style(lib.variant()).yellow().bold()
    );
    println!();

    for resolved in lib.routines().iter() {
        let spelling = match resolved.spelling {
            Spelling::Plain => style("plain").dim(),
            Spelling::Decorated => style("decorated").magenta(),
        };
        println!(
            "  {:<22} {:<24} {}",
            resolved.routine.name(),
            resolved.symbol(),
            spelling
        );
    }

    let decorated = lib.routines().decorated_count();
    println!(
        "\n  {} routines resolved, {} under the decorated spelling",
        lib.routines().iter().count(),
        decorated
    );
    Ok(())
}
