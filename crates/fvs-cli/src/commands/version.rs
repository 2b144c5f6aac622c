//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Forest Vegetation Simulator driver",
        style("fvs").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  fvs-ffi   Library loading, routine resolution and session control");
    println!("  fvs-cli   Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
