//! FVS Command-Line Interface
//!
//! Drives a Forest Vegetation Simulator variant library from the shell:
//! inspect which routines a library exports, run a keyfile stand by stand,
//! or peek at the inventory dimensions.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::common::RunInputs;
use commands::{dims, inspect, run, version};
use config::CliConfig;

/// fvs - drive Forest Vegetation Simulator shared libraries
#[derive(Parser)]
#[command(name = "fvs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.fvs/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a library and show how each routine resolved
    Inspect {
        /// FVS variant library (e.g. FVSpn.so)
        library: PathBuf,
    },

    /// Run a keyfile until the engine finishes
    Run {
        /// FVS variant library
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Keyfile to run
        #[arg(short, long)]
        keyfile: Option<PathBuf>,

        /// Stop-point code (-1 every location, 0 never, 1-7 a specific point)
        #[arg(long, allow_hyphen_values = true)]
        stop_code: Option<i32>,

        /// Stop-point year (-1 every cycle, 0 never, or a calendar year)
        #[arg(long, allow_hyphen_values = true)]
        stop_year: Option<i32>,

        /// Maximum number of run calls
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Load the inventory and show dimension counts
    Dims {
        /// FVS variant library
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Keyfile to load
        #[arg(short, long)]
        keyfile: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let result = CliConfig::load(cli.config.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|config| {
            init_logging(cli.verbose, config.log_level.as_deref());
            execute(cli.command, &config)
        });

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// `-v` wins, then `RUST_LOG`, then the configured level.
fn init_logging(verbose: u8, configured: Option<&str>) {
    let filter = match verbose {
        0 => match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(configured.unwrap_or("warn")),
        },
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(command: Commands, config: &CliConfig) -> anyhow::Result<()> {
    match command {
        Commands::Inspect { library } => inspect::execute(&library),

        Commands::Run {
            library,
            keyfile,
            stop_code,
            stop_year,
            max_steps,
        } => {
            let inputs = RunInputs::resolve(config, library, keyfile, stop_code, stop_year)?;
            run::execute(&inputs, max_steps)
        }

        Commands::Dims { library, keyfile } => {
            let inputs = RunInputs::resolve(config, library, keyfile, None, None)?;
            dims::execute(&inputs)
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
