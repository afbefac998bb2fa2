//! rimpatch CLI
//!
//! Command-line driver for the patch interpreter and the assembly pipeline.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rimpatch_core::logging_facility::{init, Profile};

#[derive(Parser)]
#[command(name = "rimpatch")]
#[command(about = "Merge XML definitions and apply patch operations", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one operation file to one definition file
    Patch(commands::patch::PatchArgs),
    /// Run the merge-then-patch pipeline described by a manifest
    Assemble(commands::assemble::AssembleArgs),
    /// Version parsing and nearest-version selection
    Version(commands::version::VersionArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Patch(args) => commands::patch::execute(args),
        Commands::Assemble(args) => commands::assemble::execute(args),
        Commands::Version(args) => commands::version::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
