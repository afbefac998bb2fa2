//! Version command
//!
//! Usage: rimpatch version nearest <TARGET> <CANDIDATE>... | rimpatch version parse <TEXT>

use clap::{Args, Subcommand};
use rimpatch_core::Version;

#[derive(Debug, Args)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub command: VersionCommand,
}

#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// Print the candidate that best serves the target version
    Nearest(NearestArgs),
    /// Parse a version and print its canonical form
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
pub struct NearestArgs {
    /// Running version
    pub target: String,

    /// Available versions
    #[arg(required = true)]
    pub candidates: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    pub text: String,
}

/// Execute version command
pub fn execute(args: VersionArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        VersionCommand::Nearest(nearest_args) => execute_nearest(nearest_args),
        VersionCommand::Parse(parse_args) => execute_parse(parse_args),
    }
}

fn execute_nearest(args: NearestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target = Version::parse(&args.target)?;
    let candidates = args
        .candidates
        .iter()
        .map(|c| Version::parse(c))
        .collect::<Result<Vec<_>, _>>()?;

    match target.nearest(&candidates) {
        Some(found) => {
            println!("{}", found);
            Ok(())
        }
        None => Err(format!("no candidate serves version {}", target).into()),
    }
}

fn execute_parse(args: ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let version = Version::parse(&args.text)?;
    println!("{}", version);
    let numbers: Vec<String> = version.numbers().iter().map(|n| n.to_string()).collect();
    println!("numbers: {}", numbers.join(" "));
    if !version.tags().is_empty() {
        println!("tags: {}", version.tags().join(" "));
    }
    Ok(())
}
