//! Assemble command
//!
//! Usage: rimpatch assemble --manifest <FILE> [--output <FILE>] [--report] [--pretty]

use super::{emit, render};
use clap::Args;
use rimpatch_engine::{assemble, DirUnit, RunManifest, Unit};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// Run manifest (TOML)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Output file for the assembled document (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the JSON assembly report to stdout; the document is then only
    /// written when --output is given
    #[arg(long)]
    pub report: bool,

    /// Indent the written document
    #[arg(long)]
    pub pretty: bool,
}

/// Execute assemble command
pub fn execute(args: AssembleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = RunManifest::load(&args.manifest)?;

    let units = manifest
        .units
        .iter()
        .map(DirUnit::load)
        .collect::<Result<Vec<_>, _>>()?;
    let unit_refs: Vec<&dyn Unit> = units.iter().map(|u| u as &dyn Unit).collect();

    let (run, report) = assemble(manifest.settings, &unit_refs)?;

    for file in report.failed_files() {
        eprintln!(
            "warning: {} failed: {}",
            file.path,
            file.error.as_deref().unwrap_or("unknown error")
        );
    }

    let document = render(&run.document().to_xml(), args.pretty);
    if args.report {
        if let Some(path) = args.output.as_deref() {
            emit(&document, Some(path))?;
        }
        println!("{}", report.to_json_pretty()?);
    } else {
        emit(&document, args.output.as_deref())?;
        eprintln!("digest: {}", report.digest);
    }

    Ok(())
}
