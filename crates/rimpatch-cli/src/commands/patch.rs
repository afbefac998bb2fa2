//! Patch command
//!
//! Usage: rimpatch patch --defs <FILE> --patch <FILE> [--active <ID>]... [--name <NAME>]...

use super::{emit, render};
use clap::Args;
use rimpatch_core::{
    patch, ActiveContext, Document, OperationParser, ResultSummary, UnknownOperationPolicy,
};
use rimpatch_engine::fs_unit::read_xml;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PatchArgs {
    /// Definition file to patch
    #[arg(long)]
    pub defs: PathBuf,

    /// Operation file to apply
    #[arg(long)]
    pub patch: PathBuf,

    /// Active unit id (repeatable)
    #[arg(long = "active")]
    pub active: Vec<String>,

    /// Active unit display name (repeatable)
    #[arg(long = "name")]
    pub names: Vec<String>,

    /// Drop operations with unknown classes instead of failing
    #[arg(long)]
    pub skip_unknown: bool,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Indent the written document
    #[arg(long)]
    pub pretty: bool,
}

/// Execute patch command
pub fn execute(args: PatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let defs = read_xml(&args.defs)?;
    let operations = read_xml(&args.patch)?;

    let policy = if args.skip_unknown {
        UnknownOperationPolicy::Skip
    } else {
        UnknownOperationPolicy::Fail
    };
    let parser = OperationParser::new(policy);
    let context = ActiveContext::new(&args.active, &args.names);

    let mut document = Document::from_node(&defs);
    let results = patch(&mut document, &operations, &parser, &context)?;

    // Per-operation outcomes on stderr, one JSON object per line
    for result in &results {
        let summary: ResultSummary = result.summary();
        eprintln!("{}", serde_json::to_string(&summary)?);
    }

    let xml = document.to_xml();
    emit(&render(&xml, args.pretty), args.output.as_deref())?;
    eprintln!("digest: {}", xml.digest());

    Ok(())
}
