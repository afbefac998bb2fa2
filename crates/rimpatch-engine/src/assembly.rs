//! Merge-then-patch assembly pipeline
//!
//! ## Pipeline (per unit, in run order):
//! 1. Select the unit's content folders for the running version
//! 2. Merge every definition file of those folders into the document
//! 3. Apply every operation file of those folders to the merged document
//!
//! A unit's patches therefore see its own definitions and those of every
//! earlier unit, but never definitions of later units.
//!
//! A merge error is fatal to the run. An operation file that fails to parse
//! or raises a structural error is recorded in the report; the run continues
//! with the next file.

use crate::errors::Result;
use crate::run::Run;
use crate::settings::RunSettings;
use crate::unit::{select_folders, SourceFile, Unit};
use rimpatch_core::result::ResultSummary;
use rimpatch_core::{log_op_end, log_op_error, log_op_start, ExError, Version};
use serde::Serialize;

/// Outcome of one operation file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchFileReport {
    pub path: String,
    pub operations: Vec<ResultSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatchFileReport {
    pub fn failed_operations(&self) -> usize {
        self.operations.iter().filter(|o| !o.success).count()
    }
}

/// What one unit contributed to the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub id: String,
    pub name: String,
    pub folders: Vec<String>,
    pub definition_files: usize,
    pub defs_added: usize,
    pub patch_files: Vec<PatchFileReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub run_id: String,
    pub version: String,
    pub units: Vec<UnitReport>,
    /// SHA-256 of the final document's compact serialization
    pub digest: String,
}

impl AssemblyReport {
    /// Operation files that raised an error
    pub fn failed_files(&self) -> impl Iterator<Item = &PatchFileReport> {
        self.units
            .iter()
            .flat_map(|u| u.patch_files.iter())
            .filter(|f| f.error.is_some())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Assemble a document from units in run order
///
/// The active context is built from all `units` before anything is merged.
///
/// # Errors
///
/// Returns an error if a folder cannot be read or a definition file cannot
/// be merged.
pub fn assemble(settings: RunSettings, units: &[&dyn Unit]) -> Result<(Run, AssemblyReport)> {
    let mut run = Run::for_units(settings, units);
    log_op_start!("assemble", run_id = %run.id(), units = units.len());
    let start = std::time::Instant::now();

    let mut reports = Vec::with_capacity(units.len());
    for unit in units {
        let report = assemble_unit(&mut run, *unit).map_err(|e| {
            log_op_error!(
                "assemble",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = %run.id()
            );
            e
        })?;
        reports.push(report);
    }

    let report = AssemblyReport {
        run_id: run.id().to_string(),
        version: run.settings().version.to_string(),
        units: reports,
        digest: run.document().to_xml().digest(),
    };
    log_op_end!(
        "assemble",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %run.id(),
        failed_files = report.failed_files().count()
    );
    Ok((run, report))
}

fn assemble_unit(run: &mut Run, unit: &dyn Unit) -> Result<UnitReport> {
    let version = run.settings().version.clone();
    if !declares(unit, &version) {
        tracing::warn!(unit_id = unit.id(), version = %version, "unit does not declare the running version");
    }

    let folders = select_folders(unit, &version, run.context());
    let mut report = UnitReport {
        id: unit.id().to_string(),
        name: unit.name().to_string(),
        folders: folders.iter().map(|f| f.label()).collect(),
        definition_files: 0,
        defs_added: 0,
        patch_files: Vec::new(),
    };

    for folder in &folders {
        for file in folder.definitions()? {
            let added = run
                .merge(&file.root)
                .map_err(|e| e.with_unit_id(unit.id()).with_file(file.path.clone()))?;
            tracing::debug!(unit_id = unit.id(), file = %file.path, defs_added = added, "merged definitions");
            report.definition_files += 1;
            report.defs_added += added;
        }
    }

    for folder in &folders {
        for file in folder.patches()? {
            report.patch_files.push(apply_file(run, unit, file));
        }
    }
    Ok(report)
}

/// Whether the unit lists the running major.minor, or lists nothing at all
fn declares(unit: &dyn Unit, version: &Version) -> bool {
    let supported = unit.supported_versions();
    supported.is_empty()
        || supported
            .iter()
            .any(|v| v.numbers().iter().take(2).eq(version.numbers().iter().take(2)))
}

fn apply_file(run: &mut Run, unit: &dyn Unit, file: SourceFile) -> PatchFileReport {
    match run.patch(&file.root) {
        Ok(results) => PatchFileReport {
            path: file.path,
            operations: results.iter().map(|r| r.summary()).collect(),
            error: None,
        },
        Err(err) => {
            let err: ExError = err.with_unit_id(unit.id()).with_file(file.path.clone());
            tracing::warn!(
                unit_id = unit.id(),
                file = %file.path,
                err.code = err.code(),
                "operation file aborted"
            );
            PatchFileReport {
                path: file.path,
                operations: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}
