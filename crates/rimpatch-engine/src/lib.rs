//! rimpatch engine - assembly orchestration
//!
//! Coordinates units, their version-scoped content folders and the core
//! interpreter:
//! - `Unit` / `ContentFolder` collaborator traits with in-memory and
//!   directory-backed implementations
//! - `RunSettings` and the TOML run manifest
//! - `Run`, owning the working document and the active-unit context
//! - `assemble`, the merge-then-patch pipeline producing an `AssemblyReport`

pub mod assembly;
pub mod errors;
pub mod fs_unit;
pub mod memory;
pub mod run;
pub mod settings;
pub mod unit;

pub use assembly::{assemble, AssemblyReport, PatchFileReport, UnitReport};
pub use errors::Result;
pub use fs_unit::{DirFolder, DirUnit};
pub use memory::{MemoryFolder, MemoryUnit};
pub use run::Run;
pub use settings::{RunManifest, RunSettings};
pub use unit::{select_folders, ContentFolder, SourceFile, Unit};
