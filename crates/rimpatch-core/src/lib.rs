//! rimpatch core - XML patch-operation interpreter
//!
//! This crate provides the in-memory half of rimpatch:
//! - An arena-backed XML working document with merge and mutation primitives
//! - A restricted path-query language (elements, attributes, text)
//! - The operation AST, its dispatcher from XML, and its interpreter
//! - The result algebra and success policies
//! - Dotted version parsing and nearest-version selection
//!
//! Nothing here touches the filesystem; see `rimpatch-engine` for content
//! folders and assembly runs.

pub mod apply;
pub mod context;
pub mod errors;
pub mod logging_facility;
pub mod operation;
pub mod ops;
pub mod parse;
pub mod policy;
pub mod query;
pub mod result;
pub mod version;
pub mod xml;

pub use rimpatch_core_types::schema;

// Re-export commonly used types
pub use apply::{apply, execute, patch};
pub use context::ActiveContext;
pub use errors::{ExError, ExErrorKind, PatchError, Result};
pub use operation::{AddValue, Operation, OperationKind, Order, SafeAddCompare};
pub use parse::OperationParser;
pub use policy::{SuccessPolicy, UnknownOperationPolicy};
pub use query::Query;
pub use result::{PatchResult, ResultSummary};
pub use version::Version;
pub use xml::{Document, NodeId, XmlNode};
