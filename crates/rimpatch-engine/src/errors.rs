//! Error handling for rimpatch-engine
//!
//! Wraps rimpatch-core ExError with engine-specific helpers

use rimpatch_core::errors::{ExError, ExErrorKind, PatchError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error for `path`
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_file(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a run manifest error
pub fn manifest_error(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidManifest)
        .with_op("manifest")
        .with_message(reason.to_string())
}

/// Create an error for a unit whose metadata cannot be used
pub fn unit_error(path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidManifest)
        .with_op("load_unit")
        .with_file(path.display().to_string())
        .with_message(reason.to_string())
}

/// Attach the file a core error came from
pub fn in_file(err: PatchError, file: &str) -> ExError {
    ExError::from(err).with_file(file.to_string())
}
