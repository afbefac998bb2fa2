//! Structured logging facility for rimpatch
//!
//! One initialization point via `init(profile)` and a small set of macros
//! (`log_op_start!`, `log_op_end!`, `log_op_error!`) that emit events with
//! the op and event names from `rimpatch_core_types::schema`.
//!
//! # Usage
//!
//! ```rust
//! use rimpatch_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
