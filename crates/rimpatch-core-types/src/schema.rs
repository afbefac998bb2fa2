//! Field keys and event names shared by every rimpatch log line
//!
//! Boundary operations (`patch`, `assemble`) emit one `start` event and then
//! exactly one of `end` or `end_error`.

pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
