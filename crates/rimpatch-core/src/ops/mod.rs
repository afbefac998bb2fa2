//! Effects of each operation variant on the working document
//!
//! Functions here run after gating has passed and return the raw result;
//! success policies are applied by [`crate::apply::apply`].

pub mod attribute_ops;
pub mod control_ops;
pub mod node_ops;
