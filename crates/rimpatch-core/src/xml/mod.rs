//! XML trees: owned nodes for files and fragments, and the arena-backed
//! working document that operations mutate.

pub mod document;
pub mod node;
pub mod parse;
pub mod write;

pub use document::{Document, NodeId, NodeKind};
pub use node::XmlNode;
pub use write::DECLARATION;
