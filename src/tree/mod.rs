//! Hierarchical document model
//!
//! Raw markup is parsed once into an owned [`Node`] tree, traversed into
//! path-strings and then dropped.

pub mod node;
pub mod parser;

pub use node::Node;
pub use parser::parse_document;
