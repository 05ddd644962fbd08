//! # flatxml - Hierarchical Document Flattening
//!
//! Turns a batch of XML documents into one table: one row per document,
//! one column per distinct leaf path, under a multi-level header whose
//! levels are the element tags along that path.
//!
//! ## Modules
//!
//! - **tree**: parse raw bytes into an element tree
//! - **flatten**: traverse, prune, inflate and project document sets
//! - **envelope**: strip signed (`.p7m`) envelopes down to the document
//! - **header**: collapse the multi-level header through a lookup table
//! - **export**: write tables as CSV or JSON Lines
//! - **source**: read document bytes from the filesystem
//!
//! ## Quick Start
//!
//! ```rust
//! use flatxml::{convert_documents, FlattenConfig};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut sources = BTreeMap::new();
//! sources.insert(
//!     "first.xml".to_string(),
//!     b"<a><b><c>1</c><c>2</c></b><d>3</d></a>".to_vec(),
//! );
//! sources.insert("second.xml".to_string(), b"<a><d>4</d></a>".to_vec());
//!
//! let table = convert_documents(sources, FlattenConfig::default())?;
//!
//! // Siblings sharing a branch are merged, short paths are padded
//! assert_eq!(table.get("first", &["b", "c"]), Some("1|2"));
//! assert_eq!(table.get("second", &["d", " "]), Some("4"));
//! assert_eq!(table.get("second", &["b", "c"]), None);
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod error;
pub mod export;
pub mod flatten;
pub mod header;
pub mod source;
pub mod tree;

// Re-export commonly used types for convenience
pub use envelope::{unwrap_all, EnvelopeUnwrapper, P7mUnwrapper};
pub use error::{EnvelopeError, FlattenError, Result};
pub use export::{DelimitedWriter, JsonLinesWriter};
pub use flatten::{ColumnHeader, DocumentSet, FlattenConfig, Row, Table, XmlConverter};
pub use header::{simplify_header, LookupTable, SimplifiedHeader};
pub use source::{read_path, DocumentSources};
pub use tree::Node;

/// Main entry point: convert raw documents into a table in one call
pub fn convert_documents(sources: DocumentSources, config: FlattenConfig) -> Result<Table> {
    XmlConverter::new(sources, config)?.convert()
}
