//! Tree flattening - turn hierarchical documents into one table
//!
//! The engine runs four stages over per-document lists of path-strings:
//!
//! 1. **traverse**: one `tag SEP tag SEP ... SEP value` string per leaf
//! 2. **prune**: merge the values of leaves sharing the same branch
//! 3. **inflate**: pad shorter paths so every path has the same depth
//! 4. **project**: split paths into a multi-level header and one row per document
//!
//! Stages 1-3 run independently per document (in parallel); projection
//! needs the branch limits of the whole set.

pub mod config;
pub mod converter;
pub mod document;
pub mod inflate;
pub mod path;
pub mod project;
pub mod prune;
pub mod table;
pub mod traverse;

pub use config::FlattenConfig;
pub use converter::{document_name, XmlConverter};
pub use document::DocumentSet;
pub use inflate::inflate;
pub use project::project;
pub use prune::prune;
pub use table::{ColumnHeader, Row, Table};
pub use traverse::{filter_prefix, traverse};
