//! Header simplification
//!
//! Multi-level headers are precise but unwieldy. A [`LookupTable`] maps the
//! canonical path of a column to a short label; columns with no entry get a
//! generated `unk_N` placeholder so the table can be extended later.

pub mod lookup;

pub use lookup::LookupTable;

use crate::flatten::Table;
use std::collections::HashMap;

/// Joins header levels into a canonical path
pub const CANONICAL_JOIN: &str = "|";

/// Prefix of generated labels for unmapped columns
pub const UNMAPPED_PREFIX: &str = "unk_";

/// Result of [`simplify_header`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedHeader {
    /// The input rows under single-level labels
    pub table: Table,
    /// Canonical path → generated label, in first-seen order
    pub unmapped: Vec<(String, String)>,
}

/// Canonical path of a column: its levels without empty or filler-only
/// levels, joined with `|`
pub fn canonical_path<S: AsRef<str>>(levels: &[S], filler: &str) -> String {
    levels
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|level| !level.is_empty() && *level != filler)
        .collect::<Vec<_>>()
        .join(CANONICAL_JOIN)
}

/// Relabel every column of `table` through `lookup`.
///
/// Unmapped paths are numbered `unk_1`, `unk_2`, ... in column order; two
/// columns with the same canonical path share a label.
pub fn simplify_header(table: &Table, filler: &str, lookup: &LookupTable) -> SimplifiedHeader {
    let mut unmapped: Vec<(String, String)> = Vec::new();
    let mut generated: HashMap<String, usize> = HashMap::new();

    let labels = table
        .columns()
        .iter()
        .map(|column| {
            let path = canonical_path(column.levels(), filler);
            if let Some(label) = lookup.get(&path) {
                return label.to_string();
            }
            let position = *generated.entry(path.clone()).or_insert_with(|| {
                let label = format!("{UNMAPPED_PREFIX}{}", unmapped.len() + 1);
                unmapped.push((path, label));
                unmapped.len() - 1
            });
            unmapped[position].1.clone()
        })
        .collect();

    tracing::debug!(columns = table.width(), unmapped = unmapped.len(), "Simplified header");

    SimplifiedHeader {
        table: table.relabel(labels),
        unmapped,
    }
}
