//! Tabular projection
//!
//! Splits normalized path-strings into a multi-level column header plus a
//! value and unions the per-document rows into one table.

use crate::error::{FlattenError, Result};
use crate::flatten::config::OVERFLOW_JOIN;
use crate::flatten::document::DocumentSet;
use crate::flatten::table::{ColumnHeader, Table, TableBuilder};
use rayon::prelude::*;

/// Joins two values that land in the same cell of one row
pub const CELL_COLLISION_JOIN: &str = " & ";

/// Project a document set into a table, dropping `offset` leading header levels.
///
/// With `lmin`/`lmax` the current branch limits, each column header has
/// `H = lmin - offset` regular levels taken from segments `offset..offset+H`,
/// plus an overflow level joining the remaining branch segments with `" - "`.
/// The overflow level is left out when no path-string can reach it
/// (`H + offset == lmax`).
pub fn project(documents: &DocumentSet, separator: &str, offset: usize) -> Result<Table> {
    let Some((lmin, lmax)) = documents.branch_limits(separator) else {
        // No leaves in any document: one empty row per document
        if offset > 0 {
            return Err(FlattenError::OffsetOutOfRange { offset, available: 0 });
        }
        let mut builder = TableBuilder::new(0);
        for name in documents.names() {
            builder.push_row(name.to_string(), Vec::new(), CELL_COLLISION_JOIN);
        }
        return Ok(builder.finish());
    };

    let out_of_range = FlattenError::OffsetOutOfRange {
        offset,
        available: lmin,
    };
    let Some(levels) = lmin.checked_sub(offset) else {
        return Err(out_of_range);
    };
    let overflow = levels + offset < lmax;
    if levels == 0 && !overflow {
        // A header without any level cannot address a column
        return Err(out_of_range);
    }

    let projected: Vec<(String, Vec<(ColumnHeader, String)>)> = documents
        .par_iter()
        .map(|(name, strings)| {
            let cells = strings
                .iter()
                .map(|entry| project_entry(entry, separator, offset, levels, overflow))
                .collect();
            (name.clone(), cells)
        })
        .collect();

    let mut builder = TableBuilder::new(levels + usize::from(overflow));
    for (name, cells) in projected {
        builder.push_row(name, cells, CELL_COLLISION_JOIN);
    }
    let table = builder.finish();

    tracing::info!(
        rows = table.len(),
        columns = table.width(),
        header_depth = table.header_depth(),
        lmin,
        lmax,
        offset,
        "Projected document set"
    );
    Ok(table)
}

fn project_entry(
    entry: &str,
    separator: &str,
    offset: usize,
    levels: usize,
    overflow: bool,
) -> (ColumnHeader, String) {
    let segments: Vec<&str> = entry.split(separator).collect();
    let (value, branch) = segments
        .split_last()
        .map_or(("", &[][..]), |(value, branch)| (*value, branch));

    // Every entry has at least lmin = offset + levels branch segments
    let mut header: Vec<String> = branch[offset..offset + levels]
        .iter()
        .map(|segment| segment.to_string())
        .collect();
    if overflow {
        header.push(branch[offset + levels..].join(OVERFLOW_JOIN));
    }

    (ColumnHeader::new(header), value.to_string())
}
