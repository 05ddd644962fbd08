//! Depth inflation
//!
//! Documents of different shapes produce path-strings of different depths.
//! Padding every path-string to the deepest one in the set gives all
//! documents the same header arity.

use crate::error::{FlattenError, Result};
use crate::flatten::document::DocumentSet;
use crate::flatten::path;
use rayon::prelude::*;

/// Pad every path-string of `documents` to the set's maximum branch depth.
///
/// Missing levels are filled with copies of `filler` inserted right before
/// the value segment, so the value always stays last. Path-strings already
/// at maximum depth are left untouched.
pub fn inflate(documents: &DocumentSet, separator: &str, filler: &str) -> Result<DocumentSet> {
    if filler.contains(separator) {
        return Err(FlattenError::InvalidFiller {
            filler: filler.to_string(),
            separator: separator.to_string(),
        });
    }

    let Some((_, lmax)) = documents.branch_limits(separator) else {
        return Ok(documents.clone());
    };

    let inflated: DocumentSet = documents
        .par_iter()
        .map(|(name, strings)| {
            let strings: Vec<String> = strings
                .iter()
                .map(|entry| inflate_entry(entry, separator, filler, lmax))
                .collect();
            (name.clone(), strings)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    tracing::debug!(lmax, documents = inflated.len(), "Inflated document set");
    Ok(inflated)
}

fn inflate_entry(entry: &str, separator: &str, filler: &str, lmax: usize) -> String {
    let depth = path::depth(entry, separator);
    if depth >= lmax {
        return entry.to_string();
    }

    let (branch, value) = path::split_branch(entry, separator);
    let missing = lmax - depth;
    let mut inflated = String::with_capacity(entry.len() + missing * (separator.len() + filler.len()));
    inflated.push_str(branch);
    for _ in 0..missing {
        inflated.push_str(separator);
        inflated.push_str(filler);
    }
    inflated.push_str(separator);
    inflated.push_str(value);
    inflated
}
