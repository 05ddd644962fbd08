//! Sibling pruning
//!
//! Leaves sharing the same branch (repeated elements such as invoice lines)
//! would otherwise produce several columns with the same header. Their
//! values are merged into a single path-string instead.

use crate::flatten::path;
use std::collections::HashMap;

/// Merge path-strings with identical branches.
///
/// The merged entry takes the position of the first occurrence of its
/// branch; the values of all later entries with that branch, adjacent or
/// not, are appended in their original order, joined by `concat_symbol`.
/// Entries with a unique branch pass through unchanged.
pub fn prune(strings: &[String], separator: &str, concat_symbol: &str) -> Vec<String> {
    // branch -> indices of its members, in input order
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::with_capacity(strings.len());
    let mut order: Vec<&str> = Vec::new();

    for (idx, entry) in strings.iter().enumerate() {
        let branch = path::branch(entry, separator);
        groups
            .entry(branch)
            .or_insert_with(|| {
                order.push(branch);
                Vec::new()
            })
            .push(idx);
    }

    order
        .into_iter()
        .map(|branch| match groups[branch].as_slice() {
            [single] => strings[*single].clone(),
            members => {
                let merged = members
                    .iter()
                    .map(|&idx| path::value(&strings[idx], separator))
                    .collect::<Vec<_>>()
                    .join(concat_symbol);
                path::join(branch, separator, &merged)
            }
        })
        .collect()
}
