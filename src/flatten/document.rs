use crate::flatten::path;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The path-strings of every loaded document, keyed by document name.
///
/// This is the value threaded through the pipeline: loading produces one,
/// inflation turns one into another, projection reads one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    records: BTreeMap<String, Vec<String>>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the path-strings of a document
    pub fn insert(&mut self, name: impl Into<String>, strings: Vec<String>) -> Option<Vec<String>> {
        self.records.insert(name.into(), strings)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.records.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.records
            .iter()
            .map(|(name, strings)| (name.as_str(), strings.as_slice()))
    }

    pub(crate) fn par_iter(&self) -> impl ParallelIterator<Item = (&String, &Vec<String>)> {
        self.records.par_iter()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of path-strings across all documents
    pub fn path_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Minimum and maximum branch depth across every path-string of every
    /// document, or `None` when there are no path-strings at all.
    ///
    /// Always computed from the current contents, never cached.
    pub fn branch_limits(&self, separator: &str) -> Option<(usize, usize)> {
        self.records
            .values()
            .flatten()
            .map(|entry| path::depth(entry, separator))
            .fold(None, |limits, depth| match limits {
                None => Some((depth, depth)),
                Some((lmin, lmax)) => Some((lmin.min(depth), lmax.max(depth))),
            })
    }
}

impl FromIterator<(String, Vec<String>)> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        DocumentSet {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentSet {
        let mut set = DocumentSet::new();
        set.insert("one", vec!["b|c|First".into(), "b|d|Second".into(), "e|Third".into()]);
        set.insert("two", vec!["x|y|z|deep".into()]);
        set
    }

    #[test]
    fn test_branch_limits_span_all_documents() {
        assert_eq!(sample().branch_limits("|"), Some((1, 3)));
    }

    #[test]
    fn test_branch_limits_of_empty_set() {
        assert_eq!(DocumentSet::new().branch_limits("|"), None);

        let mut set = DocumentSet::new();
        set.insert("blank", vec![]);
        assert_eq!(set.branch_limits("|"), None);
    }

    #[test]
    fn test_accessors() {
        let set = sample();
        assert_eq!(set.len(), 2);
        assert_eq!(set.path_count(), 4);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(set.get("two"), Some(&["x|y|z|deep".to_string()][..]));
        assert!(set.get("three").is_none());
    }
}
