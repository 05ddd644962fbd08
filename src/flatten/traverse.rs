//! Tree linearization
//!
//! Turns a sequence of sibling nodes into one path-string per leaf, in
//! pre-order, left to right.

use crate::flatten::path;
use crate::tree::Node;

/// Linearize `nodes` into path-strings.
///
/// A leaf emits `tag SEP text`; a branch prefixes `tag SEP` to every string
/// produced by its children.
pub fn traverse(nodes: &[Node], separator: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut prefix = String::new();
    for node in nodes {
        walk(node, separator, &mut prefix, &mut strings);
    }
    strings
}

fn walk(node: &Node, separator: &str, prefix: &mut String, strings: &mut Vec<String>) {
    match node {
        Node::Leaf { tag, text } => {
            let mut entry = String::with_capacity(prefix.len() + tag.len() + separator.len() + text.len());
            entry.push_str(prefix);
            entry.push_str(tag);
            entry.push_str(separator);
            entry.push_str(text);
            strings.push(entry);
        }
        Node::Branch { tag, children } => {
            let restore = prefix.len();
            prefix.push_str(tag);
            prefix.push_str(separator);
            for child in children {
                walk(child, separator, prefix, strings);
            }
            prefix.truncate(restore);
        }
    }
}

/// Keep only the path-strings whose first segment equals `tag`.
///
/// The match is on the whole first segment: `b` keeps `b|c|1` but not `bb|c|1`.
pub fn filter_prefix(strings: Vec<String>, separator: &str, tag: &str) -> Vec<String> {
    strings
        .into_iter()
        .filter(|entry| path::first_segment(entry, separator) == tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn flat_tree() -> Node {
        parse_document("flat", b"<a><b><c>First</c><d>Second</d></b><e>Third</e></a>").unwrap()
    }

    #[test]
    fn test_traverse_flat_tree() {
        let root = flat_tree();
        let output = traverse(root.children(), "|");
        assert_eq!(output, vec!["b|c|First", "b|d|Second", "e|Third"]);
    }

    #[test]
    fn test_traverse_is_deterministic() {
        let root = flat_tree();
        assert_eq!(traverse(root.children(), "#@#"), traverse(root.children(), "#@#"));
    }

    #[test]
    fn test_empty_text_yields_empty_value() {
        let root = parse_document("empty", b"<a><b><c/></b><d></d></a>").unwrap();
        assert_eq!(traverse(root.children(), "|"), vec!["b|c|", "d|"]);
    }

    #[test]
    fn test_root_without_children_yields_nothing() {
        let root = parse_document("leaf", b"<a>only text</a>").unwrap();
        assert!(traverse(root.children(), "|").is_empty());
    }

    #[test]
    fn test_prefix_filter() {
        let root = flat_tree();
        let output = filter_prefix(traverse(root.children(), "|"), "|", "b");
        assert_eq!(output, vec!["b|c|First", "b|d|Second"]);
    }

    #[test]
    fn test_prefix_filter_matches_whole_segment() {
        let strings = vec!["b|x|1".to_string(), "bb|x|2".to_string(), "b".to_string()];
        assert_eq!(filter_prefix(strings, "|", "b"), vec!["b|x|1", "b"]);
    }
}
