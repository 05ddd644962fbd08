//! Helpers over path-strings
//!
//! A path-string encodes one leaf as `tag SEP tag SEP ... SEP value`. The
//! part before the last separator is the leaf's branch.

/// Split a path-string into its branch and its value.
///
/// A string without any separator has an empty branch.
pub fn split_branch<'a>(path: &'a str, separator: &str) -> (&'a str, &'a str) {
    path.rsplit_once(separator).unwrap_or(("", path))
}

/// The path-string without its trailing value segment
pub fn branch<'a>(path: &'a str, separator: &str) -> &'a str {
    split_branch(path, separator).0
}

/// The trailing value segment
pub fn value<'a>(path: &'a str, separator: &str) -> &'a str {
    split_branch(path, separator).1
}

/// Number of separators in the path-string (segments minus one)
pub fn depth(path: &str, separator: &str) -> usize {
    path.matches(separator).count()
}

/// First segment of the path-string
pub fn first_segment<'a>(path: &'a str, separator: &str) -> &'a str {
    path.split_once(separator).map_or(path, |(head, _)| head)
}

/// Join a branch and a value back into a path-string
pub fn join(branch: &str, separator: &str, value: &str) -> String {
    let mut path = String::with_capacity(branch.len() + separator.len() + value.len());
    path.push_str(branch);
    path.push_str(separator);
    path.push_str(value);
    path
}
