//! Reading raw documents from the filesystem
//!
//! The engine works on a name → bytes map; this module fills one from a
//! single file or from every matching file of a directory.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Raw document bytes keyed by file name
pub type DocumentSources = BTreeMap<String, Vec<u8>>;

/// Read a file, or every file directly inside a directory, into memory.
///
/// Only files whose name ends with one of `extensions` (compared
/// case-insensitively) are read; an empty list accepts every file. A single
/// file that does not match is an error, as is a path that does not exist.
pub fn read_path<P: AsRef<Path>>(source: P, extensions: &[&str]) -> Result<DocumentSources> {
    let path = source.as_ref();
    let mut sources = DocumentSources::new();

    if path.is_dir() {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to list directory: {}", path.display()))?;

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !matches_extension(&name, extensions) {
                continue;
            }
            let bytes = std::fs::read(&entry_path)
                .with_context(|| format!("Failed to read file: {}", entry_path.display()))?;
            sources.insert(name, bytes);
        }
    } else if path.is_file() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("Invalid file path: {}", path.display()))?;
        if !matches_extension(&name, extensions) {
            bail!(
                "File '{}' does not have any of the extensions {:?}",
                path.display(),
                extensions
            );
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        sources.insert(name, bytes);
    } else {
        bail!("Path not found: {}", path.display());
    }

    tracing::debug!(path = %path.display(), files = sources.len(), "Read document sources");
    Ok(sources)
}

fn matches_extension(name: &str, extensions: &[&str]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let name = name.to_ascii_lowercase();
    extensions
        .iter()
        .any(|extension| name.ends_with(&extension.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("first.xml"), "<a><b>1</b></a>").unwrap();
        std::fs::write(dir.path().join("SECOND.XML"), "<a><b>2</b></a>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a document").unwrap();
        std::fs::create_dir(dir.path().join("nested.xml")).unwrap();
        dir
    }

    #[test]
    fn test_read_directory_with_extension_filter() {
        let dir = fixture_dir();
        let sources = read_path(dir.path(), &[".xml"]).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources["first.xml"], b"<a><b>1</b></a>");
        assert!(sources.contains_key("SECOND.XML"));
    }

    #[test]
    fn test_read_directory_without_filter() {
        let dir = fixture_dir();
        let sources = read_path(dir.path(), &[]).unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources["notes.txt"], b"not a document");
    }

    #[test]
    fn test_read_single_file() {
        let dir = fixture_dir();
        let sources = read_path(dir.path().join("first.xml"), &[".xml"]).unwrap();
        assert_eq!(sources.keys().collect::<Vec<_>>(), vec!["first.xml"]);
    }

    #[test]
    fn test_single_file_with_wrong_extension() {
        let dir = fixture_dir();
        assert!(read_path(dir.path().join("notes.txt"), &[".xml"]).is_err());
    }

    #[test]
    fn test_missing_path() {
        let dir = fixture_dir();
        assert!(read_path(dir.path().join("missing"), &[]).is_err());
    }
}
