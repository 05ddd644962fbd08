//! One conversion session over a set of raw documents

use crate::error::{FlattenError, Result};
use crate::flatten::config::FlattenConfig;
use crate::flatten::document::DocumentSet;
use crate::flatten::inflate::inflate;
use crate::flatten::project::project;
use crate::flatten::prune::prune;
use crate::flatten::table::Table;
use crate::flatten::traverse::{filter_prefix, traverse};
use crate::source::DocumentSources;
use crate::tree::parse_document;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Raw bytes and the file they came from
#[derive(Debug, Clone)]
struct RawDocument {
    file_name: String,
    bytes: Vec<u8>,
}

/// Converts a batch of raw documents into a table.
///
/// Construction validates the configuration against every document before
/// anything is parsed. The pipeline stages then pass [`DocumentSet`] values
/// from one to the next:
///
/// ```rust
/// use flatxml::{FlattenConfig, XmlConverter};
/// use std::collections::BTreeMap;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut sources = BTreeMap::new();
/// sources.insert(
///     "myfile.xml".to_string(),
///     b"<a><b><c>First</c><d>Second</d></b><e>Third</e></a>".to_vec(),
/// );
///
/// let config = FlattenConfig::default().with_separator("|").with_concat_symbol("&");
/// let converter = XmlConverter::new(sources, config)?;
///
/// let loaded = converter.load()?;
/// let inflated = converter.inflate(&loaded)?;
/// let table = converter.project(&inflated)?;
///
/// assert_eq!(table.get("myfile", &["e", " "]), Some("Third"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct XmlConverter {
    documents: BTreeMap<String, RawDocument>,
    config: FlattenConfig,
}

impl XmlConverter {
    /// Validate the configuration and the raw documents.
    ///
    /// Fails with `Configuration` when there are no documents, when the
    /// separator is empty or equal to the concat symbol, or when two files
    /// map to the same document name; fails with `SeparatorConflict` when
    /// the separator occurs in any raw document.
    pub fn new(sources: DocumentSources, config: FlattenConfig) -> Result<Self> {
        if sources.is_empty() {
            return Err(FlattenError::configuration("no documents to convert"));
        }
        if config.separator.is_empty() {
            return Err(FlattenError::configuration("the field separator cannot be empty"));
        }
        if config.separator == config.concat_symbol {
            return Err(FlattenError::configuration(format!(
                "the field separator and the concat symbol are both '{}'",
                config.separator
            )));
        }

        let mut documents: BTreeMap<String, RawDocument> = BTreeMap::new();
        for (file_name, bytes) in sources {
            if contains_bytes(&bytes, config.separator.as_bytes()) {
                return Err(FlattenError::SeparatorConflict {
                    separator: config.separator.clone(),
                    document: file_name,
                });
            }

            let name = document_name(&file_name).to_string();
            if let Some(previous) = documents.get(&name) {
                return Err(FlattenError::configuration(format!(
                    "files '{}' and '{}' both map to document '{}'",
                    previous.file_name, file_name, name
                )));
            }
            documents.insert(name, RawDocument { file_name, bytes });
        }

        tracing::debug!(documents = documents.len(), separator = %config.separator, "Validated document sources");
        Ok(XmlConverter { documents, config })
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Number of documents in the session
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Parse, linearize, filter and prune every document.
    ///
    /// Fails with `SeparatorConflict` when decoded leaf text contains the
    /// separator, e.g. through a character reference.
    pub fn load(&self) -> Result<DocumentSet> {
        let separator = self.config.separator.as_str();
        let concat_symbol = self.config.concat_symbol.as_str();
        let prefix = self.config.prefix_filter();

        let records = self
            .documents
            .par_iter()
            .map(|(name, raw)| -> Result<(String, Vec<String>)> {
                let root = parse_document(&raw.file_name, &raw.bytes)?;
                // Character references can still decode to the separator
                if let Some(leaf) = root.find_leaf(|text| text.contains(separator)) {
                    tracing::debug!(document = %name, tag = leaf.tag(), "Decoded text contains the separator");
                    return Err(FlattenError::SeparatorConflict {
                        separator: separator.to_string(),
                        document: raw.file_name.clone(),
                    });
                }
                let mut strings = traverse(root.children(), separator);
                if let Some(tag) = prefix {
                    strings = filter_prefix(strings, separator, tag);
                }
                let pruned = prune(&strings, separator, concat_symbol);

                tracing::debug!(
                    document = %name,
                    leaves = root.leaf_count(),
                    kept = strings.len(),
                    paths = pruned.len(),
                    "Loaded document"
                );
                Ok((name.clone(), pruned))
            })
            .collect::<Result<Vec<_>>>()?;

        let documents: DocumentSet = records.into_iter().collect();
        tracing::info!(
            documents = documents.len(),
            paths = documents.path_count(),
            "Loaded document set"
        );
        Ok(documents)
    }

    /// Inflate with the configured filler; without one the set is returned as is.
    pub fn inflate(&self, documents: &DocumentSet) -> Result<DocumentSet> {
        match &self.config.filler {
            Some(filler) => inflate(documents, &self.config.separator, filler),
            None => Ok(documents.clone()),
        }
    }

    /// Project with the configured offset
    pub fn project(&self, documents: &DocumentSet) -> Result<Table> {
        project(documents, &self.config.separator, self.config.offset)
    }

    /// Run the whole pipeline: load, inflate, project.
    pub fn convert(&self) -> Result<Table> {
        let loaded = self.load()?;
        let inflated = self.inflate(&loaded)?;
        self.project(&inflated)
    }
}

/// File name without its terminal extension (`invoice.v2.xml` → `invoice.v2`)
pub fn document_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}
