use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The levels of one column header, outermost first
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnHeader(Vec<String>);

impl ColumnHeader {
    pub fn new(levels: Vec<String>) -> Self {
        ColumnHeader(levels)
    }

    pub fn levels(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// All levels joined into one label
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }

    fn matches(&self, levels: &[&str]) -> bool {
        self.0.len() == levels.len() && self.0.iter().zip(levels).all(|(a, b)| a == b)
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnHeader {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ColumnHeader(iter.into_iter().map(Into::into).collect())
    }
}

/// One table row: a document name and one optional cell per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    key: String,
    values: Vec<Option<String>>,
}

impl Row {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).and_then(Option::as_deref)
    }
}

/// A rectangular table with a multi-level header.
///
/// Every column header has `header_depth` levels and every row holds
/// exactly one (possibly missing) cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    header_depth: usize,
    columns: Vec<ColumnHeader>,
    rows: Vec<Row>,
}

impl Table {
    pub fn header_depth(&self) -> usize {
        self.header_depth
    }

    pub fn columns(&self) -> &[ColumnHeader] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn column_index(&self, levels: &[&str]) -> Option<usize> {
        self.columns.iter().position(|column| column.matches(levels))
    }

    /// Cell at the given row key and header levels
    pub fn get(&self, key: &str, levels: &[&str]) -> Option<&str> {
        let column = self.column_index(levels)?;
        self.row(key)?.get(column)
    }

    /// The same rows under single-level labels, one per existing column
    pub(crate) fn relabel(&self, labels: Vec<String>) -> Table {
        debug_assert_eq!(labels.len(), self.columns.len());
        Table {
            header_depth: 1,
            columns: labels.into_iter().map(|label| ColumnHeader(vec![label])).collect(),
            rows: self.rows.clone(),
        }
    }
}

/// Accumulates rows whose columns are aligned by header as they arrive.
///
/// Columns are ordered by first appearance. A row lacking a column gets a
/// missing cell for it once the table is finished.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    header_depth: usize,
    columns: Vec<ColumnHeader>,
    index: HashMap<ColumnHeader, usize>,
    rows: Vec<(String, HashMap<usize, String>)>,
}

impl TableBuilder {
    pub(crate) fn new(header_depth: usize) -> Self {
        TableBuilder {
            header_depth,
            ..Default::default()
        }
    }

    /// Add a row. Cells sharing a header within the row are joined with
    /// `collision_join`.
    pub(crate) fn push_row(
        &mut self,
        key: String,
        cells: Vec<(ColumnHeader, String)>,
        collision_join: &str,
    ) {
        let mut values: HashMap<usize, String> = HashMap::with_capacity(cells.len());

        for (header, value) in cells {
            debug_assert_eq!(header.depth(), self.header_depth);
            let column = match self.index.get(&header) {
                Some(&column) => column,
                None => {
                    let column = self.columns.len();
                    self.columns.push(header.clone());
                    self.index.insert(header, column);
                    column
                }
            };

            match values.get_mut(&column) {
                Some(existing) => {
                    tracing::warn!(
                        row = %key,
                        column = %self.columns[column].join("/"),
                        "Header collision within one row, joining values"
                    );
                    existing.push_str(collision_join);
                    existing.push_str(&value);
                }
                None => {
                    values.insert(column, value);
                }
            }
        }

        self.rows.push((key, values));
    }

    pub(crate) fn finish(self) -> Table {
        let width = self.columns.len();
        let rows = self
            .rows
            .into_iter()
            .map(|(key, mut cells)| Row {
                key,
                values: (0..width).map(|column| cells.remove(&column)).collect(),
            })
            .collect();

        Table {
            header_depth: self.header_depth,
            columns: self.columns,
            rows,
        }
    }
}
