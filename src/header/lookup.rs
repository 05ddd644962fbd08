use crate::error::{FlattenError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `path: label`, with at most one colon and no colon in either part
static LOOKUP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:]*?)\s*:\s*([^:]*?)\s*$").unwrap()
});

static FATTURAPA_SOURCE: &str = include_str!("fatturapa.txt");

static FATTURAPA: Lazy<LookupTable> = Lazy::new(|| {
    LookupTable::parse(FATTURAPA_SOURCE).expect("embedded FatturaPA lookup table is well-formed")
});

/// Canonical column path → human label, in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels for the Italian electronic invoice format (FatturaPA)
    pub fn fatturapa() -> &'static LookupTable {
        &FATTURAPA
    }

    /// Parse `path: label` lines.
    ///
    /// Blank lines are skipped. A line with no colon or more than one colon,
    /// or with an empty path, is an error. A repeated path keeps the label
    /// of its last occurrence.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = LookupTable::new();

        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let captures = LOOKUP_LINE.captures(line).ok_or_else(|| {
                let colons = line.matches(':').count();
                FlattenError::InvalidLookup {
                    line: number + 1,
                    reason: format!("expected one ':' separating path and label, found {colons}"),
                }
            })?;

            let path = &captures[1];
            if path.is_empty() {
                return Err(FlattenError::InvalidLookup {
                    line: number + 1,
                    reason: "empty column path".to_string(),
                });
            }
            table.insert(path, &captures[2]);
        }

        Ok(table)
    }

    pub fn insert(&mut self, path: impl Into<String>, label: impl Into<String>) {
        let path = path.into();
        let label = label.into();
        match self.index.get(&path) {
            Some(&position) => self.entries[position].1 = label,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, label));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, label)| (path.as_str(), label.as_str()))
    }

    /// The table in the text form accepted by [`LookupTable::parse`]
    pub fn render(&self) -> String {
        let mut text = String::new();
        for (path, label) in self.iter() {
            text.push_str(path);
            text.push_str(": ");
            text.push_str(label);
            text.push('\n');
        }
        text
    }
}

impl<P: Into<String>, L: Into<String>> FromIterator<(P, L)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (P, L)>>(iter: I) -> Self {
        let mut table = LookupTable::new();
        for (path, label) in iter {
            table.insert(path, label);
        }
        table
    }
}
