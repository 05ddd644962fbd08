/// Default field separator: a token unlikely to occur in real documents
pub const DEFAULT_SEPARATOR: &str = "#@#";

/// Default symbol joining the values of merged sibling leaves
pub const DEFAULT_CONCAT_SYMBOL: &str = "|";

/// Default inflation filler
pub const DEFAULT_FILLER: &str = " ";

/// Join token for header levels collapsed into the overflow label
pub const OVERFLOW_JOIN: &str = " - ";

/// Configuration for the flattening process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenConfig {
    /// Separator between path segments. Must not occur in any raw document.
    pub separator: String,

    /// Joins the values of leaves sharing a branch. Must differ from the separator.
    pub concat_symbol: String,

    /// Pad segment used to equalize path depth. `None` skips inflation.
    pub filler: Option<String>,

    /// Keep only paths whose first segment equals this tag
    pub starting_with: Option<String>,

    /// Number of leading header levels to drop
    pub offset: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from(DEFAULT_SEPARATOR),
            concat_symbol: String::from(DEFAULT_CONCAT_SYMBOL),
            filler: Some(String::from(DEFAULT_FILLER)),
            starting_with: None,
            offset: 0,
        }
    }
}

impl FlattenConfig {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_concat_symbol(mut self, concat_symbol: impl Into<String>) -> Self {
        self.concat_symbol = concat_symbol.into();
        self
    }

    pub fn with_filler(mut self, filler: impl Into<String>) -> Self {
        self.filler = Some(filler.into());
        self
    }

    /// Keep path depths as they come out of the tree
    pub fn without_inflation(mut self) -> Self {
        self.filler = None;
        self
    }

    pub fn with_starting_with(mut self, tag: impl Into<String>) -> Self {
        self.starting_with = Some(tag.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The prefix filter, with an empty condition meaning "no filter"
    pub fn prefix_filter(&self) -> Option<&str> {
        self.starting_with.as_deref().filter(|tag| !tag.is_empty())
    }
}
