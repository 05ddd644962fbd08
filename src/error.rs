//! Error types for the flattening engine and the envelope unwrapper.

use thiserror::Error;

/// Errors raised while building, loading or projecting a document set.
///
/// Every variant is detected at the boundary closest to its cause:
/// configuration and separator conflicts at construction, filler problems
/// when inflating, offset problems when projecting.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Invalid constructor arguments (empty input, clashing symbols)
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// The separator occurs verbatim in a raw document
    #[error("The string '{separator}' is not a valid field separator: it occurs in document '{document}'")]
    SeparatorConflict { separator: String, document: String },

    /// The inflation filler contains the separator
    #[error("Invalid filler '{filler}': it contains the field separator '{separator}'")]
    InvalidFiller { filler: String, separator: String },

    /// The header offset leaves no usable header level
    #[error("Offset {offset} is out of range: only {available} common header levels are available")]
    OffsetOutOfRange { offset: usize, available: usize },

    /// The document is not well-formed markup
    #[error("Failed to parse document '{document}': {reason}")]
    Parse { document: String, reason: String },

    /// The document bytes are not valid UTF-8
    #[error("Document '{document}' is not valid UTF-8 text")]
    Encoding { document: String },

    /// A header lookup table line is not of the form `path: label`
    #[error("Invalid lookup table entry on line {line}: {reason}")]
    InvalidLookup { line: usize, reason: String },
}

impl FlattenError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        FlattenError::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(document: &str, reason: impl ToString) -> Self {
        FlattenError::Parse {
            document: document.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error was caused by the converter's configuration
    /// rather than by the content of a document
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FlattenError::Configuration { .. }
                | FlattenError::InvalidFiller { .. }
                | FlattenError::OffsetOutOfRange { .. }
                | FlattenError::InvalidLookup { .. }
        )
    }
}

/// Errors raised while unwrapping a signed (`.p7m`) envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Neither raw DER nor base64-encoded DER, or undecodable content
    #[error("Envelope could not be decoded: {reason}")]
    Encoding { reason: String },

    /// The ASN.1 structure is truncated or malformed
    #[error("Malformed envelope structure: {reason}")]
    Malformed { reason: String },

    /// The content type is not one we can unwrap
    #[error("Unsupported envelope content type {oid}")]
    UnsupportedContentType { oid: String },

    /// Detached signature: the envelope carries no content
    #[error("Envelope carries no encapsulated content")]
    MissingContent,
}

impl EnvelopeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        EnvelopeError::Malformed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlattenError>;
