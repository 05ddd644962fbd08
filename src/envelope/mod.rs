//! Signed envelope unwrapping
//!
//! Documents can arrive wrapped in a signature envelope. The engine only
//! ever sees the raw document bytes, so envelopes are stripped up front,
//! one document at a time.

pub mod der;
pub mod p7m;

pub use p7m::P7mUnwrapper;

use crate::error::{EnvelopeError, FlattenError, Result};
use crate::source::DocumentSources;
use rayon::prelude::*;

/// Suffix carried by signed envelope files
pub const ENVELOPE_SUFFIX: &str = ".p7m";

/// Turns an enveloped document into its raw bytes
pub trait EnvelopeUnwrapper: Send + Sync {
    fn unwrap_envelope(&self, bytes: &[u8]) -> std::result::Result<Vec<u8>, EnvelopeError>;
}

/// Unwrap every source, dropping the envelope suffix from its name.
///
/// Sources that fail to unwrap are skipped. Each failure is passed to
/// `on_error` together with the source name; without a handler it is
/// logged as a warning.
pub fn unwrap_all<U>(
    sources: &DocumentSources,
    unwrapper: &U,
    mut on_error: Option<&mut dyn FnMut(&EnvelopeError, &str)>,
) -> Result<DocumentSources>
where
    U: EnvelopeUnwrapper + ?Sized,
{
    if sources.is_empty() {
        return Err(FlattenError::configuration("no envelopes to unwrap"));
    }

    let results: Vec<(&String, std::result::Result<Vec<u8>, EnvelopeError>)> = sources
        .par_iter()
        .map(|(name, bytes)| (name, unwrapper.unwrap_envelope(bytes)))
        .collect();

    let mut unwrapped = DocumentSources::new();
    for (name, result) in results {
        match result {
            Ok(bytes) => {
                unwrapped.insert(strip_envelope_suffix(name).to_string(), bytes);
            }
            Err(err) => match on_error.as_deref_mut() {
                Some(handler) => handler(&err, name.as_str()),
                None => tracing::warn!(source = %name, error = %err, "Skipping envelope"),
            },
        }
    }

    tracing::info!(
        unwrapped = unwrapped.len(),
        failed = sources.len() - unwrapped.len(),
        "Unwrapped envelopes"
    );
    Ok(unwrapped)
}

/// `invoice.xml.p7m` → `invoice.xml`; the suffix is matched case-insensitively
pub fn strip_envelope_suffix(name: &str) -> &str {
    let split = name.len().saturating_sub(ENVELOPE_SUFFIX.len());
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(suffix)) if suffix.eq_ignore_ascii_case(ENVELOPE_SUFFIX) => stem,
        _ => name,
    }
}
