//! PKCS#7 (`.p7m`) signed envelopes
//!
//! Signed electronic invoices are distributed as CAdES/PKCS#7 `signedData`
//! with the XML embedded as encapsulated content, either as raw DER or as
//! base64 text. Only the payload is extracted; signatures are not verified.

use crate::envelope::der::{
    self, read_tlv, Tlv, TAG_CONTEXT_0, TAG_INTEGER, TAG_OID, TAG_SEQUENCE, TAG_SET,
};
use crate::envelope::EnvelopeUnwrapper;
use crate::error::EnvelopeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// 1.2.840.113549.1.7.1
const OID_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01];
/// 1.2.840.113549.1.7.2
const OID_SIGNED_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];

/// Unwraps DER or base64 PKCS#7 envelopes into UTF-8 document bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct P7mUnwrapper;

impl P7mUnwrapper {
    pub fn new() -> Self {
        P7mUnwrapper
    }
}

impl EnvelopeUnwrapper for P7mUnwrapper {
    fn unwrap_envelope(&self, bytes: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let content = match extract_content(bytes) {
            Ok(content) => content,
            Err(der_error) => {
                let decoded = decode_base64(bytes).map_err(|reason| EnvelopeError::Encoding {
                    reason: format!("{der_error}; {reason}"),
                })?;
                extract_content(&decoded)?
            }
        };
        decode_text(content)
    }
}

/// Payload of a `ContentInfo` holding either `signedData` or plain `data`
fn extract_content(bytes: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let (info, _) = read_tlv(bytes)?;
    let info = info.require(TAG_SEQUENCE, "ContentInfo")?;
    let (content_type, content) = typed_content(&info)?;

    match content_type.content {
        OID_SIGNED_DATA => signed_data_content(content),
        OID_DATA => content.octets(),
        other => Err(EnvelopeError::UnsupportedContentType {
            oid: der::format_oid(other),
        }),
    }
}

/// `SEQUENCE { contentType OID, content [0] EXPLICIT ANY OPTIONAL }`
fn typed_content<'a>(sequence: &Tlv<'a>) -> Result<(Tlv<'a>, Tlv<'a>), EnvelopeError> {
    let mut parts = sequence.children()?.into_iter();
    let content_type = parts
        .next()
        .ok_or_else(|| EnvelopeError::malformed("missing content type"))?
        .require(TAG_OID, "content type")?;
    let explicit = parts
        .next()
        .ok_or(EnvelopeError::MissingContent)?
        .require(TAG_CONTEXT_0, "explicit content")?;
    let (content, _) = read_tlv(explicit.content)?;
    Ok((content_type, content))
}

/// Encapsulated content of a `SignedData` structure
fn signed_data_content(signed_data: Tlv<'_>) -> Result<Vec<u8>, EnvelopeError> {
    let signed_data = signed_data.require(TAG_SEQUENCE, "SignedData")?;
    let mut parts = signed_data.children()?.into_iter();

    parts
        .next()
        .ok_or_else(|| EnvelopeError::malformed("missing SignedData version"))?
        .require(TAG_INTEGER, "SignedData version")?;
    parts
        .next()
        .ok_or_else(|| EnvelopeError::malformed("missing digest algorithms"))?
        .require(TAG_SET, "digest algorithms")?;
    let encapsulated = parts
        .next()
        .ok_or_else(|| EnvelopeError::malformed("missing encapsulated content info"))?
        .require(TAG_SEQUENCE, "encapsulated content info")?;

    let (_, content) = typed_content(&encapsulated)?;
    content.octets()
}

fn decode_base64(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let compact: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|err| format!("base64 decoding failed: {err}"))
}

/// UTF-8 passes through; anything else is read as Windows-1252
fn decode_text(content: Vec<u8>) -> Result<Vec<u8>, EnvelopeError> {
    match String::from_utf8(content) {
        Ok(text) => Ok(text.into_bytes()),
        Err(err) => {
            let bytes = err.into_bytes();
            let mut text = String::with_capacity(bytes.len() + bytes.len() / 4);
            for byte in bytes {
                let ch = windows_1252(byte).ok_or_else(|| EnvelopeError::Encoding {
                    reason: format!(
                        "content is neither UTF-8 nor Windows-1252 text (byte 0x{byte:02x})"
                    ),
                })?;
                text.push(ch);
            }
            Ok(text.into_bytes())
        }
    }
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F
fn windows_1252(byte: u8) -> Option<char> {
    const HIGH: [Option<char>; 32] = [
        Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
        Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
        Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
        Some('\u{0152}'), None, Some('\u{017D}'), None,
        None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
        Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
        Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
        Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
    ];
    match byte {
        0x80..=0x9F => HIGH[usize::from(byte - 0x80)],
        _ => Some(char::from(byte)),
    }
}
