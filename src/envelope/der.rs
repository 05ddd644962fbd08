//! Minimal BER/DER reader
//!
//! Only what is needed to dig the payload out of a PKCS#7 envelope:
//! single-byte tags, definite and indefinite lengths, and OCTET STRINGs in
//! either primitive or constructed (chunked) form.

use crate::error::EnvelopeError;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OCTET_STRING_CONSTRUCTED: u8 = 0x24;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;
pub const TAG_CONTEXT_0: u8 = 0xA0;

/// Deepest nesting of indefinite-length or chunked elements accepted
pub const MAX_NESTING: usize = 64;

/// One tag-length-value element borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub tag: u8,
    pub content: &'a [u8],
}

impl<'a> Tlv<'a> {
    pub fn is_constructed(&self) -> bool {
        self.tag & 0x20 != 0
    }

    /// Fail unless the element carries `tag`
    pub fn require(self, tag: u8, what: &str) -> Result<Self, EnvelopeError> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(EnvelopeError::malformed(format!(
                "expected {what} (tag 0x{tag:02x}), found tag 0x{:02x}",
                self.tag
            )))
        }
    }

    /// The elements nested in a constructed element
    pub fn children(&self) -> Result<Vec<Tlv<'a>>, EnvelopeError> {
        let mut children = Vec::new();
        let mut rest = self.content;
        while !rest.is_empty() {
            let (child, next) = read_tlv(rest)?;
            children.push(child);
            rest = next;
        }
        Ok(children)
    }

    /// The bytes of an OCTET STRING, concatenating the chunks of the
    /// constructed form
    pub fn octets(&self) -> Result<Vec<u8>, EnvelopeError> {
        let mut out = Vec::with_capacity(self.content.len());
        self.collect_octets(&mut out, 0)?;
        Ok(out)
    }

    fn collect_octets(&self, out: &mut Vec<u8>, depth: usize) -> Result<(), EnvelopeError> {
        check_nesting(depth)?;
        match self.tag {
            TAG_OCTET_STRING => out.extend_from_slice(self.content),
            TAG_OCTET_STRING_CONSTRUCTED => {
                for chunk in self.children()? {
                    chunk.collect_octets(out, depth + 1)?;
                }
            }
            other => {
                return Err(EnvelopeError::malformed(format!(
                    "expected OCTET STRING, found tag 0x{other:02x}"
                )))
            }
        }
        Ok(())
    }
}

/// Read one element from the front of `input`, returning it and the rest
pub fn read_tlv(input: &[u8]) -> Result<(Tlv<'_>, &[u8]), EnvelopeError> {
    read_nested(input, 0)
}

fn read_nested(input: &[u8], depth: usize) -> Result<(Tlv<'_>, &[u8]), EnvelopeError> {
    check_nesting(depth)?;
    let (&tag, rest) = input
        .split_first()
        .ok_or_else(|| EnvelopeError::malformed("unexpected end of data"))?;
    if tag & 0x1f == 0x1f {
        return Err(EnvelopeError::malformed("multi-byte tags are not supported"));
    }
    let (&first, rest) = rest
        .split_first()
        .ok_or_else(|| EnvelopeError::malformed("missing length"))?;

    match first {
        0x80 => {
            if tag & 0x20 == 0 {
                return Err(EnvelopeError::malformed(
                    "indefinite length on a primitive element",
                ));
            }
            // Content runs until the end-of-contents marker at this level
            let mut cursor = rest;
            loop {
                if cursor.starts_with(&[0x00, 0x00]) {
                    let len = rest.len() - cursor.len();
                    return Ok((Tlv { tag, content: &rest[..len] }, &cursor[2..]));
                }
                if cursor.is_empty() {
                    return Err(EnvelopeError::malformed("missing end-of-contents marker"));
                }
                let (_, next) = read_nested(cursor, depth + 1)?;
                cursor = next;
            }
        }
        short if short < 0x80 => take(tag, rest, short as usize),
        long => {
            let count = (long & 0x7f) as usize;
            if count > 4 || rest.len() < count {
                return Err(EnvelopeError::malformed("invalid length encoding"));
            }
            let len = rest[..count]
                .iter()
                .fold(0usize, |len, &byte| (len << 8) | byte as usize);
            take(tag, &rest[count..], len)
        }
    }
}

fn check_nesting(depth: usize) -> Result<(), EnvelopeError> {
    if depth > MAX_NESTING {
        return Err(EnvelopeError::malformed(format!(
            "elements nested deeper than {MAX_NESTING} levels"
        )));
    }
    Ok(())
}

fn take(tag: u8, rest: &[u8], len: usize) -> Result<(Tlv<'_>, &[u8]), EnvelopeError> {
    if rest.len() < len {
        return Err(EnvelopeError::malformed(format!(
            "element of {len} bytes truncated to {}",
            rest.len()
        )));
    }
    let (content, rest) = rest.split_at(len);
    Ok((Tlv { tag, content }, rest))
}

/// Dotted form of an encoded OBJECT IDENTIFIER
pub fn format_oid(encoded: &[u8]) -> String {
    let mut arcs: Vec<u64> = Vec::new();
    let mut value: u64 = 0;
    for &byte in encoded {
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            if arcs.is_empty() {
                let first = (value / 40).min(2);
                arcs.push(first);
                arcs.push(value - first * 40);
            } else {
                arcs.push(value);
            }
            value = 0;
        }
    }
    arcs.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Encode an element with a definite length (used to build test envelopes)
#[cfg(test)]
pub fn encode(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes: Vec<u8> = len
            .to_be_bytes()
            .iter()
            .copied()
            .skip_while(|&b| b == 0)
            .collect();
        out.push(0x80 | bytes.len() as u8);
        out.extend(bytes);
    }
    out.extend_from_slice(content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_long_lengths() {
        let short = encode(TAG_OCTET_STRING, b"abc");
        let (tlv, rest) = read_tlv(&short).unwrap();
        assert_eq!(tlv.content, b"abc");
        assert!(rest.is_empty());

        let payload = vec![7u8; 300];
        let long = encode(TAG_OCTET_STRING, &payload);
        assert_eq!(&long[..4], &[0x04, 0x82, 0x01, 0x2c]);
        let (tlv, _) = read_tlv(&long).unwrap();
        assert_eq!(tlv.content.len(), 300);
    }

    #[test]
    fn test_indefinite_length_with_chunked_octets() {
        let mut chunked = vec![TAG_OCTET_STRING_CONSTRUCTED, 0x80];
        chunked.extend(encode(TAG_OCTET_STRING, b"<a>"));
        chunked.extend(encode(TAG_OCTET_STRING, b"</a>"));
        chunked.extend([0x00, 0x00]);
        chunked.extend(encode(TAG_INTEGER, &[1]));

        let (tlv, rest) = read_tlv(&chunked).unwrap();
        assert!(tlv.is_constructed());
        assert_eq!(tlv.octets().unwrap(), b"<a></a>");
        assert_eq!(rest, &[TAG_INTEGER, 1, 1]);
    }

    #[test]
    fn test_truncated_input() {
        assert!(read_tlv(&[]).is_err());
        assert!(read_tlv(&[TAG_SEQUENCE]).is_err());
        assert!(read_tlv(&[TAG_SEQUENCE, 0x05, 0x01]).is_err());
        assert!(read_tlv(&[TAG_SEQUENCE, 0x80, 0x02, 0x01, 0x00]).is_err());
    }

    #[test]
    fn test_deep_indefinite_nesting_is_rejected() {
        let deep = [TAG_SEQUENCE, 0x80].repeat(200_000);
        assert!(matches!(
            read_tlv(&deep),
            Err(EnvelopeError::Malformed { .. })
        ));

        let mut shallow = [TAG_SEQUENCE, 0x80].repeat(MAX_NESTING);
        shallow.extend([0x00, 0x00].repeat(MAX_NESTING));
        let (tlv, rest) = read_tlv(&shallow).unwrap();
        assert_eq!(tlv.tag, TAG_SEQUENCE);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_deep_chunked_octets_are_rejected() {
        let nest = |levels: usize| {
            (0..levels).fold(encode(TAG_OCTET_STRING, b"x"), |inner, _| {
                encode(TAG_OCTET_STRING_CONSTRUCTED, &inner)
            })
        };

        let ok_input = nest(MAX_NESTING);
        let (tlv, _) = read_tlv(&ok_input).unwrap();
        assert_eq!(tlv.octets().unwrap(), b"x");

        let deep_input = nest(MAX_NESTING + 1);
        let (tlv, _) = read_tlv(&deep_input).unwrap();
        assert!(matches!(tlv.octets(), Err(EnvelopeError::Malformed { .. })));
    }

    #[test]
    fn test_format_oid() {
        let signed_data = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];
        assert_eq!(format_oid(&signed_data), "1.2.840.113549.1.7.2");
    }
}
