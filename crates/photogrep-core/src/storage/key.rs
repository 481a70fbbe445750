//! Reversible mapping between image identifiers and cache keys.
//!
//! Cache keys are `img:` followed by the percent-escaped identifier.
//! Bytes in the unreserved set `[A-Za-z0-9._~/-]` pass through unchanged;
//! every other byte becomes `%XX` with uppercase hex. The escaping makes
//! the mapping injective, so two distinct identifiers can never collide
//! on one key, and `decode_key` recovers the exact original identifier.
//!
//! The `img:` prefix marks keys owned by the OCR cache. Keys without it
//! are foreign and are skipped when the cache enumerates its contents.

use crate::search::types::ImageId;

/// Namespace prefix for OCR cache keys.
pub const KEY_PREFIX: &str = "img:";

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    matches!(byte,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'~' | b'/' | b'-')
}

/// Encodes an image identifier into its cache key.
pub fn encode_key(id: &ImageId) -> String {
    let raw = id.as_str().as_bytes();
    let mut key = String::with_capacity(KEY_PREFIX.len() + raw.len());
    key.push_str(KEY_PREFIX);
    for &byte in raw {
        if is_unreserved(byte) {
            key.push(byte as char);
        } else {
            key.push('%');
            key.push(HEX_UPPER[(byte >> 4) as usize] as char);
            key.push(HEX_UPPER[(byte & 0x0F) as usize] as char);
        }
    }
    key
}

/// Decodes a cache key back into the image identifier it was built from.
///
/// Returns `None` for keys outside the `img:` namespace and for keys
/// whose escape sequences are malformed. Callers treat both as foreign
/// data to skip, not as errors.
pub fn decode_key(key: &str) -> Option<ImageId> {
    let encoded = key.strip_prefix(KEY_PREFIX)?;
    let bytes = encoded.as_bytes();
    let mut raw = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return None;
            }
            let hi = hex_value(bytes[i + 1])?;
            let lo = hex_value(bytes[i + 2])?;
            raw.push((hi << 4) | lo);
            i += 3;
        } else {
            raw.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(raw).ok().map(ImageId::new)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}
