//! Fixed-width string form of raw ids.
//!
//! A raw id is written as its 8 big-endian bytes in lowercase hex. Big-endian
//! keeps the string order identical to the numeric order of non-negative ids,
//! so sorting identifiers as strings sorts them by time.

use crate::error::Error;

/// Length of an encoded raw id.
pub const ENCODED_LEN: usize = 16;

/// Encodes a raw id as 16 lowercase hex characters.
///
/// ```
/// assert_eq!(snowflake_idgen::encode(0x1234), "0000000000001234");
/// ```
pub fn encode(raw: i64) -> String {
    hex::encode(raw.to_be_bytes())
}

/// Encodes a raw id behind `prefix`.
pub fn encode_with_prefix(prefix: &str, raw: i64) -> String {
    let mut id = String::with_capacity(prefix.len() + ENCODED_LEN);
    id.push_str(prefix);
    id.push_str(&encode(raw));
    id
}

/// Decodes the output of [`encode`] back into the raw id.
///
/// Only the canonical form is accepted: exactly 16 characters from
/// `[0-9a-f]`.
pub fn decode(encoded: &str) -> Result<i64, Error> {
    if encoded.len() != ENCODED_LEN {
        return Err(malformed(encoded, "expected 16 characters"));
    }
    if !encoded
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return Err(malformed(encoded, "expected lowercase hex digits"));
    }

    let mut buf = [0u8; 8];
    hex::decode_to_slice(encoded, &mut buf)
        .map_err(|_| malformed(encoded, "expected lowercase hex digits"))?;
    Ok(i64::from_be_bytes(buf))
}

fn malformed(input: &str, reason: &'static str) -> Error {
    Error::MalformedIdentifier {
        input: input.to_owned(),
        reason,
    }
}
