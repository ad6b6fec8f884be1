//! Base64 VLQ codec.
//!
//! Each signed integer is folded into an unsigned magnitude with the sign in
//! the lowest bit, then written as little-endian groups of 5 bits. Every digit
//! except the last carries the continuation bit (32), and each 6-bit digit is
//! mapped through the standard Base64 alphabet.
//!
//! ```
//! assert_eq!(srcmap::vlq::encode(&[0, 1, -1, 16]), "ACDgB");
//! assert_eq!(srcmap::vlq::decode("ACDgB").unwrap(), vec![0, 1, -1, 16]);
//! ```

use crate::error::{SourceMapError, SourceMapResult};

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE: u8 = 1 << VLQ_BASE_SHIFT;
const VLQ_BASE_MASK: u8 = VLQ_BASE - 1;
const VLQ_CONTINUATION_BIT: u8 = VLQ_BASE;

/// Widest accumulator shift a 64-bit value (plus its sign bit) can need.
const MAX_SHIFT: u32 = 65;

/// Encode a sequence of integers as concatenated VLQ digit groups.
pub fn encode(values: &[i64]) -> String {
    let mut out = String::with_capacity(values.len() * 2);
    encode_into(values, &mut out);
    out
}

/// Append the VLQ digit groups for `values` to `out`.
pub fn encode_into(values: &[i64], out: &mut String) {
    for &value in values {
        encode_value(value, out);
    }
}

/// Append the digit group for a single integer to `out`.
pub fn encode_value(value: i64, out: &mut String) {
    let mut vlq = (u128::from(value.unsigned_abs()) << 1) | u128::from(value < 0);
    loop {
        let mut digit = (vlq & u128::from(VLQ_BASE_MASK)) as u8;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(char::from(BASE64_ALPHABET[usize::from(digit)]));
        if vlq == 0 {
            break;
        }
    }
}

/// Decode concatenated VLQ digit groups back into integers.
///
/// # Errors
///
/// [`SourceMapError::MalformedVlq`] if the text contains a character outside
/// the Base64 alphabet, ends in the middle of a digit group, or holds a value
/// that does not fit in an `i64`.
pub fn decode(text: &str) -> SourceMapResult<Vec<i64>> {
    let mut values = Vec::new();
    decode_at(text, 0, &mut values)?;
    Ok(values)
}

/// Decode `text` into `out`, reporting error offsets relative to `base_offset`.
pub(crate) fn decode_at(
    text: &str,
    base_offset: usize,
    out: &mut Vec<i64>,
) -> SourceMapResult<()> {
    let mut accum: u128 = 0;
    let mut shift: u32 = 0;

    for (i, byte) in text.bytes().enumerate() {
        let offset = base_offset + i;
        let digit = base64_value(byte).ok_or_else(|| {
            SourceMapError::malformed_vlq(offset, "character outside the Base64 alphabet")
        })?;
        if shift > MAX_SHIFT {
            return Err(SourceMapError::malformed_vlq(
                offset,
                "value does not fit in 64 bits",
            ));
        }

        accum |= u128::from(digit & VLQ_BASE_MASK) << shift;
        if digit & VLQ_CONTINUATION_BIT != 0 {
            shift += VLQ_BASE_SHIFT;
        } else {
            out.push(fold_sign(accum).ok_or_else(|| {
                SourceMapError::malformed_vlq(offset, "value does not fit in 64 bits")
            })?);
            accum = 0;
            shift = 0;
        }
    }

    if shift != 0 {
        return Err(SourceMapError::malformed_vlq(
            base_offset + text.len(),
            "input ends inside a digit group",
        ));
    }
    Ok(())
}

fn fold_sign(vlq: u128) -> Option<i64> {
    let magnitude = (vlq >> 1) as i128;
    let value = if vlq & 1 == 1 { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn base64_value(byte: u8) -> Option<u8> {
    match byte {
        b'A'..=b'Z' => Some(byte - b'A'),
        b'a'..=b'z' => Some(byte - b'a' + 26),
        b'0'..=b'9' => Some(byte - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_literal_vectors() {
        let cases: &[(i64, &str)] = &[
            (0, "A"),
            (1, "C"),
            (-1, "D"),
            (5, "K"),
            (-10, "V"),
            (-15, "f"),
            (-16, "hB"),
            (-47, "/C"),
            (89, "yF"),
            (90, "0F"),
            (228, "oO"),
        ];
        for &(value, expected) in cases {
            assert_eq!(encode(&[value]), expected, "encoding {value}");
        }
    }

    #[test]
    fn test_encode_sequence_has_no_separator() {
        assert_eq!(encode(&[13, 0, 12, 8, 0]), "aAYQA");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_sequence() {
        assert_eq!(decode("aAYQA").unwrap(), vec![13, 0, 12, 8, 0]);
        assert_eq!(decode("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_negative_zero_decodes_to_zero() {
        assert_eq!(decode("B").unwrap(), vec![0]);
    }

    #[test]
    fn test_extreme_values() {
        for value in [i64::MAX, i64::MIN, i64::MIN + 1] {
            let encoded = encode(&[value]);
            assert_eq!(decode(&encoded).unwrap(), vec![value]);
        }
    }

    #[test]
    fn test_decode_rejects_foreign_character() {
        match decode("AA,A") {
            Err(SourceMapError::MalformedVlq { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("expected MalformedVlq, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_truncated_group() {
        // 'g' carries the continuation bit, so another digit must follow.
        match decode("Ag") {
            Err(SourceMapError::MalformedVlq { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("expected MalformedVlq, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_overlong_group() {
        let overlong = "g".repeat(20) + "A";
        assert!(matches!(
            decode(&overlong),
            Err(SourceMapError::MalformedVlq { .. })
        ));
    }
}
