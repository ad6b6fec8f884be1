//! Verification decoder.
//!
//! Turns a `mappings` string (or a whole wire document) back into absolute
//! [`LineGroup`]s. It exists to check what the encoder produced, in tests and
//! in the `srcmap` CLI.

use serde::Deserialize;

use crate::error::{SourceMapError, SourceMapResult};
use crate::model::{Attribution, LineGroup, Segment};
use crate::vlq;

/// Decode a `mappings` string into one [`LineGroup`] per generated line.
///
/// # Errors
///
/// - [`SourceMapError::MalformedVlq`] for bad VLQ text, or a segment whose
///   field count is not 1, 4 or 5
/// - [`SourceMapError::InvalidMapping`] when accumulated deltas go negative
pub fn decode_mappings(text: &str) -> SourceMapResult<Vec<LineGroup>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    let mut fields = Vec::with_capacity(5);
    // source, source line, source column, name
    let mut prev = [0i64; 4];
    let mut offset = 0;

    for group in text.split(';') {
        let mut segments = Vec::new();
        let mut generated = 0i64;
        let mut segment_offset = offset;

        if !group.is_empty() {
            for segment in group.split(',') {
                fields.clear();
                vlq::decode_at(segment, segment_offset, &mut fields)?;

                let attribution = match fields.as_slice() {
                    [column_delta] => {
                        generated = accumulate(generated, *column_delta, segment_offset)?;
                        Attribution::Unmapped
                    }
                    [column_delta, rest @ ..] if rest.len() == 3 || rest.len() == 4 => {
                        generated = accumulate(generated, *column_delta, segment_offset)?;
                        for (slot, delta) in prev.iter_mut().zip(rest) {
                            *slot = accumulate(*slot, *delta, segment_offset)?;
                        }
                        Attribution::Mapped {
                            source: absolute(prev[0], segment_offset)?,
                            line: absolute(prev[1], segment_offset)?,
                            column: absolute(prev[2], segment_offset)?,
                            name: match rest.len() {
                                4 => Some(absolute(prev[3], segment_offset)?),
                                _ => None,
                            },
                        }
                    }
                    [] => {
                        return Err(SourceMapError::malformed_vlq(
                            segment_offset,
                            "empty segment",
                        ));
                    }
                    _ => {
                        return Err(SourceMapError::malformed_vlq(
                            segment_offset,
                            "segment must have 1, 4 or 5 fields",
                        ));
                    }
                };

                segments.push(Segment::new(absolute(generated, segment_offset)?, attribution));
                segment_offset += segment.len() + 1;
            }
        }

        lines.push(LineGroup::new(segments));
        offset += group.len() + 1;
    }
    Ok(lines)
}

fn accumulate(total: i64, delta: i64, offset: usize) -> SourceMapResult<i64> {
    total
        .checked_add(delta)
        .ok_or_else(|| SourceMapError::malformed_vlq(offset, "value does not fit in 64 bits"))
}

fn absolute(value: i64, offset: usize) -> SourceMapResult<u32> {
    u32::try_from(value).map_err(|_| {
        SourceMapError::invalid_mapping(format!(
            "segment at offset {offset} resolves to out-of-range value {value}"
        ))
    })
}

/// A Source Map v3 document as read back from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    /// Format revision, 3 for every map this crate writes
    pub version: u32,
    /// Generated file path
    #[serde(default)]
    pub file: String,
    /// Prefix for every source path
    #[serde(default)]
    pub source_root: Option<String>,
    /// Source paths
    #[serde(default)]
    pub sources: Vec<String>,
    /// Source texts aligned with `sources`
    #[serde(default)]
    pub sources_content: Option<Vec<Option<String>>>,
    /// Identifier names
    #[serde(default)]
    pub names: Vec<String>,
    /// Encoded mappings
    #[serde(default)]
    pub mappings: String,
}

impl RawSourceMap {
    /// Parse a wire document
    pub fn from_json(text: &str) -> SourceMapResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode the `mappings` field
    pub fn decode(&self) -> SourceMapResult<Vec<LineGroup>> {
        decode_mappings(&self.mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_mappings;

    #[test]
    fn test_decode_unmapped_run() {
        let lines = decode_mappings("A").unwrap();
        assert_eq!(lines, vec![LineGroup::new(vec![Segment::unmapped(0)])]);
    }

    #[test]
    fn test_decode_keeps_empty_lines() {
        let lines = decode_mappings("A;;E").unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2].segments(), &[Segment::unmapped(2)]);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let lines = vec![
            LineGroup::new(vec![Segment::mapped(4, 0, 0, 0), Segment::unmapped(9)]),
            LineGroup::default(),
            LineGroup::new(vec![
                Segment::mapped(0, 1, 7, 3).with_name(2),
                Segment::mapped(5, 0, 2, 0),
            ]),
        ];
        assert_eq!(decode_mappings(&encode_mappings(&lines)).unwrap(), lines);
    }

    #[test]
    fn test_decode_rejects_two_field_segment() {
        let err = decode_mappings("AAAA,CA").unwrap_err();
        match err {
            SourceMapError::MalformedVlq { offset, .. } => assert_eq!(offset, 5),
            other => panic!("expected MalformedVlq, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_empty_segment() {
        assert!(matches!(
            decode_mappings("AAAA,,C"),
            Err(SourceMapError::MalformedVlq { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_negative_position() {
        assert!(matches!(
            decode_mappings("AADA"),
            Err(SourceMapError::InvalidMapping(_))
        ));
    }

    #[test]
    fn test_decode_rejects_overflowing_column_delta() {
        let text = format!("{},{}", vlq::encode(&[5]), vlq::encode(&[i64::MAX]));
        match decode_mappings(&text).unwrap_err() {
            SourceMapError::MalformedVlq { offset, .. } => assert_eq!(offset, 2),
            other => panic!("expected MalformedVlq, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_overflowing_source_delta() {
        let text = format!(
            "{},{}",
            vlq::encode(&[0, 5, 0, 0]),
            vlq::encode(&[0, i64::MAX, 0, 0])
        );
        match decode_mappings(&text).unwrap_err() {
            SourceMapError::MalformedVlq { offset, .. } => assert_eq!(offset, 5),
            other => panic!("expected MalformedVlq, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_source_map_from_json() {
        let raw = RawSourceMap::from_json(
            r#"{"version":3,"file":"a.js","sources":["a.tm"],"names":[],"mappings":"AAAA;C"}"#,
        )
        .unwrap();
        assert_eq!(raw.version, 3);
        assert!(raw.source_root.is_none());
        assert!(raw.sources_content.is_none());
        assert_eq!(raw.decode().unwrap().len(), 2);
    }
}
