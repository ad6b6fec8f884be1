//! Wire serialization.
//!
//! The `mappings` string is broken down as follows:
//! - each group of segments for one generated line is separated by `;`
//! - segments within a line are separated by `,`
//! - each segment is 1, 4 or 5 VLQ fields: generated column, then source
//!   index, source line and source column, then name index
//!
//! The generated column is relative to the previous segment on the same line
//! and starts from 0 on every line. The other four fields are relative to
//! their previous occurrence anywhere in the map.

use serde::Serialize;
use std::io::Write;

use crate::error::SourceMapResult;
use crate::model::{Attribution, LineGroup, SOURCE_MAP_VERSION, SourceMap};
use crate::vlq;

/// Encode line groups into a `mappings` string.
pub fn encode_mappings(lines: &[LineGroup]) -> String {
    let mut out = String::new();
    let mut prev_source = 0i64;
    let mut prev_line = 0i64;
    let mut prev_column = 0i64;
    let mut prev_name = 0i64;

    for (i, group) in lines.iter().enumerate() {
        if i != 0 {
            out.push(';');
        }

        let mut prev_generated = 0i64;
        for (j, segment) in group.segments().iter().enumerate() {
            if j != 0 {
                out.push(',');
            }

            let generated = i64::from(segment.generated_column);
            vlq::encode_value(generated - prev_generated, &mut out);
            prev_generated = generated;

            if let Attribution::Mapped {
                source,
                line,
                column,
                name,
            } = segment.attribution
            {
                let (source, line, column) =
                    (i64::from(source), i64::from(line), i64::from(column));
                vlq::encode_into(
                    &[source - prev_source, line - prev_line, column - prev_column],
                    &mut out,
                );
                prev_source = source;
                prev_line = line;
                prev_column = column;

                if let Some(name) = name {
                    let name = i64::from(name);
                    vlq::encode_value(name - prev_name, &mut out);
                    prev_name = name;
                }
            }
        }
    }
    out
}

/// Borrowed view of a map in wire field order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument<'a> {
    version: u32,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_root: Option<&'a str>,
    sources: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_content: Option<&'a [Option<String>]>,
    names: &'a [String],
    mappings: String,
}

impl SourceMap {
    /// The encoded `mappings` string
    pub fn mappings(&self) -> String {
        encode_mappings(self.lines())
    }

    /// Serialize the map as a compact Source Map v3 JSON document
    pub fn to_json(&self) -> SourceMapResult<String> {
        Ok(serde_json::to_string(&self.wire())?)
    }

    /// Serialize the map as an indented JSON document
    pub fn to_json_pretty(&self) -> SourceMapResult<String> {
        Ok(serde_json::to_string_pretty(&self.wire())?)
    }

    /// Write the compact JSON document to `writer`
    pub fn to_writer(&self, writer: impl Write) -> SourceMapResult<()> {
        serde_json::to_writer(writer, &self.wire())?;
        Ok(())
    }

    fn wire(&self) -> WireDocument<'_> {
        WireDocument {
            version: SOURCE_MAP_VERSION,
            file: self.file(),
            source_root: self.source_root(),
            sources: self.sources(),
            sources_content: self.sources_content(),
            names: self.names(),
            mappings: self.mappings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;

    #[test]
    fn test_empty_map() {
        assert_eq!(encode_mappings(&[]), "");
        let map = SourceMap::new("out.js", vec![], vec![], vec![]).unwrap();
        assert_eq!(
            map.to_json().unwrap(),
            r#"{"version":3,"file":"out.js","sources":[],"names":[],"mappings":""}"#
        );
    }

    #[test]
    fn test_empty_groups_keep_their_separators() {
        let lines = vec![
            LineGroup::new(vec![Segment::unmapped(0)]),
            LineGroup::default(),
            LineGroup::default(),
            LineGroup::new(vec![Segment::unmapped(2)]),
        ];
        assert_eq!(encode_mappings(&lines), "A;;;E");
    }

    #[test]
    fn test_generated_column_resets_per_line() {
        let lines = vec![
            LineGroup::new(vec![Segment::mapped(4, 0, 0, 0), Segment::mapped(10, 0, 0, 6)]),
            LineGroup::new(vec![Segment::mapped(2, 0, 1, 2)]),
        ];
        // The second line's first segment encodes column 2 absolutely, while
        // the source column is a delta against the previous line's last segment.
        assert_eq!(encode_mappings(&lines), "IAAA,MAAM;EACJ");
    }

    #[test]
    fn test_name_delta_carries_over_unnamed_segments() {
        let lines = vec![LineGroup::new(vec![
            Segment::mapped(0, 0, 0, 0).with_name(3),
            Segment::mapped(1, 0, 0, 1),
            Segment::mapped(2, 0, 0, 2).with_name(1),
        ])];
        assert_eq!(encode_mappings(&lines), "AAAAG,CAAC,CAACF");
    }

    #[test]
    fn test_field_order_with_root_and_content() {
        let map = SourceMap::new(
            "out/app.js",
            vec!["a.tm".to_string()],
            vec![],
            vec![LineGroup::new(vec![Segment::mapped(0, 0, 0, 0)])],
        )
        .unwrap()
        .with_source_root(Some("src/".to_string()))
        .with_sources_content(vec![Some("x".to_string())])
        .unwrap();
        assert_eq!(
            map.to_json().unwrap(),
            r#"{"version":3,"file":"out/app.js","sourceRoot":"src/","sources":["a.tm"],"sourcesContent":["x"],"names":[],"mappings":"AAAA"}"#
        );
    }

    #[test]
    fn test_null_content_entries() {
        let map = SourceMap::new(
            "out.js",
            vec!["a.tm".to_string(), "b.tm".to_string()],
            vec![],
            vec![],
        )
        .unwrap()
        .with_sources_content(vec![None, Some("b".to_string())])
        .unwrap();
        assert!(map.to_json().unwrap().contains(r#""sourcesContent":[null,"b"]"#));
    }

    #[test]
    fn test_to_writer_matches_to_json() {
        let map = SourceMap::new("out.js", vec![], vec![], vec![LineGroup::default()]).unwrap();
        let mut buf = Vec::new();
        map.to_writer(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), map.to_json().unwrap());
    }
}
