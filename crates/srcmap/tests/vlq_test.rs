//! Property tests for the VLQ codec and the mappings encoder

use proptest::prelude::*;
use srcmap::{
    LineGroup, ResolvedSource, Segment, SourceId, SourceMapBuilder, SourceRef, decode_mappings,
    encode_mappings, vlq,
};

#[test]
fn test_boundary_values_round_trip() {
    // Values on both sides of each 5-bit digit boundary.
    let mut values = vec![0, 1, -1, i64::MAX, i64::MIN];
    for bits in [4, 9, 14, 19, 24, 29, 30, 31, 34, 62] {
        let edge = 1i64 << bits;
        values.extend([edge - 1, edge, -(edge - 1), -edge]);
    }
    for value in values {
        let encoded = vlq::encode(&[value]);
        assert_eq!(vlq::decode(&encoded).unwrap(), vec![value], "value {value}");
    }
}

#[test]
fn test_digit_group_lengths() {
    assert_eq!(vlq::encode(&[15]).len(), 1);
    assert_eq!(vlq::encode(&[16]).len(), 2);
    assert_eq!(vlq::encode(&[511]).len(), 2);
    assert_eq!(vlq::encode(&[512]).len(), 3);
}

fn segment_strategy() -> impl Strategy<Value = (u32, Option<(u32, u32, u32, Option<u32>)>)> {
    (
        1u32..200,
        prop::option::of((0u32..4, 0u32..500, 0u32..120, prop::option::of(0u32..6))),
    )
}

proptest! {
    #[test]
    fn prop_vlq_round_trip(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let encoded = vlq::encode(&values);
        prop_assert_eq!(vlq::decode(&encoded).unwrap(), values);
    }

    #[test]
    fn prop_vlq_small_values_use_base64_alphabet(value in -100_000i64..100_000) {
        let encoded = vlq::encode(&[value]);
        prop_assert!(encoded
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/'));
    }

    #[test]
    fn prop_mappings_round_trip(
        lines in prop::collection::vec(prop::collection::vec(segment_strategy(), 0..8), 0..6)
    ) {
        let lines: Vec<LineGroup> = lines
            .into_iter()
            .map(|segments| {
                let mut column = 0;
                let segments = segments
                    .into_iter()
                    .map(|(gap, attribution)| {
                        column += gap;
                        match attribution {
                            None => Segment::unmapped(column),
                            Some((source, line, col, None)) => {
                                Segment::mapped(column, source, line, col)
                            }
                            Some((source, line, col, Some(name))) => {
                                Segment::mapped(column, source, line, col).with_name(name)
                            }
                        }
                    })
                    .collect();
                LineGroup::new(segments)
            })
            .collect();

        let encoded = encode_mappings(&lines);
        let decoded = decode_mappings(&encoded).unwrap();
        // Zero lines and a single empty line both encode to "".
        if encoded.is_empty() {
            prop_assert!(decoded.is_empty());
            prop_assert!(lines.iter().all(LineGroup::is_empty));
        } else {
            prop_assert_eq!(decoded, lines);
        }
    }

    #[test]
    fn prop_identical_runs_merge(
        prefix in 0usize..50,
        runs in prop::collection::vec(1usize..40, 1..12)
    ) {
        let lookup = |id: &SourceId| {
            (id.as_str() == "m").then(|| ResolvedSource::from_text("m.tm", "abc\ndef\n"))
        };
        let mut b = SourceMapBuilder::new("m.js", lookup);
        b.wrote_chars(prefix).unwrap();
        let r = SourceRef::new("m", 5, 7);
        b.begin_attribution(&r).unwrap();
        for &run in &runs {
            b.wrote_chars(run).unwrap();
        }
        b.end_attribution(&r).unwrap();

        let map = b.finalize(|_| None).unwrap();
        let segments = map.lines()[0].segments();
        let mapped: Vec<&Segment> = segments
            .iter()
            .filter(|s| !s.attribution.is_unmapped())
            .collect();
        prop_assert_eq!(mapped.len(), 1);
        prop_assert_eq!(*mapped[0], Segment::mapped(prefix as u32, 0, 1, 1));
        prop_assert_eq!(segments.len(), if prefix > 0 { 2 } else { 1 });
    }
}
