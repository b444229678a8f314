//! Matcher behaviour against hand-built and embedded signature sets
//!
//! Covers the search bounds (distance, range), alternation budgets, wildcard
//! splitting, and BOF/EOF/Var anchoring over full and truncated buffers.

use std::io::Cursor;
use std::sync::Arc;

use sigid::{
    Anchor, Buffer, BufferLimits, Frame, Gap, Matcher, MatchingConfig, Segment, Signature,
    SignatureSet,
};

fn matcher(signatures: Vec<Signature>, config: MatchingConfig) -> Matcher {
    let set = SignatureSet::from_signatures(signatures).expect("valid signatures");
    Matcher::new(Arc::new(set), config)
}

fn embedded() -> Matcher {
    let set = SignatureSet::load_embedded().expect("embedded set loads");
    Matcher::new(Arc::new(set), MatchingConfig::default())
}

fn separated(gap: usize) -> Buffer {
    let mut bytes = b"HEAD".to_vec();
    bytes.extend(std::iter::repeat(0u8).take(gap));
    bytes.extend_from_slice(b"BODY");
    bytes.extend_from_slice(b"trailing bytes");
    Buffer::from_bytes(bytes)
}

fn head_body() -> Signature {
    Signature::new("x-head-body", "Head and body", Anchor::Bof).with_segments(vec![
        Segment::fixed(0, b"HEAD".to_vec()),
        Segment::new(Gap::unbounded(0), vec![Frame::bytes(*b"BODY")]),
    ])
}

/// A gap of exactly `distance` bytes matches; one more byte does not
#[test]
fn test_distance_is_inclusive_bound() {
    let distance = 100;
    let m = matcher(
        vec![head_body()],
        MatchingConfig::default()
            .with_distance(distance)
            .with_range(10_000),
    );

    let hit = m.find_matches(&separated(distance));
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].hits[1].offset, 4 + distance as u64);

    assert!(m.find_matches(&separated(distance + 1)).is_empty());
}

/// With default settings the range (2049) is the tighter bound
#[test]
fn test_default_range_caps_distance() {
    let m = matcher(vec![head_body()], MatchingConfig::default());
    assert_eq!(m.find_matches(&separated(2049)).len(), 1);
    assert!(m.find_matches(&separated(2050)).is_empty());
}

fn over_budget() -> Signature {
    Signature::new("x-alt", "Alternations", Anchor::Bof).with_segments(vec![Segment::new(
        Gap::exact(0),
        vec![
            Frame::bytes(*b"ALT"),
            Frame::choice([b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]),
            Frame::choice([b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]),
        ],
    )])
}

/// Exceeding the choices limit never yields full confidence, and the result is stable
#[test]
fn test_choices_exceeded_is_approximate_and_deterministic() {
    let buffer = Buffer::from_bytes(b"ALTc2 rest".to_vec());

    let within = matcher(vec![over_budget()], MatchingConfig::default().with_choices(12));
    let exact = within.find_matches(&buffer);
    assert_eq!(exact.len(), 1);
    assert!((exact[0].confidence - 1.0).abs() < f64::EPSILON);

    let limited = matcher(vec![over_budget()], MatchingConfig::default().with_choices(4));
    let first = limited.find_matches(&buffer);
    assert_eq!(first.len(), 1);
    assert!(first[0].confidence < 1.0);
    assert!(first[0].basis()[0].contains("approximate"));

    for _ in 0..5 {
        let rebuilt = matcher(vec![over_budget()], MatchingConfig::default().with_choices(4));
        assert_eq!(rebuilt.find_matches(&buffer), first);
    }
}

/// The relaxed alternation still constrains length, so a wrong byte count fails
#[test]
fn test_relaxed_choice_keeps_length_bounds() {
    let limited = matcher(vec![over_budget()], MatchingConfig::default().with_choices(4));
    assert!(limited
        .find_matches(&Buffer::from_bytes(b"ALTc".to_vec()))
        .is_empty());
}

fn wildcard_signature() -> Signature {
    Signature::new("x-wild", "Wildcard", Anchor::Bof).with_segments(vec![Segment::new(
        Gap::exact(0),
        vec![
            Frame::bytes(*b"RIFF"),
            Frame::any(4, Some(4)),
            Frame::bytes(*b"WAVE"),
        ],
    )])
}

/// Wildcards shorter than var-length stay inside the segment; longer ones split it
#[test]
fn test_var_length_controls_segment_boundaries() {
    let buffer = Buffer::from_bytes(b"RIFF\x24\x08\x00\x00WAVEfmt ".to_vec());

    let folded = matcher(vec![wildcard_signature()], MatchingConfig::default().with_var_length(5));
    let results = folded.find_matches(&buffer);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hits.len(), 1);
    assert_eq!(results[0].hits[0].length, 12);

    let split = matcher(vec![wildcard_signature()], MatchingConfig::default().with_var_length(4));
    let results = split.find_matches(&buffer);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hits.len(), 2);
    assert_eq!(results[0].hits[1].offset, 8);
    assert!((results[0].confidence - 1.0).abs() < f64::EPSILON);
}

/// A PDF header at offset zero is an exact match
#[test]
fn test_pdf_header_scenario() {
    let pdf = Signature::new("x-pdf", "PDF", Anchor::Bof)
        .with_segments(vec![Segment::fixed(0, vec![0x25, 0x50, 0x44, 0x46])]);
    let m = matcher(vec![pdf], MatchingConfig::default().with_distance(0));

    let results = m.find_matches(&Buffer::from_bytes(b"\x25\x50\x44\x46-1.5\n".to_vec()));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hits[0].offset, 0);
    assert!((results[0].confidence - 1.0).abs() < f64::EPSILON);

    // Shifted by one byte the zero-width window misses it
    assert!(m
        .find_matches(&Buffer::from_bytes(b" \x25\x50\x44\x46".to_vec()))
        .is_empty());
}

#[test]
fn test_embedded_formats() {
    let m = embedded();
    let cases: Vec<(&[u8], &str)> = vec![
        (b"%PDF-1.7\n", "x-fmt/pdf"),
        (b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR", "x-fmt/png"),
        (b"GIF89a\x01\x00", "x-fmt/gif"),
        (b"\xff\xd8\xff\xe0", "x-fmt/jpeg"),
        (b"\x7fELF\x02\x01\x01", "x-fmt/elf"),
        (b"<?xml version=\"1.0\"?>", "x-fmt/xml"),
    ];

    for (bytes, expected) in cases {
        let results = m.find_matches(&Buffer::from_bytes(bytes.to_vec()));
        assert!(
            results.iter().any(|r| r.format_id.as_str() == expected),
            "expected {expected}, got {:?}",
            results.iter().map(|r| r.format_id.as_str()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_tar_magic_at_fixed_offset() {
    let mut bytes = vec![0u8; 512];
    bytes[257..262].copy_from_slice(b"ustar");
    let results = embedded().find_matches(&Buffer::from_bytes(bytes));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].format_id.as_str(), "x-fmt/tar");
    assert_eq!(results[0].hits[0].offset, 257);
}

#[test]
fn test_var_anchor_finds_marker_anywhere_in_head() {
    let mut bytes = vec![b' '; 3000];
    bytes.extend_from_slice(b"<!DOCTYPE html><html></html>");
    let results = embedded().find_matches(&Buffer::from_bytes(bytes));
    let html = results
        .iter()
        .find(|r| r.format_id.as_str() == "x-fmt/html")
        .expect("html matched");
    assert_eq!(html.hits[0].offset, 3000);
}

fn id3_tail() -> Vec<u8> {
    let mut tag = b"TAG".to_vec();
    tag.extend(std::iter::repeat(b'x').take(125));
    tag
}

#[test]
fn test_eof_anchor() {
    let mut bytes = b"ID3 frames and audio".to_vec();
    bytes.extend(id3_tail());
    let len = bytes.len() as u64;

    let results = embedded().find_matches(&Buffer::from_bytes(bytes));
    let mp3 = results
        .iter()
        .find(|r| r.format_id.as_str() == "x-fmt/mp3-id3v1")
        .expect("id3v1 trailer matched");
    assert_eq!(mp3.hits[0].offset, len - 128);
    assert_eq!(mp3.hits[0].anchor, Anchor::Eof);
}

/// Head and tail windows still match after the middle of the input is dropped
#[test]
fn test_truncated_buffer_matches_both_ends() {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.extend(std::iter::repeat(b'.').take(10_000));
    bytes.extend(id3_tail());
    let len = bytes.len() as u64;

    let buffer = Buffer::from_seekable(Cursor::new(bytes), BufferLimits::new(256, 256))
        .expect("seekable read");
    assert!(buffer.is_truncated());

    let results = embedded().find_matches(&buffer);
    let ids: Vec<&str> = results.iter().map(|r| r.format_id.as_str()).collect();
    assert!(ids.contains(&"x-fmt/pdf"));
    assert!(ids.contains(&"x-fmt/mp3-id3v1"));

    let mp3 = results
        .iter()
        .find(|r| r.format_id.as_str() == "x-fmt/mp3-id3v1")
        .expect("id3v1 trailer matched");
    assert_eq!(mp3.hits[0].offset, len - 128);
}

#[test]
fn test_ambiguity_is_preserved() {
    let zip = Signature::new("x-zip", "ZIP", Anchor::Bof)
        .with_segments(vec![Segment::fixed(0, b"PK\x03\x04".to_vec())]);
    let docx = Signature::new("x-docx", "Word document", Anchor::Bof).with_segments(vec![
        Segment::fixed(0, b"PK\x03\x04".to_vec()),
        Segment::new(Gap::unbounded(0), vec![Frame::bytes(*b"word/")]),
    ]);
    let m = matcher(vec![zip, docx], MatchingConfig::default());

    let results = m.find_matches(&Buffer::from_bytes(b"PK\x03\x04....word/document.xml".to_vec()));
    let ids: Vec<&str> = results.iter().map(|r| r.format_id.as_str()).collect();
    assert_eq!(ids, vec!["x-zip", "x-docx"]);
}

/// An early decoy of the first piece does not hide a later complete match
#[test]
fn test_var_signature_skips_decoy_head() {
    let sig = Signature::new("x-pk-zz", "PK then ZZ", Anchor::Var).with_segments(vec![
        Segment::fixed(0, b"PK".to_vec()),
        Segment::new(Gap::exact(2), vec![Frame::bytes(*b"ZZ")]),
    ]);
    let results = matcher(vec![sig], MatchingConfig::default())
        .find_matches(&Buffer::from_bytes(b"PKabPKcdZZ".to_vec()));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hits[0].offset, 4);
    assert_eq!(results[0].hits[1].offset, 8);
}

/// A later occurrence of a middle segment is tried when the first leaves no room
#[test]
fn test_middle_segment_retried_further_along() {
    let sig = Signature::new("x-abc", "A B C", Anchor::Bof).with_segments(vec![
        Segment::fixed(0, b"A".to_vec()),
        Segment::new(Gap::unbounded(0), vec![Frame::bytes(*b"B")]),
        Segment::new(Gap::exact(0), vec![Frame::bytes(*b"C")]),
    ]);
    let results = matcher(vec![sig], MatchingConfig::default())
        .find_matches(&Buffer::from_bytes(b"ABxBC".to_vec()));

    assert_eq!(results.len(), 1);
    let offsets: Vec<u64> = results[0].hits.iter().map(|h| h.offset).collect();
    assert_eq!(offsets, vec![0, 3, 4]);
}

/// Splitting on a bounded wildcard still finds the pair after an unrelated head
#[test]
fn test_split_segment_skips_unrelated_head() {
    let sig = Signature::new("x-riff-wave", "RIFF WAVE", Anchor::Var).with_segments(vec![
        Segment::new(
            Gap::exact(0),
            vec![
                Frame::bytes(*b"RIFF"),
                Frame::any(4, Some(4)),
                Frame::bytes(*b"WAVE"),
            ],
        ),
    ]);
    let results = matcher(vec![sig], MatchingConfig::default())
        .find_matches(&Buffer::from_bytes(b"RIFF....RIFF....WAVE".to_vec()));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hits[0].offset, 8);
    assert_eq!(results[0].hits[1].offset, 16);
}
