use crate::buffer::Buffer;
use crate::core::identification::{sort_by_confidence, Identification};
use crate::identify::Identifier;
use crate::matching::engine::{MatchResult, Matcher};
use crate::utils::validation::extension_of;

/// Default identifier name
pub const BYTE_IDENTIFIER_NAME: &str = "bytes";

/// Confidence added to an approximate match whose extension agrees
pub const EXTENSION_BOOST: f64 = 0.05;

/// Ceiling for boosted confidences; only exact byte matches reach 1.0
pub const MAX_BOOSTED_CONFIDENCE: f64 = 0.99;

/// Byte-signature identifier wrapping one [`Matcher`]
#[derive(Debug)]
pub struct ByteIdentifier {
    name: String,
    matcher: Matcher,
    use_extension: bool,
}

impl ByteIdentifier {
    #[must_use]
    pub fn new(matcher: Matcher) -> Self {
        Self {
            name: BYTE_IDENTIFIER_NAME.to_string(),
            matcher,
            use_extension: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable extension corroboration
    #[must_use]
    pub fn with_extension_check(mut self, enabled: bool) -> Self {
        self.use_extension = enabled;
        self
    }

    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    fn to_identification(&self, result: MatchResult, extension: Option<&str>) -> Identification {
        let mut basis = result.basis();
        let mut confidence = result.confidence;

        let declared = self
            .matcher
            .set()
            .signature(result.index)
            .map(|s| s.extensions.as_slice())
            .unwrap_or_default();

        if let Some(ext) = extension {
            let index = self.matcher.set().extensions();
            if index.candidates(ext).contains(&result.index) {
                basis.push(format!("extension .{ext} agrees"));
                if confidence < 1.0 {
                    confidence = (confidence + EXTENSION_BOOST)
                        .min(MAX_BOOSTED_CONFIDENCE)
                        .max(confidence);
                }
            } else if !declared.is_empty() {
                basis.push(format!("extension .{ext} not declared for this format"));
            }
        }

        Identification::new(
            self.name.clone(),
            Some(result.format_id),
            result.label,
            confidence,
            basis,
        )
    }
}

impl Identifier for ByteIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, buffer: &Buffer, filename: Option<&str>) -> Vec<Identification> {
        let matches = self.matcher.find_matches(buffer);
        if matches.is_empty() {
            return vec![Identification::unknown(
                self.name.clone(),
                "no byte signature matched",
            )];
        }

        let extension = if self.use_extension {
            filename.and_then(extension_of)
        } else {
            None
        };

        let mut identifications: Vec<Identification> = matches
            .into_iter()
            .map(|m| self.to_identification(m, extension.as_deref()))
            .collect();
        sort_by_confidence(&mut identifications);
        identifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::SignatureSet;
    use crate::core::signature::{Frame, Segment, Signature};
    use crate::core::types::{Anchor, FormatId, Gap};
    use crate::matching::engine::MatchingConfig;
    use std::sync::Arc;

    fn identifier(config: MatchingConfig) -> ByteIdentifier {
        let loose = Signature::new("x-loose", "Loose", Anchor::Bof)
            .with_extensions(["lse"])
            .with_segments(vec![Segment::new(
                Gap::exact(0),
                vec![
                    Frame::bytes(*b"LO"),
                    Frame::choice([b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]),
                ],
            )]);
        let exact = Signature::new("x-exact", "Exact", Anchor::Bof)
            .with_extensions(["ext"])
            .with_segments(vec![Segment::fixed(0, b"LO".to_vec())]);
        let set = SignatureSet::from_signatures([loose, exact]).unwrap();
        ByteIdentifier::new(Matcher::new(Arc::new(set), config))
    }

    #[test]
    fn test_unknown_when_nothing_matches() {
        let ids = identifier(MatchingConfig::default()).identify(&Buffer::from_bytes(b"zz".to_vec()), None);
        assert_eq!(ids.len(), 1);
        assert!(ids[0].is_unknown());
        assert_eq!(ids[0].identifier(), BYTE_IDENTIFIER_NAME);
    }

    #[test]
    fn test_extension_agreement_boosts_approximate() {
        let id = identifier(MatchingConfig::default().with_choices(2));
        let buffer = Buffer::from_bytes(b"LO2".to_vec());

        let plain = id.identify(&buffer, None);
        let loose = plain.iter().find(|i| i.format_id() == Some(&FormatId::new("x-loose"))).unwrap();
        assert!((loose.confidence() - 0.5).abs() < 1e-9);

        let named = id.identify(&buffer, Some("file.LSE"));
        let loose = named.iter().find(|i| i.format_id() == Some(&FormatId::new("x-loose"))).unwrap();
        assert!((loose.confidence() - 0.55).abs() < 1e-9);
        assert!(loose.basis().contains("extension .lse agrees"));

        let exact = named.iter().find(|i| i.format_id() == Some(&FormatId::new("x-exact"))).unwrap();
        assert!((exact.confidence() - 1.0).abs() < f64::EPSILON);
        assert!(exact.basis().contains("not declared"));
        assert_eq!(named[0].format_id(), Some(&FormatId::new("x-exact")));
    }

    #[test]
    fn test_extension_check_disabled() {
        let id = identifier(MatchingConfig::default().with_choices(2)).with_extension_check(false);
        let ids = id.identify(&Buffer::from_bytes(b"LO2".to_vec()), Some("file.lse"));
        assert!(ids.iter().all(|i| !i.basis().contains("extension")));
    }
}
