use serde::Serialize;

use crate::core::types::{Confidence, FormatId};

/// Label used for identifications that found nothing
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// One candidate format identification.
///
/// Identifications are immutable once built: an identifier produces them and
/// the caller only reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    identifier: String,
    format_id: Option<FormatId>,
    label: String,
    confidence: f64,
    basis: Vec<String>,
}

impl Identification {
    /// Create an identification; confidence is clamped to `[0.0, 1.0]`
    pub fn new(
        identifier: impl Into<String>,
        format_id: Option<FormatId>,
        label: impl Into<String>,
        confidence: f64,
        basis: Vec<String>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            identifier: identifier.into(),
            format_id,
            label: label.into(),
            confidence,
            basis,
        }
    }

    /// The zero-confidence result an identifier emits when it ran but recognised nothing
    pub fn unknown(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(identifier, None, UNKNOWN_LABEL, 0.0, vec![reason.into()])
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn level(&self) -> Confidence {
        Confidence::from_score(self.confidence)
    }

    /// Human-readable description of the evidence
    #[must_use]
    pub fn basis(&self) -> String {
        self.basis.join("; ")
    }

    #[must_use]
    pub fn basis_parts(&self) -> &[String] {
        &self.basis
    }

    /// Name of the identifier that produced this result
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn format_id(&self) -> Option<&FormatId> {
        self.format_id.as_ref()
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.format_id.is_none()
    }
}

impl std::fmt::Display for Identification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Stable sort by descending confidence
pub fn sort_by_confidence(identifications: &mut [Identification]) {
    identifications.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let high = Identification::new("t", None, "x", 1.7, vec![]);
        assert!((high.confidence() - 1.0).abs() < f64::EPSILON);
        let low = Identification::new("t", None, "x", -0.2, vec![]);
        assert!(low.confidence().abs() < f64::EPSILON);
        let nan = Identification::new("t", None, "x", f64::NAN, vec![]);
        assert!(nan.confidence().abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown() {
        let unknown = Identification::unknown("bytes", "no match");
        assert!(unknown.is_unknown());
        assert_eq!(unknown.to_string(), UNKNOWN_LABEL);
        assert_eq!(unknown.basis(), "no match");
        assert_eq!(unknown.level(), Confidence::None);
    }

    #[test]
    fn test_sort_by_confidence_is_stable() {
        let mut ids = vec![
            Identification::new("t", Some(FormatId::new("a")), "a", 0.5, vec![]),
            Identification::new("t", Some(FormatId::new("b")), "b", 1.0, vec![]),
            Identification::new("t", Some(FormatId::new("c")), "c", 0.5, vec![]),
        ];
        sort_by_confidence(&mut ids);
        let labels: Vec<&str> = ids.iter().map(Identification::label).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }
}
