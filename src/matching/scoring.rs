use crate::core::types::Anchor;
use crate::matching::segment::SegmentPlan;

/// Weight of an approximate segment hit relative to an exact one
pub const APPROXIMATE_WEIGHT: f64 = 0.5;

/// Safely convert usize to f64 for ratio calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Where one planned segment piece matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHit {
    /// Index of the signature segment the piece was cut from
    pub segment: usize,

    pub anchor: Anchor,

    /// Absolute offset of the first matched byte
    pub offset: u64,

    /// Number of matched bytes
    pub length: usize,

    /// False when the piece matched under a relaxed choice
    pub exact: bool,
}

impl SegmentHit {
    /// Build a hit from a match at `start..end` in processing coordinates.
    ///
    /// EOF plans run over the reversed tail, so their coordinates count back
    /// from the end of the source.
    #[must_use]
    pub fn new(piece: &SegmentPlan, anchor: Anchor, total: u64, start: usize, end: usize) -> Self {
        let offset = match anchor {
            Anchor::Eof => total.saturating_sub(end as u64),
            Anchor::Bof | Anchor::Var => start as u64,
        };
        Self {
            segment: piece.origin,
            anchor,
            offset,
            length: end - start,
            exact: !piece.approximate,
        }
    }

    /// Human-readable evidence line
    #[must_use]
    pub fn describe(&self) -> String {
        let kind = if self.exact {
            "exact"
        } else {
            "approximate (choices relaxed)"
        };
        format!(
            "{} segment {} {kind} match at offset {} ({} bytes)",
            self.anchor,
            self.segment + 1,
            self.offset,
            self.length
        )
    }
}

/// Confidence of a fully matched signature.
///
/// 1.0 when every hit is exact; otherwise exact hits count fully and
/// approximate hits count [`APPROXIMATE_WEIGHT`].
#[must_use]
pub fn confidence(hits: &[SegmentHit]) -> f64 {
    if hits.is_empty() {
        return 0.0;
    }
    let exact = hits.iter().filter(|h| h.exact).count();
    let approximate = hits.len() - exact;
    (count_to_f64(exact) + APPROXIMATE_WEIGHT * count_to_f64(approximate))
        / count_to_f64(hits.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(exact: bool) -> SegmentHit {
        SegmentHit {
            segment: 0,
            anchor: Anchor::Bof,
            offset: 0,
            length: 4,
            exact,
        }
    }

    #[test]
    fn test_confidence_all_exact() {
        assert!((confidence(&[hit(true), hit(true)]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_confidence_mixed() {
        assert!((confidence(&[hit(true), hit(false)]) - 0.75).abs() < f64::EPSILON);
        assert!((confidence(&[hit(false)]) - 0.5).abs() < f64::EPSILON);
        assert!(confidence(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_describe() {
        let line = hit(true).describe();
        assert_eq!(line, "BOF segment 1 exact match at offset 0 (4 bytes)");
        assert!(hit(false).describe().contains("approximate"));
    }
}
