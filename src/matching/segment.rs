use std::collections::HashSet;

use memchr::memmem;

use crate::core::signature::{Frame, HexBytes, Segment, Signature};
use crate::core::types::{Anchor, Gap};
use crate::matching::engine::MatchingConfig;

/// One matchable unit of a planned segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Bytes(Vec<u8>),
    /// Bounded wildcard run matched in place
    Any { min: usize, max: usize },
    Choice(Vec<Vec<u8>>),
}

impl Step {
    fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any { .. })
    }
}

/// A contiguous piece of a signature segment, ready for matching.
///
/// Wildcard runs at or above `var_length` cut a segment into several pieces;
/// the run becomes the gap of the piece that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Index of the signature segment this piece was cut from
    pub origin: usize,
    /// Gap before the piece, in processing orientation
    pub gap: Gap,
    pub steps: Vec<Step>,
    /// Bytes that must remain after the piece (trailing wildcard)
    pub trailing_min: usize,
    /// A choice was relaxed into a wildcard to stay within the choices limit
    pub approximate: bool,
}

/// A signature compiled against one `MatchingConfig`
#[derive(Debug, Clone)]
pub struct SignaturePlan {
    pub anchor: Anchor,
    /// Pieces in processing order (EOF plans are reversed)
    pub pieces: Vec<SegmentPlan>,
}

impl SignaturePlan {
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.pieces.iter().any(|p| p.approximate)
    }

    /// Place every piece, returning their `(start, end)` spans in processing order.
    ///
    /// Each piece takes the leftmost position from which all later pieces can
    /// still be placed. When a later piece fails, the earlier one is retried
    /// further along its window. `limit` caps the variable part of each gap.
    #[must_use]
    pub fn locate(&self, hay: &Haystack<'_>, limit: usize) -> Option<Vec<(usize, usize)>> {
        if self.pieces.is_empty() {
            return None;
        }
        let mut spans = Vec::with_capacity(self.pieces.len());
        let mut dead = HashSet::new();
        self.place(hay, limit, 0, 0, &mut spans, &mut dead)
            .then_some(spans)
    }

    /// `dead` holds `(piece, cursor)` states already known to fail
    fn place(
        &self,
        hay: &Haystack<'_>,
        limit: usize,
        index: usize,
        cursor: usize,
        spans: &mut Vec<(usize, usize)>,
        dead: &mut HashSet<(usize, usize)>,
    ) -> bool {
        let Some(piece) = self.pieces.get(index) else {
            return true;
        };
        if dead.contains(&(index, cursor)) {
            return false;
        }
        let Some(lo) = cursor.checked_add(piece.gap.min) else {
            return false;
        };
        // A Var signature may start anywhere in the head window
        let hi = if index == 0 && self.anchor == Anchor::Var {
            hay.data.len()
        } else {
            lo.saturating_add(piece.gap.extent(limit))
        };

        let placed = piece.search(hay, lo, hi, |start, end| {
            spans.push((start, end));
            if self.place(hay, limit, index + 1, end, spans, dead) {
                return true;
            }
            spans.pop();
            false
        });
        if !placed {
            dead.insert((index, cursor));
        }
        placed
    }
}

/// Plan a signature for matching.
///
/// EOF signatures are turned around: segments, frames and the bytes inside
/// each frame are reversed so they can be matched left to right over a
/// reversed copy of the tail window.
#[must_use]
pub fn plan_signature(signature: &Signature, config: &MatchingConfig) -> SignaturePlan {
    let reversed = signature.anchor == Anchor::Eof;
    let mut planner = Planner {
        config,
        reversed,
        pieces: Vec::new(),
        pending: Gap::ZERO,
    };

    let mut segments: Vec<(usize, &Segment)> = signature.segments.iter().enumerate().collect();
    if reversed {
        segments.reverse();
    }
    for (origin, segment) in segments {
        planner.plan_segment(origin, segment);
    }

    SignaturePlan {
        anchor: signature.anchor,
        pieces: planner.finish(),
    }
}

struct Planner<'a> {
    config: &'a MatchingConfig,
    reversed: bool,
    pieces: Vec<SegmentPlan>,
    /// Gap accumulated for the next piece
    pending: Gap,
}

impl Planner<'_> {
    fn plan_segment(&mut self, origin: usize, segment: &Segment) {
        self.pending = self.pending.join(segment.gap);

        let mut frames: Vec<&Frame> = segment.frames.iter().collect();
        if self.reversed {
            frames.reverse();
        }

        let mut steps = Vec::new();
        let mut approximate = false;
        let mut expansions: usize = 1;

        for frame in frames {
            match frame {
                Frame::Bytes(bytes) => steps.push(Step::Bytes(self.orient(bytes))),
                Frame::Choice(options) => {
                    match expansions.checked_mul(options.len()) {
                        Some(total) if total <= self.config.choices => {
                            expansions = total;
                            steps.push(Step::Choice(
                                options.iter().map(|o| self.orient(o)).collect(),
                            ));
                        }
                        _ => {
                            let shortest = options.iter().map(HexBytes::len).min().unwrap_or(0);
                            let longest = options.iter().map(HexBytes::len).max().unwrap_or(0);
                            steps.push(Step::Any {
                                min: shortest,
                                max: longest,
                            });
                            approximate = true;
                        }
                    }
                }
                Frame::Any { min, max } => match max {
                    Some(max) if *max < self.config.var_length => {
                        steps.push(Step::Any {
                            min: *min,
                            max: *max,
                        });
                    }
                    _ => {
                        self.flush(origin, &mut steps, &mut approximate);
                        self.pending = self.pending.join(Gap::new(*min, *max));
                    }
                },
            }
        }

        self.flush(origin, &mut steps, &mut approximate);
    }

    fn flush(&mut self, origin: usize, steps: &mut Vec<Step>, approximate: &mut bool) {
        if steps.is_empty() {
            return;
        }
        // Short wildcards with nothing to anchor them widen the gap instead
        if !*approximate && steps.iter().all(Step::is_wildcard) {
            for step in steps.drain(..) {
                if let Step::Any { min, max } = step {
                    self.pending = self.pending.join(Gap::new(min, Some(max)));
                }
            }
            return;
        }

        self.pieces.push(SegmentPlan {
            origin,
            gap: std::mem::replace(&mut self.pending, Gap::ZERO),
            steps: std::mem::take(steps),
            trailing_min: 0,
            approximate: std::mem::take(approximate),
        });
    }

    fn finish(mut self) -> Vec<SegmentPlan> {
        if let Some(last) = self.pieces.last_mut() {
            last.trailing_min = self.pending.min;
        }
        self.pieces
    }

    fn orient(&self, bytes: &HexBytes) -> Vec<u8> {
        if self.reversed {
            bytes.as_slice().iter().rev().copied().collect()
        } else {
            bytes.as_slice().to_vec()
        }
    }
}

/// Bytes being searched plus the total length of the source they came from
#[derive(Debug, Clone, Copy)]
pub struct Haystack<'a> {
    pub data: &'a [u8],
    pub total: u64,
}

impl<'a> Haystack<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], total: u64) -> Self {
        Self { data, total }
    }

    fn remaining_after(&self, pos: usize) -> u64 {
        self.total.saturating_sub(pos as u64)
    }
}

impl SegmentPlan {
    /// Offer every `(start, end)` match in `lo..=hi` to `accept`, leftmost
    /// start first, until it returns true.
    ///
    /// Returns whether any match was accepted.
    pub fn search<F>(&self, hay: &Haystack<'_>, lo: usize, hi: usize, mut accept: F) -> bool
    where
        F: FnMut(usize, usize) -> bool,
    {
        let data = hay.data;
        if lo > data.len() {
            return false;
        }
        let hi = hi.min(data.len());

        if let Some(Step::Bytes(lead)) = self.steps.first() {
            let end = hi.saturating_add(lead.len()).min(data.len());
            let finder = memmem::Finder::new(lead);
            let mut pos = lo;
            while pos <= end {
                let Some(offset) = finder.find(&data[pos..end]) else {
                    return false;
                };
                let start = pos + offset;
                if match_steps(hay, start, &self.steps, self.trailing_min, &mut |stop| {
                    accept(start, stop)
                }) {
                    return true;
                }
                pos = start + 1;
            }
            false
        } else {
            (lo..=hi).any(|start| {
                match_steps(hay, start, &self.steps, self.trailing_min, &mut |stop| {
                    accept(start, stop)
                })
            })
        }
    }
}

/// Walk every way `steps` can match from `pos`, handing each end to `accept`
fn match_steps(
    hay: &Haystack<'_>,
    pos: usize,
    steps: &[Step],
    trailing_min: usize,
    accept: &mut dyn FnMut(usize) -> bool,
) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return hay.remaining_after(pos) >= trailing_min as u64 && accept(pos);
    };

    match step {
        Step::Bytes(bytes) => {
            hay.data
                .get(pos..)
                .is_some_and(|tail| tail.starts_with(bytes))
                && match_steps(hay, pos + bytes.len(), rest, trailing_min, accept)
        }
        Step::Choice(options) => {
            let Some(tail) = hay.data.get(pos..) else {
                return false;
            };
            options
                .iter()
                .filter(|option| tail.starts_with(option))
                .any(|option| match_steps(hay, pos + option.len(), rest, trailing_min, accept))
        }
        Step::Any { min, max } => {
            let Some(available) = hay.data.len().checked_sub(pos) else {
                return false;
            };
            (*min..=(*max).min(available))
                .any(|skip| match_steps(hay, pos + skip, rest, trailing_min, accept))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(piece: &SegmentPlan, hay: &Haystack<'_>, lo: usize, hi: usize) -> Option<(usize, usize)> {
        let mut found = None;
        piece.search(hay, lo, hi, |start, end| {
            found = Some((start, end));
            true
        });
        found
    }

    fn match_at(piece: &SegmentPlan, hay: &Haystack<'_>, start: usize) -> Option<usize> {
        find(piece, hay, start, start).map(|(_, end)| end)
    }

    fn sig(anchor: Anchor, segments: Vec<Segment>) -> Signature {
        Signature::new("x-test", "Test", anchor).with_segments(segments)
    }

    #[test]
    fn test_wildcard_below_var_length_stays_in_segment() {
        let signature = sig(
            Anchor::Bof,
            vec![Segment::new(
                Gap::exact(0),
                vec![Frame::bytes(*b"AB"), Frame::any(2, Some(2)), Frame::bytes(*b"CD")],
            )],
        );

        let plan = plan_signature(&signature, &MatchingConfig::default().with_var_length(3));
        assert_eq!(plan.pieces.len(), 1);
        assert_eq!(plan.pieces[0].steps[1], Step::Any { min: 2, max: 2 });

        let plan = plan_signature(&signature, &MatchingConfig::default().with_var_length(2));
        assert_eq!(plan.pieces.len(), 2);
        assert_eq!(plan.pieces[1].gap, Gap::exact(2));
        assert_eq!(plan.pieces[1].origin, 0);
    }

    #[test]
    fn test_unbounded_wildcard_always_splits() {
        let signature = sig(
            Anchor::Bof,
            vec![Segment::new(
                Gap::exact(0),
                vec![Frame::bytes(*b"AB"), Frame::any(1, None), Frame::bytes(*b"CD")],
            )],
        );
        let plan = plan_signature(&signature, &MatchingConfig::default().with_var_length(1000));
        assert_eq!(plan.pieces.len(), 2);
        assert_eq!(plan.pieces[1].gap, Gap::unbounded(1));
    }

    #[test]
    fn test_leading_and_trailing_wildcards() {
        let signature = sig(
            Anchor::Bof,
            vec![Segment::new(
                Gap::exact(2),
                vec![Frame::any(3, Some(5)), Frame::bytes(*b"AB"), Frame::any(4, Some(4))],
            )],
        );
        let plan = plan_signature(&signature, &MatchingConfig::default());
        assert_eq!(plan.pieces.len(), 1);
        assert_eq!(plan.pieces[0].gap, Gap::new(5, Some(7)));
        assert_eq!(plan.pieces[0].trailing_min, 4);
    }

    #[test]
    fn test_choice_budget_relaxes_greedily() {
        let signature = sig(
            Anchor::Bof,
            vec![Segment::new(
                Gap::exact(0),
                vec![
                    Frame::choice([b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]),
                    Frame::choice([b"d".to_vec(), b"ee".to_vec()]),
                ],
            )],
        );

        let plan = plan_signature(&signature, &MatchingConfig::default().with_choices(4));
        let piece = &plan.pieces[0];
        assert!(piece.approximate);
        assert!(matches!(piece.steps[0], Step::Choice(_)));
        assert_eq!(piece.steps[1], Step::Any { min: 1, max: 2 });

        let plan = plan_signature(&signature, &MatchingConfig::default().with_choices(6));
        assert!(!plan.is_approximate());
    }

    #[test]
    fn test_eof_plan_is_reversed() {
        let signature = sig(
            Anchor::Eof,
            vec![
                Segment::fixed(0, b"AB".to_vec()),
                Segment::new(Gap::exact(3), vec![Frame::bytes(*b"XYZ")]),
            ],
        );
        let plan = plan_signature(&signature, &MatchingConfig::default());
        assert_eq!(plan.pieces[0].origin, 1);
        assert_eq!(plan.pieces[0].gap, Gap::exact(3));
        assert_eq!(plan.pieces[0].steps, vec![Step::Bytes(b"ZYX".to_vec())]);
        assert_eq!(plan.pieces[1].steps, vec![Step::Bytes(b"BA".to_vec())]);
    }

    #[test]
    fn test_find_leftmost() {
        let piece = SegmentPlan {
            origin: 0,
            gap: Gap::ZERO,
            steps: vec![Step::Bytes(b"aa".to_vec()), Step::Bytes(b"b".to_vec())],
            trailing_min: 0,
            approximate: false,
        };
        let hay = Haystack::new(b"xaaab_aab", 9);
        assert_eq!(find(&piece, &hay, 0, 9), Some((2, 5)));
        assert_eq!(find(&piece, &hay, 3, 9), Some((6, 9)));
        assert_eq!(find(&piece, &hay, 0, 1), None);
    }

    #[test]
    fn test_trailing_min_counts_bytes_beyond_window() {
        let piece = SegmentPlan {
            origin: 0,
            gap: Gap::ZERO,
            steps: vec![Step::Bytes(b"AB".to_vec())],
            trailing_min: 10,
            approximate: false,
        };
        assert_eq!(match_at(&piece, &Haystack::new(b"AB", 2), 0), None);
        assert_eq!(match_at(&piece, &Haystack::new(b"AB", 12), 0), Some(2));
    }

    #[test]
    fn test_wildcard_then_choice_backtracks() {
        let piece = SegmentPlan {
            origin: 0,
            gap: Gap::ZERO,
            steps: vec![
                Step::Choice(vec![b"a".to_vec(), b"ab".to_vec()]),
                Step::Any { min: 0, max: 2 },
                Step::Bytes(b"z".to_vec()),
            ],
            trailing_min: 0,
            approximate: false,
        };
        let hay = Haystack::new(b"abxz", 4);
        assert_eq!(match_at(&piece, &hay, 0), Some(4));
    }

    #[test]
    fn test_locate_retries_earlier_piece() {
        let signature = sig(
            Anchor::Var,
            vec![
                Segment::fixed(0, b"PK".to_vec()),
                Segment::new(Gap::exact(2), vec![Frame::bytes(*b"ZZ")]),
            ],
        );
        let plan = plan_signature(&signature, &MatchingConfig::default());
        let hay = Haystack::new(b"PKabPKcdZZ", 10);
        assert_eq!(plan.locate(&hay, 8192), Some(vec![(4, 6), (8, 10)]));
        assert_eq!(plan.locate(&Haystack::new(b"PKabPKcdZ", 9), 8192), None);
    }

    #[test]
    fn test_search_offers_every_end() {
        let piece = SegmentPlan {
            origin: 0,
            gap: Gap::ZERO,
            steps: vec![Step::Bytes(b"a".to_vec()), Step::Any { min: 0, max: 2 }],
            trailing_min: 0,
            approximate: false,
        };
        let hay = Haystack::new(b"aaa", 3);
        let mut seen = Vec::new();
        let accepted = piece.search(&hay, 0, 3, |start, end| {
            seen.push((start, end));
            false
        });
        assert!(!accepted);
        assert_eq!(
            seen,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }
}
