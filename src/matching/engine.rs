use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::catalog::store::SignatureSet;
use crate::core::signature::Signature;
use crate::core::types::{Anchor, FormatId};
use crate::matching::scoring::{confidence, SegmentHit};
use crate::matching::segment::{plan_signature, Haystack, SignaturePlan};

/// Default maximum variable gap extent, in bytes
pub const DEFAULT_DISTANCE: usize = 8192;

/// Default width of the positions a segment is tried over
pub const DEFAULT_RANGE: usize = 2049;

/// Default maximum number of plain sequences a segment may expand into
pub const DEFAULT_CHOICES: usize = 64;

/// Default minimum wildcard length that splits a segment
pub const DEFAULT_VAR_LENGTH: usize = 1;

/// Tuning parameters for the matcher.
///
/// Values are fixed for the lifetime of a [`Matcher`]; build a new matcher to
/// change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum variable gap extent before a segment search is abandoned
    pub distance: usize,
    /// Width of the positions over which a segment is tried
    pub range: usize,
    /// Maximum alternation expansion per segment
    pub choices: usize,
    /// Minimum wildcard run length treated as a segment boundary
    pub var_length: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            range: DEFAULT_RANGE,
            choices: DEFAULT_CHOICES,
            var_length: DEFAULT_VAR_LENGTH,
        }
    }
}

impl MatchingConfig {
    #[must_use]
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: usize) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: usize) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn with_var_length(mut self, var_length: usize) -> Self {
        self.var_length = var_length;
        self
    }

    /// Cap applied to the variable part of every gap
    #[must_use]
    pub fn window_limit(&self) -> usize {
        self.distance.min(self.range)
    }
}

/// Result of matching one signature against a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Position of the signature in the set
    pub index: usize,

    pub format_id: FormatId,

    /// Display label of the matched signature
    pub label: String,

    /// Confidence in `[0.0, 1.0]`
    pub confidence: f64,

    /// Segment hits in file order
    pub hits: Vec<SegmentHit>,
}

impl MatchResult {
    fn new(index: usize, signature: &Signature, hits: Vec<SegmentHit>) -> Self {
        Self {
            index,
            format_id: signature.id.clone(),
            label: signature.label(),
            confidence: confidence(&hits),
            hits,
        }
    }

    /// True when every segment matched exactly
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.hits.iter().all(|h| h.exact)
    }

    /// One evidence line per segment hit
    #[must_use]
    pub fn basis(&self) -> Vec<String> {
        self.hits.iter().map(SegmentHit::describe).collect()
    }
}

/// Byte-signature matcher over a shared signature set
#[derive(Debug)]
pub struct Matcher {
    set: Arc<SignatureSet>,
    config: MatchingConfig,
    plans: Vec<SignaturePlan>,
}

impl Matcher {
    /// Plan every signature of `set` under `config`
    #[must_use]
    pub fn new(set: Arc<SignatureSet>, config: MatchingConfig) -> Self {
        let plans: Vec<SignaturePlan> = set
            .signatures()
            .iter()
            .map(|signature| plan_signature(signature, &config))
            .collect();

        let approximate = plans.iter().filter(|p| p.is_approximate()).count();
        if approximate > 0 {
            debug!(
                "{approximate} signatures exceed the choices limit of {} and match approximately",
                config.choices
            );
        }
        debug!(
            "Planned {} signatures into {} segments",
            plans.len(),
            plans.iter().map(|p| p.pieces.len()).sum::<usize>()
        );

        Self { set, config, plans }
    }

    #[must_use]
    pub fn set(&self) -> &Arc<SignatureSet> {
        &self.set
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Find every signature matching `buffer`.
    ///
    /// Results are sorted by descending confidence; ties keep signature order.
    /// An empty result means nothing matched.
    #[must_use]
    pub fn find_matches(&self, buffer: &Buffer) -> Vec<MatchResult> {
        let forward = Haystack::new(buffer.bof(), buffer.len());
        // Built on first use by an EOF signature
        let reversed: OnceCell<Vec<u8>> = OnceCell::new();

        let mut results: Vec<MatchResult> = self
            .set
            .signatures()
            .iter()
            .zip(&self.plans)
            .enumerate()
            .filter_map(|(index, (signature, plan))| {
                let hits = if plan.anchor == Anchor::Eof {
                    let tail = reversed.get_or_init(|| buffer.eof().iter().rev().copied().collect());
                    self.run(plan, &Haystack::new(tail, buffer.len()))
                } else {
                    self.run(plan, &forward)
                }?;
                trace!("Matched {} with {} segments", signature.id, hits.len());
                Some(MatchResult::new(index, signature, hits))
            })
            .collect();

        // Sort by confidence descending, then by signature order
        results.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        results
    }

    fn run(&self, plan: &SignaturePlan, hay: &Haystack<'_>) -> Option<Vec<SegmentHit>> {
        let spans = plan.locate(hay, self.config.window_limit())?;
        let mut hits: Vec<SegmentHit> = plan
            .pieces
            .iter()
            .zip(spans)
            .map(|(piece, (start, end))| SegmentHit::new(piece, plan.anchor, hay.total, start, end))
            .collect();

        if plan.anchor == Anchor::Eof {
            hits.reverse();
        }
        Some(hits)
    }
}
