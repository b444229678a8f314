//! Byte-signature matching engine.
//!
//! - [`Matcher`]: plans a signature set once and evaluates it against buffers
//! - [`MatchingConfig`]: distance, range, choices and var-length tuning
//! - [`MatchResult`]: one matched signature with its confidence and segment hits
//!
//! ## Matching Algorithm
//!
//! Every signature is planned once when the matcher is built:
//!
//! 1. **Segment splitting**: wildcard runs at or above `var_length` (or
//!    unbounded) cut a segment and become the gap of the following piece.
//!    Shorter runs are matched in place.
//! 2. **Choice budget**: alternations are admitted left to right while the
//!    product of their sizes stays within `choices`. An alternation that
//!    would exceed it is relaxed into a wildcard spanning its shortest to
//!    longest option, and the piece is marked approximate.
//! 3. **EOF reversal**: EOF signatures are reversed so they run left to right
//!    over a reversed copy of the tail window.
//!
//! At match time each piece is searched from the cursor left by the previous
//! one, over start positions `cursor + gap.min ..= cursor + gap.min + extent`,
//! where `extent` is the variable part of the gap capped by `distance` and
//! `range`. Pieces take the leftmost position from which every later piece
//! can still be placed; when a later piece fails, earlier pieces are retried
//! further along their windows. The first piece of a Var signature may start
//! anywhere in the head window.
//!
//! ## Scoring
//!
//! A fully matched signature scores 1.0 when every piece matched exactly.
//! Approximate pieces count half: `(exact + 0.5 * approximate) / total`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sigid::{Buffer, Matcher, MatchingConfig, SignatureSet};
//!
//! let set = Arc::new(SignatureSet::load_embedded().unwrap());
//! let matcher = Matcher::new(set, MatchingConfig::default());
//!
//! let buffer = Buffer::from_bytes(b"%PDF-1.7\n".to_vec());
//! for m in matcher.find_matches(&buffer) {
//!     println!("{}: {:.2}", m.label, m.confidence);
//! }
//! ```

pub mod engine;
pub mod scoring;
pub mod segment;

pub use engine::{MatchResult, Matcher, MatchingConfig};
