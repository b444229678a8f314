//! Core data types for byte-signature format identification.
//!
//! - [`Signature`], [`Segment`], [`Frame`]: the pre-compiled signature model
//! - [`Identification`]: one (label, confidence, basis) result
//! - [`FormatId`], [`Anchor`], [`Gap`], [`Confidence`]: supporting types
//!
//! ## Signature model
//!
//! A signature is an ordered list of segments. Each segment is a run of frames
//! that must match contiguously, preceded by a gap that bounds how far it may
//! sit from the previous segment:
//!
//! | Frame    | Matches                                   |
//! |----------|-------------------------------------------|
//! | `Bytes`  | one fixed byte string                     |
//! | `Any`    | `min..=max` arbitrary bytes (or unbounded) |
//! | `Choice` | any one of several fixed byte strings     |
//!
//! BOF signatures are matched from the start of the input, EOF signatures from
//! the end (right to left), and Var signatures may start anywhere.
//!
//! [`Signature`]: signature::Signature
//! [`Segment`]: signature::Segment
//! [`Frame`]: signature::Frame
//! [`Identification`]: identification::Identification
//! [`FormatId`]: types::FormatId
//! [`Anchor`]: types::Anchor
//! [`Gap`]: types::Gap
//! [`Confidence`]: types::Confidence

pub mod identification;
pub mod signature;
pub mod types;
