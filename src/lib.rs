//! # sigid
//!
//! A library for identifying file formats from byte signatures.
//!
//! A file's name and declared MIME type are easy to get wrong. `sigid` looks at
//! the bytes instead: it matches the input against a set of format signatures
//! (segmented byte patterns anchored at the start, the end, or anywhere in
//! the file) and reports every format that matches, with a confidence and the
//! evidence behind it.
//!
//! ## Features
//!
//! - **Segmented signatures**: fixed strings, bounded wildcards and alternations
//! - **Bounded search**: distance, range, choices and var-length limits
//! - **Bidirectional buffer**: head and tail windows over unseekable inputs
//! - **Concurrent identifiers**: byte and extension evidence streamed back
//!   through a bounded channel
//! - **Compiled signature sets**: JSON for editing, bincode for loading
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sigid::{Buffer, Matcher, MatchingConfig, SignatureSet};
//!
//! // Load the embedded signature set
//! let set = Arc::new(SignatureSet::load_embedded().unwrap());
//!
//! // Match an in-memory input
//! let matcher = Matcher::new(set, MatchingConfig::default());
//! let buffer = Buffer::from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n".to_vec());
//!
//! for m in matcher.find_matches(&buffer) {
//!     println!("{}: {:.0}%", m.label, m.confidence * 100.0);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`buffer`]: Buffered, bidirectional input view
//! - [`catalog`]: Signature set storage and indexing
//! - [`core`]: Core data types for signatures and identifications
//! - [`matching`]: Matching engine and scoring
//! - [`identify`]: Identifiers and the concurrent orchestrator
//! - [`cli`]: Command-line interface implementation

pub mod buffer;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod identify;
pub mod matching;
pub mod utils;

// Re-export commonly used types for convenience
pub use buffer::{Buffer, BufferError, BufferLimits};
pub use catalog::store::{CatalogError, SignatureSet};
pub use crate::core::identification::Identification;
pub use crate::core::signature::{Frame, Segment, Signature};
pub use crate::core::types::*;
pub use identify::{
    ByteIdentifier, ExtensionIdentifier, IdentificationStream, IdentifyError, Identifier,
    Orchestrator, OrchestratorConfig, RunReport,
};
pub use matching::engine::{MatchResult, Matcher, MatchingConfig};
