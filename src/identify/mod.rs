//! Identifiers and the concurrent identification orchestrator.
//!
//! An [`Identifier`] turns one populated [`Buffer`] (and an optional filename)
//! into identifications. Two are provided:
//!
//! - [`ByteIdentifier`]: byte-signature matching, corroborated by extension
//! - [`ExtensionIdentifier`]: filename extension alone
//!
//! The [`Orchestrator`] runs every registered identifier concurrently over a
//! shared buffer and streams their results back through a bounded channel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sigid::identify::{ByteIdentifier, ExtensionIdentifier, Orchestrator, OrchestratorConfig};
//! use sigid::{Matcher, MatchingConfig, SignatureSet};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let set = Arc::new(SignatureSet::load_embedded()?);
//! let orchestrator = Orchestrator::new(OrchestratorConfig::default())
//!     .with_identifier(ByteIdentifier::new(Matcher::new(Arc::clone(&set), MatchingConfig::default())))
//!     .with_identifier(ExtensionIdentifier::new(set));
//!
//! let file = tokio::fs::File::open("report.pdf").await?;
//! let mut stream = orchestrator.identify(file, Some("report.pdf")).await?;
//! while let Some(id) = stream.next().await {
//!     println!("{}: {} ({:.2})", id.identifier(), id, id.confidence());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Buffer`]: crate::buffer::Buffer

pub mod bytes;
pub mod extension;
pub mod orchestrator;

pub use bytes::ByteIdentifier;
pub use extension::ExtensionIdentifier;
pub use orchestrator::{
    IdentificationStream, IdentifyError, Orchestrator, OrchestratorConfig, RunReport,
};

use crate::buffer::Buffer;
use crate::core::identification::Identification;

/// A source of format identifications.
///
/// Implementations run on a blocking worker thread and may be shared across
/// concurrent calls, so they must not keep per-call state.
pub trait Identifier: Send + Sync {
    /// Name recorded on every identification this identifier produces
    fn name(&self) -> &str;

    /// Identify `buffer`, in descending confidence order.
    ///
    /// An empty result is allowed; the orchestrator replaces it with an
    /// unknown identification.
    fn identify(&self, buffer: &Buffer, filename: Option<&str>) -> Vec<Identification>;
}
