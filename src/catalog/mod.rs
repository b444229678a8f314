//! Signature set storage and indexing.
//!
//! A [`SignatureSet`] holds validated format signatures together with an
//! extension index. It is produced by an external signature compiler and
//! consumed read-only by the matcher. An embedded default set is compiled
//! into the binary; other sets are loaded from JSON or compiled (bincode)
//! files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigid::SignatureSet;
//! use sigid::core::types::FormatId;
//! use std::path::Path;
//!
//! // Load embedded signature set
//! let set = SignatureSet::load_embedded().unwrap();
//!
//! for signature in set.signatures() {
//!     println!("{}", signature.label());
//! }
//!
//! let pdf = set.get(&FormatId::new("x-fmt/pdf"));
//!
//! // Compile to the binary form and load it back
//! set.save(Path::new("default.sig")).unwrap();
//! let compiled = SignatureSet::load_from_file(Path::new("default.sig")).unwrap();
//! ```
//!
//! [`SignatureSet`]: store::SignatureSet

pub mod index;
pub mod store;
