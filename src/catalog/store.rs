use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::index::ExtensionIndex;
use crate::core::signature::Signature;
use crate::core::types::FormatId;
use crate::utils::validation::{validate_signature, ValidationError, MAX_SIGNATURES};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read signature set: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse signature set: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to decode compiled signature set: {0}")]
    DecodeError(#[from] bincode::Error),

    #[error("Invalid signature: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Duplicate signature id: {0}")]
    DuplicateId(FormatId),

    #[error("Too many signatures: maximum is {MAX_SIGNATURES}")]
    TooManySignatures,
}

/// Signature set version for compatibility checking
pub const SIGNATURE_SET_VERSION: &str = "1.0.0";

/// On-disk storage encoding of a signature set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    /// Human-editable JSON with hex byte strings
    Json,
    /// Compiled bincode
    Binary,
}

impl StorageFormat {
    /// `.json` files are JSON; everything else is treated as compiled
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Serializable signature set format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSetData {
    pub version: String,
    pub created_at: String,
    pub signatures: Vec<Signature>,
}

/// An immutable, validated collection of signatures.
///
/// Built once, then shared by `Arc` across matchers and identification calls.
#[derive(Debug)]
pub struct SignatureSet {
    signatures: Vec<Signature>,

    /// Index: format id -> index in signatures vec
    id_to_index: HashMap<FormatId, usize>,

    /// Index: extension -> indices of signatures declaring it
    extensions: ExtensionIndex,
}

impl SignatureSet {
    /// Create an empty signature set
    #[must_use]
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
            id_to_index: HashMap::new(),
            extensions: ExtensionIndex::new(),
        }
    }

    /// Build a set from signatures, validating each one
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` or `CatalogError::DuplicateId` for the
    /// first signature that cannot be admitted.
    pub fn from_signatures(
        signatures: impl IntoIterator<Item = Signature>,
    ) -> Result<Self, CatalogError> {
        let mut set = Self::new();
        for signature in signatures {
            set.add_signature(signature)?;
        }
        Ok(set)
    }

    /// Load the embedded default signature set
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON fails to parse or validate.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time by build.rs
        const EMBEDDED_SIGNATURES: &str = include_str!("../../signatures/default.json");
        Self::from_json(EMBEDDED_SIGNATURES)
    }

    /// Load a signature set file; JSON content is detected by extension or leading `{`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded or validated.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read(path)?;
        let looks_like_json = content
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{');

        let set = if StorageFormat::from_path(path) == StorageFormat::Json || looks_like_json {
            Self::from_json(&String::from_utf8_lossy(&content))?
        } else {
            Self::from_bincode(&content)?
        };
        debug!(
            "Loaded {} signatures from {}",
            set.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse a signature set from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a signature is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: SignatureSetData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Decode a compiled (bincode) signature set
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or a signature is invalid.
    pub fn from_bincode(bytes: &[u8]) -> Result<Self, CatalogError> {
        let data: SignatureSetData = bincode::deserialize(bytes)?;
        Self::from_data(data)
    }

    fn from_data(data: SignatureSetData) -> Result<Self, CatalogError> {
        // Version check (warn but don't fail)
        if data.version != SIGNATURE_SET_VERSION {
            warn!(
                "Signature set version mismatch (expected {}, found {})",
                SIGNATURE_SET_VERSION, data.version
            );
        }
        Self::from_signatures(data.signatures)
    }

    /// Add a signature to the set
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is malformed, its id is already
    /// present, or the set is full.
    pub fn add_signature(&mut self, signature: Signature) -> Result<(), CatalogError> {
        if self.signatures.len() >= MAX_SIGNATURES {
            return Err(CatalogError::TooManySignatures);
        }
        validate_signature(&signature)?;
        if self.id_to_index.contains_key(&signature.id) {
            return Err(CatalogError::DuplicateId(signature.id));
        }

        let index = self.signatures.len();
        self.id_to_index.insert(signature.id.clone(), index);
        self.extensions.insert(index, &signature);
        self.signatures.push(signature);
        Ok(())
    }

    /// Get a signature by id
    #[must_use]
    pub fn get(&self, id: &FormatId) -> Option<&Signature> {
        self.id_to_index.get(id).map(|&idx| &self.signatures[idx])
    }

    /// Signature at a position (as reported by the matcher)
    #[must_use]
    pub fn signature(&self, index: usize) -> Option<&Signature> {
        self.signatures.get(index)
    }

    /// All signatures, in insertion order
    #[must_use]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionIndex {
        &self.extensions
    }

    fn to_data(&self) -> SignatureSetData {
        SignatureSetData {
            version: SIGNATURE_SET_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            signatures: self.signatures.clone(),
        }
    }

    /// Export signature set to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.to_data())?)
    }

    /// Export signature set to the compiled bincode form
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bincode(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(bincode::serialize(&self.to_data())?)
    }

    /// Write the set to `path`, choosing the encoding from its extension
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        match StorageFormat::from_path(path) {
            StorageFormat::Json => std::fs::write(path, self.to_json()?)?,
            StorageFormat::Binary => std::fs::write(path, self.to_bincode()?)?,
        }
        Ok(())
    }

    /// Number of signatures in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Check if the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::Segment;
    use crate::core::types::Anchor;

    fn sig(id: &str, bytes: &[u8]) -> Signature {
        Signature::new(id, format!("Format {id}"), Anchor::Bof)
            .with_extensions(["tst"])
            .with_segments(vec![Segment::fixed(0, bytes.to_vec())])
    }

    #[test]
    fn test_load_embedded_signatures() {
        let set = SignatureSet::load_embedded().unwrap();
        assert!(!set.is_empty());
        let pdf = set.get(&FormatId::new("x-fmt/pdf")).unwrap();
        assert_eq!(pdf.name, "Portable Document Format");
        assert!(!set.extensions().candidates("pdf").is_empty());
    }

    #[test]
    fn test_add_signature() {
        let mut set = SignatureSet::new();
        set.add_signature(sig("a", b"AA")).unwrap();
        set.add_signature(sig("b", b"BB")).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.signature(1).unwrap().id, FormatId::new("b"));
        assert_eq!(set.extensions().candidates("tst"), &[0, 1]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut set = SignatureSet::new();
        set.add_signature(sig("a", b"AA")).unwrap();
        assert!(matches!(
            set.add_signature(sig("a", b"CC")),
            Err(CatalogError::DuplicateId(_))
        ));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let mut set = SignatureSet::new();
        let broken = Signature::new("broken", "Broken", Anchor::Bof);
        assert!(matches!(
            set.add_signature(broken),
            Err(CatalogError::Invalid(ValidationError::NoSegments(_)))
        ));
    }

    #[test]
    fn test_json_and_bincode_exports_reload() {
        let set = SignatureSet::from_signatures([sig("a", b"AA"), sig("b", b"\x00\xff")]).unwrap();

        let json = set.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("00ff"));
        let from_json = SignatureSet::from_json(&json).unwrap();
        assert_eq!(from_json.signatures(), set.signatures());

        let compiled = set.to_bincode().unwrap();
        let from_bin = SignatureSet::from_bincode(&compiled).unwrap();
        assert_eq!(from_bin.signatures(), set.signatures());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let set = SignatureSet::from_signatures([sig("a", b"AA")]).unwrap();

        let json_path = dir.path().join("set.json");
        set.save(&json_path).unwrap();
        assert_eq!(SignatureSet::load_from_file(&json_path).unwrap().len(), 1);

        let bin_path = dir.path().join("set.sig");
        set.save(&bin_path).unwrap();
        assert_eq!(SignatureSet::load_from_file(&bin_path).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SignatureSet::from_json("{ not json"),
            Err(CatalogError::ParseError(_))
        ));
    }
}
