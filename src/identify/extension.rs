use std::sync::Arc;

use crate::buffer::Buffer;
use crate::catalog::store::SignatureSet;
use crate::core::identification::Identification;
use crate::identify::Identifier;
use crate::utils::validation::extension_of;

/// Default identifier name
pub const EXTENSION_IDENTIFIER_NAME: &str = "extension";

/// Confidence of an extension shared by no other signature
pub const EXTENSION_CONFIDENCE: f64 = 0.5;

/// Identifies by filename extension alone, using the set's extension index
#[derive(Debug)]
pub struct ExtensionIdentifier {
    name: String,
    set: Arc<SignatureSet>,
}

impl ExtensionIdentifier {
    #[must_use]
    pub fn new(set: Arc<SignatureSet>) -> Self {
        Self {
            name: EXTENSION_IDENTIFIER_NAME.to_string(),
            set,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Identifier for ExtensionIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, _buffer: &Buffer, filename: Option<&str>) -> Vec<Identification> {
        let Some(filename) = filename else {
            return vec![Identification::unknown(self.name.clone(), "no filename given")];
        };
        let Some(ext) = extension_of(filename) else {
            return vec![Identification::unknown(
                self.name.clone(),
                "filename has no extension",
            )];
        };

        let candidates = self.set.extensions().candidates_for_filename(filename);
        if candidates.is_empty() {
            return vec![Identification::unknown(
                self.name.clone(),
                format!("no signature declares extension .{ext}"),
            )];
        }

        #[allow(clippy::cast_precision_loss)]
        let confidence = EXTENSION_CONFIDENCE / candidates.len() as f64;
        let reason = if candidates.len() == 1 {
            format!("extension .{ext} declared by this format only")
        } else {
            format!("extension .{ext} shared by {} formats", candidates.len())
        };

        candidates
            .iter()
            .filter_map(|&idx| self.set.signature(idx))
            .map(|signature| {
                Identification::new(
                    self.name.clone(),
                    Some(signature.id.clone()),
                    signature.label(),
                    confidence,
                    vec![reason.clone()],
                )
            })
            .collect()
    }
}
