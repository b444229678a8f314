use std::collections::HashMap;

use crate::core::signature::Signature;
use crate::utils::validation::{extension_of, normalize_extension};

/// Index: normalized extension -> indices of signatures declaring it
#[derive(Debug, Default, Clone)]
pub struct ExtensionIndex {
    by_extension: HashMap<String, Vec<usize>>,
}

impl ExtensionIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the extensions of the signature stored at `index`
    pub fn insert(&mut self, index: usize, signature: &Signature) {
        for ext in signature.extensions.iter().filter_map(|e| normalize_extension(e)) {
            let entry = self.by_extension.entry(ext).or_default();
            if !entry.contains(&index) {
                entry.push(index);
            }
        }
    }

    /// Signature indices declaring `extension`, in insertion order
    #[must_use]
    pub fn candidates(&self, extension: &str) -> &[usize] {
        normalize_extension(extension)
            .and_then(|ext| self.by_extension.get(&ext))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Signature indices declaring the extension of `filename`
    #[must_use]
    pub fn candidates_for_filename(&self, filename: &str) -> &[usize] {
        extension_of(filename)
            .and_then(|ext| self.by_extension.get(&ext))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct extensions
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Anchor;

    #[test]
    fn test_candidates() {
        let mut index = ExtensionIndex::new();
        index.insert(0, &Signature::new("a", "A", Anchor::Bof).with_extensions(["JPG", "jpeg"]));
        index.insert(1, &Signature::new("b", "B", Anchor::Bof).with_extensions([".jpg"]));

        assert_eq!(index.candidates("jpg"), &[0, 1]);
        assert_eq!(index.candidates(".JPEG"), &[0]);
        assert!(index.candidates("png").is_empty());
        assert_eq!(index.candidates_for_filename("photo.JPG"), &[0, 1]);
        assert!(index.candidates_for_filename("photo").is_empty());
        assert_eq!(index.len(), 2);
    }
}
