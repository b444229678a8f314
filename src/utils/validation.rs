//! Centralized validation and helper functions.

use std::path::Path;

use crate::core::signature::{Frame, Signature};

/// Maximum number of signatures accepted in one signature set (DOS protection)
pub const MAX_SIGNATURES: usize = 100_000;

/// Maximum length of a single fixed byte string or choice option
pub const MAX_PATTERN_LENGTH: usize = 64 * 1024;

/// Maximum length of a file extension, in characters
pub const MAX_EXTENSION_LENGTH: usize = 32;

/// Signature validation error types
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Signature id is empty")]
    EmptyId,
    #[error("Signature '{0}' has an empty name")]
    EmptyName(String),
    #[error("Signature '{0}' has no segments")]
    NoSegments(String),
    #[error("Signature '{id}' segment {segment} has no frames")]
    EmptySegment { id: String, segment: usize },
    #[error("Signature '{id}' segment {segment} has a gap whose maximum is below its minimum")]
    InvalidGap { id: String, segment: usize },
    #[error("Signature '{id}' segment {segment} frame {frame}: {reason}")]
    InvalidFrame {
        id: String,
        segment: usize,
        frame: usize,
        reason: String,
    },
    #[error("Signature '{0}' contains only wildcards")]
    OnlyWildcards(String),
    #[error("Signature '{id}' has an invalid extension '{extension}'")]
    InvalidExtension { id: String, extension: String },
}

/// Normalize a file extension: lowercase, without a leading dot.
///
/// # Examples
///
/// ```
/// use sigid::utils::validation::normalize_extension;
///
/// assert_eq!(normalize_extension(".PDF"), Some("pdf".to_string()));
/// assert_eq!(normalize_extension("tar.gz"), Some("tar.gz".to_string()));
/// assert_eq!(normalize_extension("."), None);
/// ```
#[must_use]
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty()
        || trimmed.len() > MAX_EXTENSION_LENGTH
        || trimmed.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\')
    {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Extract the normalized extension of a file name or path.
///
/// Returns None for names without an extension and for dot-files such as `.bashrc`.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    normalize_extension(ext)
}

/// Check a signature before it is admitted to a signature set.
///
/// # Errors
///
/// Returns the first structural problem found: empty id or name, no segments,
/// empty segments, inverted gaps, empty or oversized byte strings, inverted
/// wildcard bounds, wildcard-only signatures, or malformed extensions.
pub fn validate_signature(signature: &Signature) -> Result<(), ValidationError> {
    let id = signature.id.as_str();
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if signature.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(id.to_string()));
    }
    if signature.segments.is_empty() {
        return Err(ValidationError::NoSegments(id.to_string()));
    }

    for extension in &signature.extensions {
        if normalize_extension(extension).is_none() {
            return Err(ValidationError::InvalidExtension {
                id: id.to_string(),
                extension: extension.clone(),
            });
        }
    }

    let mut has_fixed = false;
    for (s, segment) in signature.segments.iter().enumerate() {
        if segment.frames.is_empty() {
            return Err(ValidationError::EmptySegment {
                id: id.to_string(),
                segment: s,
            });
        }
        if segment.gap.max.is_some_and(|max| max < segment.gap.min) {
            return Err(ValidationError::InvalidGap {
                id: id.to_string(),
                segment: s,
            });
        }
        for (f, frame) in segment.frames.iter().enumerate() {
            if let Some(reason) = frame_problem(frame) {
                return Err(ValidationError::InvalidFrame {
                    id: id.to_string(),
                    segment: s,
                    frame: f,
                    reason,
                });
            }
            has_fixed |= !frame.is_wildcard();
        }
    }

    if !has_fixed {
        return Err(ValidationError::OnlyWildcards(id.to_string()));
    }
    Ok(())
}

fn frame_problem(frame: &Frame) -> Option<String> {
    match frame {
        Frame::Bytes(bytes) => {
            if bytes.is_empty() {
                Some("empty byte string".to_string())
            } else if bytes.len() > MAX_PATTERN_LENGTH {
                Some(format!("byte string longer than {MAX_PATTERN_LENGTH} bytes"))
            } else {
                None
            }
        }
        Frame::Any { min, max } => max
            .is_some_and(|max| max < *min)
            .then(|| format!("wildcard maximum {max:?} below minimum {min}")),
        Frame::Choice(options) => {
            if options.is_empty() {
                Some("choice without options".to_string())
            } else if options.iter().any(|o| o.is_empty()) {
                Some("choice with an empty option".to_string())
            } else if options.iter().any(|o| o.len() > MAX_PATTERN_LENGTH) {
                Some(format!("choice option longer than {MAX_PATTERN_LENGTH} bytes"))
            } else {
                None
            }
        }
    }
}
