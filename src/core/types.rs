use serde::{Deserialize, Serialize};

/// Unique identifier for a format in the signature set (e.g. `fmt/18`, `png`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatId(pub String);

impl FormatId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the first segment of a signature is positioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Segments are matched left to right starting at the beginning of the file
    #[default]
    Bof,
    /// Segments are matched right to left starting at the end of the file
    Eof,
    /// The first segment may occur anywhere; the rest follow it left to right
    Var,
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bof => write!(f, "BOF"),
            Self::Eof => write!(f, "EOF"),
            Self::Var => write!(f, "VAR"),
        }
    }
}

/// Allowed number of bytes between two consecutive segments.
///
/// For BOF and Var signatures the gap precedes its segment; for EOF signatures
/// it follows it (the bytes between the segment's end and the next segment, or
/// the end of the file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gap {
    pub min: usize,
    /// `None` means unbounded
    pub max: Option<usize>,
}

impl Gap {
    pub const ZERO: Gap = Gap {
        min: 0,
        max: Some(0),
    };

    #[must_use]
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn exact(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    #[must_use]
    pub fn unbounded(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Concatenate two gaps: the minimums add, and the maximum stays bounded only if both are
    #[must_use]
    pub fn join(self, other: Gap) -> Self {
        Self {
            min: self.min.saturating_add(other.min),
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            },
        }
    }

    /// Number of positions beyond `min` the gap may extend, capped at `limit`
    #[must_use]
    pub fn extent(&self, limit: usize) -> usize {
        self.max
            .map_or(limit, |max| max.saturating_sub(self.min).min(limit))
    }
}

/// Coarse confidence level derived from a numeric confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Exact
        } else if score >= 0.75 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Exact => write!(f, "EXACT"),
        }
    }
}
