use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::types::{Anchor, FormatId, Gap};

/// A byte string that serializes as lowercase hex in human-readable formats
/// (JSON) and as raw bytes otherwise (bincode).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a hex string; whitespace between digit pairs is ignored
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the string has an odd number of
    /// digits or contains a non-hex character.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if digits.len() % 2 != 0 {
            return Err(format!("odd number of hex digits in {s:?}"));
        }
        digits
            .chunks(2)
            .map(|pair| {
                let hi = hex_value(pair[0]);
                let lo = hex_value(pair[1]);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
                    _ => Err(format!("invalid hex digit in {s:?}")),
                }
            })
            .collect::<Result<Vec<u8>, String>>()
            .map(Self)
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(self.0.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer).map(Self)
        }
    }
}

/// A single matchable unit inside a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// A fixed byte string
    Bytes(HexBytes),
    /// A run of arbitrary bytes; `max: None` is unbounded
    Any { min: usize, max: Option<usize> },
    /// One of several fixed byte strings
    Choice(Vec<HexBytes>),
}

impl Frame {
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(HexBytes(value.into()))
    }

    #[must_use]
    pub fn any(min: usize, max: Option<usize>) -> Self {
        Self::Any { min, max }
    }

    pub fn choice<I, B>(options: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::Choice(options.into_iter().map(|o| HexBytes(o.into())).collect())
    }

    /// True for wildcard frames
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any { .. })
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "{}", bytes.to_hex()),
            Self::Any { min, max: Some(max) } => write!(f, "{{{min}-{max}}}"),
            Self::Any { min, max: None } => write!(f, "{{{min}-*}}"),
            Self::Choice(options) => {
                let options: Vec<String> = options.iter().map(HexBytes::to_hex).collect();
                write!(f, "({})", options.join("|"))
            }
        }
    }
}

/// A position-bounded group of frames that must match contiguously
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Bytes allowed between the neighbouring segment (or the anchor) and this one
    #[serde(default)]
    pub gap: Gap,
    pub frames: Vec<Frame>,
}

impl Segment {
    #[must_use]
    pub fn new(gap: Gap, frames: Vec<Frame>) -> Self {
        Self { gap, frames }
    }

    /// A segment of a single fixed byte string at an exact gap
    pub fn fixed(gap: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            gap: Gap::exact(gap),
            frames: vec![Frame::bytes(bytes)],
        }
    }
}

/// A format signature: an ordered list of segments anchored at BOF, EOF or anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Unique identifier
    pub id: FormatId,

    /// Human-readable format name
    pub name: String,

    #[serde(default)]
    pub anchor: Anchor,

    /// File extensions commonly used for the format, without the leading dot
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Declared MIME type
    #[serde(default)]
    pub mime: Option<String>,

    pub segments: Vec<Segment>,
}

impl Signature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            id: FormatId::new(id),
            name: name.into(),
            anchor,
            extensions: Vec::new(),
            mime: None,
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Label used for identifications: `name (id)`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}
