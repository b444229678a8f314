use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default number of bytes kept from the beginning of the input
pub const DEFAULT_HEAD_LIMIT: usize = 16 * 1024 * 1024;

/// Default number of bytes kept from the end of the input
pub const DEFAULT_TAIL_LIMIT: usize = 1024 * 1024;

const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Failed to read input after {bytes_read} bytes: {source}")]
    Read {
        bytes_read: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to seek input: {0}")]
    Seek(#[source] std::io::Error),
}

/// How much of an input the buffer retains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    /// Bytes kept from the beginning of the input
    pub head: usize,
    /// Bytes kept from the end of inputs larger than `head + tail`
    pub tail: usize,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            head: DEFAULT_HEAD_LIMIT,
            tail: DEFAULT_TAIL_LIMIT,
        }
    }
}

impl BufferLimits {
    #[must_use]
    pub fn new(head: usize, tail: usize) -> Self {
        Self { head, tail }
    }

    fn total(self) -> u64 {
        (self.head as u64).saturating_add(self.tail as u64)
    }
}

/// An immutable in-memory view of one input.
///
/// Inputs that fit within `head + tail` bytes are held completely. Larger
/// inputs keep the first `head` and the last `tail` bytes; the middle is
/// dropped and ranges falling into it are unavailable.
#[derive(Default)]
pub struct Buffer {
    head: Vec<u8>,
    tail: Vec<u8>,
    len: u64,
    truncated: bool,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("head", &self.head.len())
            .field("tail", &self.tail.len())
            .field("truncated", &self.truncated)
            .finish()
    }
}

impl Buffer {
    /// Wrap bytes already in memory
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            len: bytes.len() as u64,
            head: bytes,
            tail: Vec::new(),
            truncated: false,
        }
    }

    /// Drain a source in a single pass.
    ///
    /// End of data is not an error; `Interrupted` reads are retried and
    /// `UnexpectedEof` is treated as end of data.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Read` on any other read failure.
    pub fn from_reader<R: Read>(mut reader: R, limits: BufferLimits) -> Result<Self, BufferError> {
        let mut acc = Accumulator::new(limits);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => acc.push(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(BufferError::Read {
                        bytes_read: acc.len,
                        source: e,
                    })
                }
            }
        }
        Ok(acc.finish())
    }

    /// Async counterpart of [`Buffer::from_reader`]
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Read` on any read failure other than end of data.
    pub async fn from_async_reader<R: AsyncRead + Unpin>(
        mut reader: R,
        limits: BufferLimits,
    ) -> Result<Self, BufferError> {
        let mut acc = Accumulator::new(limits);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => acc.push(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(BufferError::Read {
                        bytes_read: acc.len,
                        source: e,
                    })
                }
            }
        }
        Ok(acc.finish())
    }

    /// Read a seekable source, skipping the middle of inputs larger than the limits
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Seek` if the length cannot be determined, or
    /// `BufferError::Read` if reading either window fails.
    pub fn from_seekable<R: Read + Seek>(
        mut reader: R,
        limits: BufferLimits,
    ) -> Result<Self, BufferError> {
        let len = reader.seek(SeekFrom::End(0)).map_err(BufferError::Seek)?;
        reader.seek(SeekFrom::Start(0)).map_err(BufferError::Seek)?;

        if len <= limits.total() {
            return Self::from_reader(reader, limits);
        }

        let head = read_window(&mut reader, 0, limits.head)?;
        let tail_start = len - limits.tail as u64;
        reader
            .seek(SeekFrom::Start(tail_start))
            .map_err(BufferError::Seek)?;
        let tail = read_window(&mut reader, tail_start, limits.tail)?;

        Ok(Self {
            head,
            tail,
            len,
            truncated: true,
        })
    }

    /// Total length of the source in bytes
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if bytes from the middle of the source were not retained
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Contiguous bytes from the beginning of the source
    #[must_use]
    pub fn bof(&self) -> &[u8] {
        &self.head
    }

    /// Contiguous bytes ending at the end of the source
    #[must_use]
    pub fn eof(&self) -> &[u8] {
        if self.truncated {
            &self.tail
        } else {
            &self.head
        }
    }

    /// `length` bytes starting `offset` bytes from the beginning, if retained
    #[must_use]
    pub fn slice(&self, offset: u64, length: usize) -> Option<&[u8]> {
        let end = offset.checked_add(length as u64)?;
        if end > self.len {
            return None;
        }
        if end <= self.head.len() as u64 {
            let start = usize::try_from(offset).ok()?;
            return self.head.get(start..start + length);
        }
        if self.truncated {
            let tail_start = self.len - self.tail.len() as u64;
            if offset >= tail_start {
                let start = usize::try_from(offset - tail_start).ok()?;
                return self.tail.get(start..start + length);
            }
        }
        None
    }

    /// `length` bytes ending `offset` bytes before the end, if retained
    #[must_use]
    pub fn eof_slice(&self, offset: u64, length: usize) -> Option<&[u8]> {
        let end = self.len.checked_sub(offset)?;
        let start = end.checked_sub(length as u64)?;
        self.slice(start, length)
    }
}

fn read_window<R: Read>(reader: &mut R, offset: u64, size: usize) -> Result<Vec<u8>, BufferError> {
    let mut window = Vec::with_capacity(size);
    reader
        .by_ref()
        .take(size as u64)
        .read_to_end(&mut window)
        .map_err(|source| BufferError::Read {
            bytes_read: offset,
            source,
        })?;
    Ok(window)
}

/// Collects a streamed source into a head window and a rolling tail window
struct Accumulator {
    limits: BufferLimits,
    head: Vec<u8>,
    tail: VecDeque<u8>,
    len: u64,
}

impl Accumulator {
    fn new(limits: BufferLimits) -> Self {
        Self {
            limits,
            head: Vec::new(),
            tail: VecDeque::new(),
            len: 0,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.len += chunk.len() as u64;

        let room = self.limits.head.saturating_sub(self.head.len()).min(chunk.len());
        let (into_head, rest) = chunk.split_at(room);
        self.head.extend_from_slice(into_head);

        if rest.is_empty() || self.limits.tail == 0 {
            return;
        }
        self.tail.extend(rest);
        let excess = self.tail.len().saturating_sub(self.limits.tail);
        self.tail.drain(..excess);
    }

    fn finish(self) -> Buffer {
        let mut head = self.head;
        let mut tail: Vec<u8> = self.tail.into();
        let retained = (head.len() + tail.len()) as u64;

        if retained == self.len {
            head.append(&mut tail);
            Buffer {
                head,
                tail: Vec::new(),
                len: self.len,
                truncated: false,
            }
        } else {
            Buffer {
                head,
                tail,
                len: self.len,
                truncated: true,
            }
        }
    }
}
