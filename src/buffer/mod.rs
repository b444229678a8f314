//! Buffered, bidirectional view over one input.
//!
//! A [`Buffer`] is filled once per identification call, then shared read-only
//! by every identifier. Unseekable sources are drained in a single pass;
//! seekable sources only have their head and tail windows read.
//!
//! ```rust
//! use sigid::buffer::{Buffer, BufferLimits};
//!
//! let buffer = Buffer::from_reader(&b"%PDF-1.7 ... %%EOF"[..], BufferLimits::default()).unwrap();
//! assert_eq!(buffer.slice(0, 4), Some(&b"%PDF"[..]));
//! assert_eq!(buffer.eof_slice(0, 5), Some(&b"%%EOF"[..]));
//! ```

pub mod window;

pub use window::{Buffer, BufferError, BufferLimits, DEFAULT_HEAD_LIMIT, DEFAULT_TAIL_LIMIT};
