//! Incremental UTF-8 decoding of transport chunks.
//!
//! The HTTP transport delivers the stream as arbitrary byte chunks, so a
//! multi-byte character can be split across two chunks. The decoder holds
//! back an incomplete trailing sequence (at most 3 bytes) and prepends it
//! to the next chunk, emitting only complete text.

use std::borrow::Cow;
use std::fmt;

/// Errors produced while decoding the byte stream into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A byte sequence that can never form valid UTF-8.
    Invalid {
        /// Byte offset of the offending sequence within the decoded input.
        offset: usize,
    },
    /// The stream ended in the middle of a multi-byte sequence.
    Truncated {
        /// Number of bytes held back when the stream ended.
        pending: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Invalid { offset } => {
                write!(f, "invalid UTF-8 sequence at byte {}", offset)
            }
            DecodeError::Truncated { pending } => {
                write!(f, "stream ended inside a UTF-8 sequence ({} bytes pending)", pending)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Stateful UTF-8 decoder for chunked byte streams.
///
/// `push` accepts chunks of any size, including empty ones, and returns
/// the longest decodable prefix; an incomplete trailing sequence is
/// retained until the continuation bytes arrive. `finish` must be called
/// at end of stream to reject a truncated tail.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete trailing sequence, carried to the next push.
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no pending state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all complete text it (plus any pending
    /// bytes from the previous chunk) contains.
    pub fn push(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        let bytes: Cow<'_, [u8]> = if self.pending.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let error = match std::str::from_utf8(&bytes) {
            Ok(text) => return Ok(text.to_owned()),
            Err(e) => e,
        };

        let valid = error.valid_up_to();
        match error.error_len() {
            // An invalid sequence cannot be repaired by more input.
            Some(_) => Err(DecodeError::Invalid { offset: valid }),
            // The tail might still be completed by the next chunk.
            None => {
                let mut joined = bytes.into_owned();
                self.pending = joined.split_off(valid);
                String::from_utf8(joined).map_err(|_| DecodeError::Invalid { offset: valid })
            }
        }
    }

    /// Flush at end of stream. Fails if bytes of an unfinished sequence
    /// are still pending.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Truncated {
                pending: self.pending.len(),
            })
        }
    }
}
