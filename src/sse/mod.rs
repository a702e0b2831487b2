//! SSE (Server-Sent Events) stream handling.
//!
//! Parses the streaming chat protocol from the LearnLab backend: UTF-8
//! records separated by a blank line, each made of `event:` / `data:`
//! lines. The native browser EventSource cannot send a POST body or
//! custom headers, which is why this pipeline exists at all.
//!
//! # Module structure
//! - `decode` - Incremental UTF-8 decoding of transport chunks
//! - `framer` - Blank-line record framing over decoded text
//! - `parser` - Record-to-event parsing
//! - `events` - Event type definitions (RawEvent, StepInfo, StreamEvent)

mod decode;
mod events;
mod framer;
mod parser;

// Re-export public types
pub use decode::{DecodeError, Utf8Decoder};
pub use events::{RawEvent, StepInfo, StreamEvent, DEFAULT_EVENT_NAME};
pub use framer::{SseFramer, SseRecord};
pub use parser::parse_record;
