//! Event types for the chat stream.
//!
//! `RawEvent` is the wire-level unit produced by the parser: an event
//! name plus the concatenated data payload. `StreamEvent` is the typed
//! form delivered to channel-based consumers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event name used when a record carries no `event:` line.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// A parsed but untyped protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Event name; `"message"` when the record had no `event:` line.
    pub name: String,
    /// All `data:` line bodies, joined with `'\n'`.
    pub data: String,
}

/// Payload of a `step` event: one intermediate action of the backend
/// orchestrator (router decision, retrieval, tool call, ...).
///
/// The backend sends `{"name", "detail", "output"}` but the fields are
/// all optional here and unknown keys are kept, so any JSON object is
/// accepted from newer backends.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Any additional fields the backend includes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed events of one streaming response, as delivered over a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An intermediate orchestrator action.
    Step(StepInfo),
    /// A chunk of the answer text.
    Token(String),
    /// The stream completed; always the final event.
    Done,
    /// An application-level error report; the stream may continue.
    Error(String),
}
