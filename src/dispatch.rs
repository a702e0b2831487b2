//! Event dispatch: wire events to typed caller callbacks.
//!
//! The dispatcher recognizes four event names (`step`, `token`, `done`,
//! `error`) and decides per name whether the payload is JSON or literal
//! text. Everything else is ignored for forward compatibility.

use tokio::sync::mpsc;

use crate::sse::{RawEvent, StepInfo, StreamEvent};

/// Callbacks for one streaming response.
///
/// All methods default to no-ops so consumers implement only the slots
/// they care about. Implementations must be `Send`: the session invokes
/// the handler from its driver task.
///
/// For channel-based hosts there is a blanket implementation for
/// `tokio::sync::mpsc::UnboundedSender<StreamEvent>` that forwards every
/// callback as a message.
pub trait StreamHandler: Send {
    /// An intermediate orchestrator action was reported.
    fn on_step(&mut self, _step: StepInfo) {}

    /// A chunk of answer text arrived.
    fn on_token(&mut self, _text: String) {}

    /// The stream reached a terminal state. Fires exactly once per
    /// session, on every path except cancellation.
    fn on_done(&mut self) {}

    /// The backend reported an application-level error. Not terminal;
    /// the stream may continue.
    fn on_error(&mut self, _message: String) {}
}

impl StreamHandler for mpsc::UnboundedSender<StreamEvent> {
    fn on_step(&mut self, step: StepInfo) {
        let _ = self.send(StreamEvent::Step(step));
    }

    fn on_token(&mut self, text: String) {
        let _ = self.send(StreamEvent::Token(text));
    }

    fn on_done(&mut self) {
        let _ = self.send(StreamEvent::Done);
    }

    fn on_error(&mut self, message: String) {
        let _ = self.send(StreamEvent::Error(message));
    }
}

/// What the session should do after an event was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep reading the stream.
    Continue,
    /// A `done` event was received; the session is complete.
    Complete,
}

/// Route one parsed event to the handler.
///
/// Payload contracts per event name:
/// - `step`: a JSON object; a malformed payload is dropped (transient
///   progress info is not worth failing the stream over)
/// - `token`: a JSON-encoded string so embedded newlines and quotes
///   survive transport; anything that does not parse as one is delivered
///   verbatim, since visible output beats protocol strictness
/// - `done`: payload ignored; reported to the session, not the handler
/// - `error`: raw text to `on_error`
/// - anything else: ignored
pub fn dispatch<H>(event: RawEvent, handler: &mut H) -> Disposition
where
    H: StreamHandler + ?Sized,
{
    let RawEvent { name, data } = event;
    match name.as_str() {
        "step" => {
            match serde_json::from_str::<StepInfo>(&data) {
                Ok(step) => handler.on_step(step),
                Err(e) => tracing::debug!("dropping malformed step payload: {}", e),
            }
            Disposition::Continue
        }
        "token" => {
            let text = serde_json::from_str::<String>(&data).unwrap_or(data);
            handler.on_token(text);
            Disposition::Continue
        }
        "done" => Disposition::Complete,
        "error" => {
            handler.on_error(data);
            Disposition::Continue
        }
        other => {
            tracing::trace!("ignoring unrecognized event type: {}", other);
            Disposition::Continue
        }
    }
}
