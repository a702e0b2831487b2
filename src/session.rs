//! Streaming session lifecycle.
//!
//! A `StreamSession` owns one in-flight streaming request: it opens the
//! transport, drives bytes through decode -> frame -> parse -> dispatch,
//! and guarantees the completion callback fires exactly once no matter
//! how the stream ends. Cancellation is silent: the caller already knows
//! it cancelled.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::dispatch::{dispatch, Disposition, StreamHandler};
use crate::sse::{parse_record, DecodeError, SseFramer, Utf8Decoder};
use crate::traits::{HttpClient, HttpError, RequestDescriptor};

/// Lifecycle state of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created; the transport has not produced response headers yet.
    Idle,
    /// The response is open and chunks are being processed.
    Open,
    /// A terminal event was received; teardown is in progress.
    Closing,
    /// Torn down. Terminal; sessions are never reused.
    Closed,
}

/// Shared between the session handle and its driver task.
struct SessionCore {
    id: Uuid,
    state: Mutex<SessionState>,
    abort: Mutex<Option<AbortHandle>>,
}

impl SessionCore {
    /// Move from `from` to `to` if the session is still in `from`.
    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }

    /// Claim the terminal transition. Returns false when the session is
    /// already closed (completed elsewhere, or cancelled - in which case
    /// the caller must stay silent).
    fn close(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == SessionState::Closed {
            false
        } else {
            *state = SessionState::Closed;
            true
        }
    }
}

/// Handle to one in-flight streaming request.
///
/// Created by [`StreamSession::spawn`]; the driver task runs detached,
/// so dropping the handle does not stop the stream - call
/// [`cancel`](StreamSession::cancel) for that.
pub struct StreamSession {
    core: Arc<SessionCore>,
}

impl StreamSession {
    /// Open the request on a background task and return immediately.
    ///
    /// The handler receives events as they are framed; the completion
    /// callback fires exactly once on every terminal path (a `done`
    /// event, end of stream, open failure, transport failure, decode
    /// failure) and never after `cancel`.
    pub fn spawn<H>(
        transport: Arc<dyn HttpClient>,
        request: RequestDescriptor,
        handler: H,
    ) -> Self
    where
        H: StreamHandler + 'static,
    {
        let core = Arc::new(SessionCore {
            id: Uuid::new_v4(),
            state: Mutex::new(SessionState::Idle),
            abort: Mutex::new(None),
        });

        let task = tokio::spawn(run(transport, request, handler, Arc::clone(&core)));
        *core.abort.lock().unwrap() = Some(task.abort_handle());

        Self { core }
    }

    /// Unique id of this session.
    pub fn id(&self) -> Uuid {
        self.core.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.core.state.lock().unwrap()
    }

    /// Whether the session has reached its terminal state.
    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Abort the transport and stop processing.
    ///
    /// No callback fires after this returns, including the completion
    /// callback. Calling `cancel` on an already-closed session is a
    /// no-op.
    pub fn cancel(&self) {
        {
            let mut state = self.core.state.lock().unwrap();
            if *state == SessionState::Closed {
                return;
            }
            *state = SessionState::Closed;
        }
        if let Some(abort) = self.core.abort.lock().unwrap().take() {
            abort.abort();
        }
        tracing::debug!("session {} cancelled", self.core.id);
    }
}

/// How the read loop ended.
enum ReadOutcome {
    /// The transport signaled end of stream.
    Eof,
    /// A `done` event was dispatched.
    Completed,
    /// The transport failed mid-stream.
    TransportFailed(HttpError),
    /// The byte stream was not valid UTF-8.
    DecodeFailed(DecodeError),
}

/// Drive one session from open to teardown.
async fn run<H>(
    transport: Arc<dyn HttpClient>,
    request: RequestDescriptor,
    mut handler: H,
    core: Arc<SessionCore>,
) where
    H: StreamHandler,
{
    let mut stream = match transport.open_stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            // Open failures collapse into the completion callback: the
            // caller cannot tell "connection refused" from "empty
            // result" and must treat both as a no-op completion.
            tracing::warn!("session {}: open failed: {}", core.id, e);
            if core.close() {
                handler.on_done();
            }
            return;
        }
    };

    if !core.transition(SessionState::Idle, SessionState::Open) {
        // Cancelled while the request was in flight.
        return;
    }
    tracing::debug!("session {} open: {}", core.id, request.url);

    let mut decoder = Utf8Decoder::new();
    let mut framer = SseFramer::new();
    let mut outcome = ReadOutcome::Eof;

    'read: while let Some(item) = stream.next().await {
        let bytes = match item {
            Ok(bytes) => bytes,
            Err(e) => {
                outcome = ReadOutcome::TransportFailed(e);
                break 'read;
            }
        };
        let text = match decoder.push(&bytes) {
            Ok(text) => text,
            Err(e) => {
                outcome = ReadOutcome::DecodeFailed(e);
                break 'read;
            }
        };
        for record in framer.feed(&text) {
            let event = parse_record(&record);
            if dispatch(event, &mut handler) == Disposition::Complete {
                core.transition(SessionState::Open, SessionState::Closing);
                outcome = ReadOutcome::Completed;
                break 'read;
            }
        }
    }

    match &outcome {
        ReadOutcome::Eof => {
            // EOF without a done event is a valid terminal signal.
            if let Err(e) = decoder.finish() {
                tracing::warn!("session {}: {}", core.id, e);
            }
            if !framer.pending().is_empty() {
                tracing::debug!(
                    "session {}: discarding incomplete trailing record ({} bytes)",
                    core.id,
                    framer.pending().len()
                );
            }
        }
        ReadOutcome::Completed => {}
        ReadOutcome::TransportFailed(e) => {
            // Partial output already delivered to the caller stands, so
            // this resolves as completion rather than a distinct error.
            tracing::warn!("session {}: transport failed mid-stream: {}", core.id, e);
        }
        ReadOutcome::DecodeFailed(e) => {
            tracing::warn!("session {}: {}", core.id, e);
        }
    }

    drop(stream);
    if core.close() {
        handler.on_done();
    }
    tracing::debug!("session {} closed", core.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::sse::StreamEvent;
    use bytes::Bytes;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const STREAM_URL: &str = "http://test/chat/ask_stream";

    fn chunks(parts: &[&str]) -> MockResponse {
        MockResponse::Stream(
            parts
                .iter()
                .map(|p| Ok(Bytes::from(p.to_string().into_bytes())))
                .collect(),
        )
    }

    fn spawn_session(
        transport: MockHttpClient,
    ) -> (StreamSession, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let request = RequestDescriptor::post(STREAM_URL, "{}");
        let session = StreamSession::spawn(Arc::new(transport), request, tx);
        (session, rx)
    }

    async fn collect_until_done(
        rx: &mut mpsc::UnboundedReceiver<StreamEvent>,
    ) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for stream events")
                .expect("stream ended without a Done event");
            let is_done = event == StreamEvent::Done;
            events.push(event);
            if is_done {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn test_full_stream_in_one_chunk() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            chunks(&["event: step\ndata: {\"n\":1}\n\nevent: token\ndata: \"hi\"\n\nevent: done\ndata:\n\n"]),
        );

        let (session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], StreamEvent::Step(step) if step.extra["n"] == 1));
        assert_eq!(events[1], StreamEvent::Token("hi".to_string()));
        assert_eq!(events[2], StreamEvent::Done);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_eof_without_done_completes_once() {
        let transport = MockHttpClient::new();
        transport.set_response(STREAM_URL, chunks(&["event: token\ndata: \"partial\"\n\n"]));

        let (session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Token("partial".to_string()));
        assert_eq!(events[1], StreamEvent::Done);
        // The handler was dropped with the task, so the channel is done.
        assert_eq!(rx.recv().await, None);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_open_failure_completes_with_no_events() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            MockResponse::Error(HttpError::ServerError {
                status: 500,
                message: "boom".to_string(),
            }),
        );

        let (session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events, vec![StreamEvent::Done]);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_transport_failure_preserves_delivered_tokens() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            MockResponse::Stream(vec![
                Ok(Bytes::from("event: token\ndata: \"kept\"\n\n")),
                Err(HttpError::Io("connection reset".to_string())),
            ]),
        );

        let (session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Token("kept".to_string()));
        assert_eq!(events[1], StreamEvent::Done);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_decode_failure_completes_once() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            MockResponse::Stream(vec![
                Ok(Bytes::from("event: token\ndata: \"ok\"\n\n")),
                Ok(Bytes::from_static(b"\xFF\xFE")),
            ]),
        );

        let (session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Token("ok".to_string()));
        assert_eq!(events[1], StreamEvent::Done);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_error_event_is_not_terminal() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            chunks(&[
                "event: error\ndata: \"model unavailable\"\n\n",
                "event: token\ndata: \"still here\"\n\n",
                "event: done\ndata:\n\n",
            ]),
        );

        let (_session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StreamEvent::Error(_)));
        assert_eq!(events[1], StreamEvent::Token("still here".to_string()));
        assert_eq!(events[2], StreamEvent::Done);
    }

    #[tokio::test]
    async fn test_nothing_dispatched_after_done() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            chunks(&["event: done\ndata:\n\nevent: token\ndata: \"late\"\n\n"]),
        );

        let (_session, mut rx) = spawn_session(transport);
        let events = collect_until_done(&mut rx).await;

        assert_eq!(events, vec![StreamEvent::Done]);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancel_before_any_chunk_is_silent() {
        let transport = MockHttpClient::new();
        transport.set_response(STREAM_URL, MockResponse::PendingStream);

        let (session, mut rx) = spawn_session(transport);
        // Let the driver open the stream and park on the first read.
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.cancel();
        assert!(session.is_closed());

        // No callback of any kind fires after cancellation; the handler
        // is dropped with the aborted task.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_suppresses_completion() {
        let transport = MockHttpClient::new();
        transport.set_response(
            STREAM_URL,
            MockResponse::StreamThenPending(vec![Ok(Bytes::from(
                "event: token\ndata: \"first\"\n\n",
            ))]),
        );

        let (session, mut rx) = spawn_session(transport);
        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some(StreamEvent::Token("first".to_string())));

        session.cancel();
        assert_eq!(rx.recv().await, None);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_after_close() {
        let transport = MockHttpClient::new();
        transport.set_response(STREAM_URL, chunks(&["event: done\ndata:\n\n"]));

        let (session, mut rx) = spawn_session(transport);
        collect_until_done(&mut rx).await;

        assert!(session.is_closed());
        session.cancel();
        session.cancel();
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let transport_a = MockHttpClient::new();
        transport_a.set_response(STREAM_URL, chunks(&["event: token\ndata: \"a\"\n\nevent: done\ndata:\n\n"]));
        let transport_b = MockHttpClient::new();
        transport_b.set_response(STREAM_URL, chunks(&["event: token\ndata: \"b\"\n\nevent: done\ndata:\n\n"]));

        let (session_a, mut rx_a) = spawn_session(transport_a);
        let (session_b, mut rx_b) = spawn_session(transport_b);
        assert_ne!(session_a.id(), session_b.id());

        let events_a = collect_until_done(&mut rx_a).await;
        let events_b = collect_until_done(&mut rx_b).await;
        assert_eq!(events_a[0], StreamEvent::Token("a".to_string()));
        assert_eq!(events_b[0], StreamEvent::Token("b".to_string()));
    }
}
