//! Learnstream - a streaming client for the LearnLab chat API.
//!
//! The backend answers chat questions over a long-lived POST request
//! whose body is a Server-Sent-Events stream. The native EventSource
//! cannot send a POST body or custom headers, so this crate implements
//! the protocol itself: incremental UTF-8 decoding, blank-line record
//! framing, event parsing, typed dispatch, and a per-request session
//! with cooperative cancellation.

pub mod adapters;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
