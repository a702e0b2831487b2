//! Error types for the client surface.
//!
//! Streaming failures never surface here: the session collapses them
//! into its completion callback so UI code has one place to finalize
//! state. These errors cover the buffered endpoints and request
//! construction.

use thiserror::Error;

use crate::traits::HttpError;

/// Errors returned by [`crate::client::LearnLabClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}
