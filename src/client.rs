//! LearnLab API client.
//!
//! This module provides the HTTP client for the LearnLab backend,
//! including streaming answers via Server-Sent Events (SSE) over a POST
//! request. The credential is an explicit constructor parameter; nothing
//! is read from ambient state at request time.

use std::sync::Arc;

use crate::adapters::ReqwestHttpClient;
use crate::dispatch::StreamHandler;
use crate::error::ClientError;
use crate::models::{AskRequest, AskResponse};
use crate::session::StreamSession;
use crate::traits::{Headers, HttpClient, RequestDescriptor};

/// Default backend URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Client for the LearnLab backend API.
///
/// One client can run any number of concurrent streaming sessions; each
/// session owns its own buffers and cancel handle.
pub struct LearnLabClient {
    /// Base URL for the backend
    pub base_url: String,
    /// Bearer token sent with every request, when present
    token: Option<String>,
    /// Transport, injectable for tests
    http: Arc<dyn HttpClient>,
}

impl LearnLabClient {
    /// Create a client over the production reqwest transport.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_http_client(base_url, token, Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a client over a custom transport.
    pub fn with_http_client(
        base_url: impl Into<String>,
        token: Option<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            http,
        }
    }

    /// Stream an answer from the backend.
    ///
    /// Sends a POST to `/chat/ask_stream` and returns the session handle
    /// immediately; events arrive through the handler. The handler's
    /// completion callback fires exactly once unless the session is
    /// cancelled first.
    pub fn ask_stream<H>(
        &self,
        request: &AskRequest,
        handler: H,
    ) -> Result<StreamSession, ClientError>
    where
        H: StreamHandler + 'static,
    {
        let body = serde_json::to_string(request)?;
        let mut descriptor =
            RequestDescriptor::post(format!("{}/chat/ask_stream", self.base_url), body)
                .header("Content-Type", "application/json")
                .header("Accept", "text/event-stream");
        if let Some(token) = &self.token {
            descriptor = descriptor.bearer(token);
        }

        Ok(StreamSession::spawn(
            Arc::clone(&self.http),
            descriptor,
            handler,
        ))
    }

    /// Ask without streaming: one buffered request, one JSON reply.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ClientError> {
        let url = format!("{}/chat/ask", self.base_url);
        let body = serde_json::to_string(request)?;
        let response = self.http.post(&url, &body, &self.json_headers()).await?;

        if !response.is_success() {
            return Err(ClientError::Server {
                status: response.status,
                message: response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            });
        }

        Ok(response.json()?)
    }

    /// Check if the backend is healthy and reachable.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = format!("{}/healthz", self.base_url);
        let response = self.http.get(&url, &Headers::new()).await?;
        Ok(response.is_success())
    }

    fn json_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}
