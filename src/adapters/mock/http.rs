//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, errors, or scripted byte streams for testing purposes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, RequestDescriptor, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Return a scripted byte stream; items may be chunks or mid-stream
    /// errors, and the stream ends after the last item
    Stream(Vec<Result<Bytes, HttpError>>),
    /// Return the scripted items, then stay open without yielding -
    /// useful for cancellation tests
    StreamThenPending(Vec<Result<Bytes, HttpError>>),
    /// Return a stream that never yields anything
    PendingStream,
}

/// Mock HTTP client for testing.
///
/// This client can be configured to return specific responses per URL,
/// allowing tests to verify HTTP interactions without network access.
/// Every request is recorded for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock client with no configured responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the response for a specific URL.
    pub fn set_response(&self, url: impl Into<String>, response: MockResponse) {
        self.responses.lock().unwrap().insert(url.into(), response);
    }

    /// Configure the response used when no URL matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// All requests made so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn lookup(&self, url: &str) -> Option<MockResponse> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .or_else(|| self.default_response.lock().unwrap().clone())
    }

    fn not_configured(url: &str) -> HttpError {
        HttpError::ConnectionFailed(format!("no mock response configured for {}", url))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record(RecordedRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
        });

        match self.lookup(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(e)) => Err(e),
            Some(_) => Err(HttpError::Other(
                "mock configured with a streaming response for a buffered request".to_string(),
            )),
            None => Err(Self::not_configured(url)),
        }
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record(RecordedRequest {
            method: "POST".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: Some(body.to_string()),
        });

        match self.lookup(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(e)) => Err(e),
            Some(_) => Err(HttpError::Other(
                "mock configured with a streaming response for a buffered request".to_string(),
            )),
            None => Err(Self::not_configured(url)),
        }
    }

    async fn open_stream(&self, request: &RequestDescriptor) -> Result<ByteStream, HttpError> {
        self.record(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: Some(request.body.clone()),
        });

        match self.lookup(&request.url) {
            Some(MockResponse::Stream(items)) => Ok(Box::pin(stream::iter(items))),
            Some(MockResponse::StreamThenPending(items)) => {
                Ok(Box::pin(stream::iter(items).chain(stream::pending())))
            }
            Some(MockResponse::PendingStream) => {
                Ok(Box::pin(stream::pending::<Result<Bytes, HttpError>>()))
            }
            Some(MockResponse::Error(e)) => Err(e),
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "mock configured with a buffered response for a streaming request".to_string(),
            )),
            None => Err(Self::not_configured(&request.url)),
        }
    }
}
