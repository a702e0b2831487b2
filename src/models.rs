//! Request and response models for the LearnLab chat API.

use serde::{Deserialize, Serialize};

use crate::sse::StepInfo;

/// Default number of documents retrieved for the knowledge path.
pub const DEFAULT_RETRIEVAL_K: u32 = 4;

/// Body of an `ask` or `ask_stream` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    /// The prompt/question to send
    pub prompt: String,
    /// Model override; the backend picks its default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Token budget for the generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// LLM provider name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Knowledge namespace to retrieve from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Number of documents to retrieve
    pub k: u32,
    /// Agent to route to (e.g. "knowledge", "tutor")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_agent: Option<String>,
    /// Tutor mode (e.g. "walkthrough", "code_review")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Chat session to append the exchange to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AskRequest {
    /// Create a request with just a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_tokens: None,
            provider: None,
            namespace: None,
            k: DEFAULT_RETRIEVAL_K,
            preferred_agent: None,
            mode: None,
            session_id: None,
        }
    }

    /// Create a request bound to an existing chat session.
    pub fn with_session(prompt: impl Into<String>, session_id: impl Into<String>) -> Self {
        let mut request = Self::new(prompt);
        request.session_id = Some(session_id.into());
        request
    }

    /// Set the knowledge namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the preferred agent.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.preferred_agent = Some(agent.into());
        self
    }

    /// Set the tutor mode.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Reply of the non-streaming `ask` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    /// Orchestrator actions taken while producing the answer
    #[serde(default)]
    pub steps: Vec<StepInfo>,
    /// Source citations, shape defined by the backend
    #[serde(default)]
    pub citations: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_defaults() {
        let request = AskRequest::new("what is a monad?");
        assert_eq!(request.prompt, "what is a monad?");
        assert_eq!(request.k, DEFAULT_RETRIEVAL_K);
        assert_eq!(request.session_id, None);
    }

    #[test]
    fn test_optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(AskRequest::new("hi")).unwrap();
        assert_eq!(json["prompt"], "hi");
        assert_eq!(json["k"], 4);
        assert!(json.get("namespace").is_none());
        assert!(json.get("preferred_agent").is_none());
        assert!(json.get("session_id").is_none());
    }

    #[test]
    fn test_builders() {
        let request = AskRequest::with_session("q", "sess-1")
            .with_namespace("rust")
            .with_agent("tutor")
            .with_mode("walkthrough");
        assert_eq!(request.session_id.as_deref(), Some("sess-1"));
        assert_eq!(request.namespace.as_deref(), Some("rust"));
        assert_eq!(request.preferred_agent.as_deref(), Some("tutor"));
        assert_eq!(request.mode.as_deref(), Some("walkthrough"));
    }

    #[test]
    fn test_ask_response_deserializes_sparse_reply() {
        let response: AskResponse =
            serde_json::from_str(r#"{"answer": "42", "steps": [{"name": "router"}]}"#).unwrap();
        assert_eq!(response.answer.as_deref(), Some("42"));
        assert_eq!(response.steps.len(), 1);
        assert!(response.citations.is_empty());
        assert_eq!(response.request_id, None);
    }
}
