//! HTTP DTOs for the ask/reset endpoints.

use serde::{Deserialize, Serialize};

/// Request body for POST /ask.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    pub question: String,
}

/// Response body for POST /ask.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    /// Reply text; may contain lightweight HTML on the escalation path.
    pub answer: String,
}

/// Response body for POST /reset.
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Fixed acknowledgement string.
    pub message: String,
}

/// Response body for GET /health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body returned for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    /// Creates a bad-request error body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "bad_request",
            message: message.into(),
        }
    }

    /// Creates an internal error body.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "internal",
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_deserializes_from_json() {
        let request: AskRequest =
            serde_json::from_str(r#"{"question":"What is incubation?"}"#).unwrap();
        assert_eq!(request.question, "What is incubation?");
    }

    #[test]
    fn answer_serializes_under_the_answer_key() {
        let json = serde_json::to_string(&AskResponse {
            answer: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"answer":"hello"}"#);
    }
}
