//! Answer Oracle port - interface to the external answer-generation service.
//!
//! The oracle is a black box: the dialogue manager hands it a prompt and gets
//! back answer text. Retrieval, grounding, and generation all happen on the
//! provider side.

use async_trait::async_trait;

/// Port for the document-grounded answer service.
///
/// Implementations connect to an external LLM API configured with the corpus
/// retrieval tool; tests use a scripted mock.
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Sends a prompt and returns the generated answer text.
    ///
    /// # Errors
    ///
    /// Returns `OracleError` on network, authentication, or provider
    /// failures. A "no answer found in corpus" condition is NOT an error:
    /// it arrives as ordinary answer text and is detected downstream.
    async fn ask(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Oracle call failures.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Could not reach the provider.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider returned a server-side failure.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Provider response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl OracleError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if the failure is a connectivity problem (as opposed to
    /// a credential or protocol problem).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, OracleError::Network(_) | OracleError::Timeout { .. })
    }
}
