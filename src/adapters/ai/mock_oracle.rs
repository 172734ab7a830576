//! Mock oracle for testing.
//!
//! Scriptable implementation of the AnswerOracle port so dialogue tests run
//! without calling the real API.
//!
//! # Example
//!
//! ```ignore
//! let oracle = MockOracle::new()
//!     .with_answer("Incubation runs for 12 months.")
//!     .with_error(OracleError::AuthenticationFailed);
//!
//! let answer = oracle.ask("prompt").await?;   // scripted answer
//! oracle.ask("prompt").await.unwrap_err();    // scripted error
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{AnswerOracle, OracleError};

/// A scripted oracle response.
#[derive(Debug)]
enum MockAnswer {
    Success(String),
    Failure(OracleError),
}

/// Mock oracle with scripted responses and call capture.
///
/// Scripted responses are consumed in order; once exhausted, a fixed default
/// answer is returned. Every received prompt is recorded for verification.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    script: Arc<Mutex<VecDeque<MockAnswer>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockOracle {
    /// Creates an unscripted mock (always answers with the default text).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful answer.
    pub fn with_answer(self, answer: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockAnswer::Success(answer.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: OracleError) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockAnswer::Failure(error));
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerOracle for MockOracle {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(MockAnswer::Success(answer)) => Ok(answer),
            Some(MockAnswer::Failure(error)) => Err(error),
            None => Ok("Mock answer.".to_string()),
        }
    }
}
