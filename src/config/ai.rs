//! Gemini provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the Gemini answer oracle.
///
/// The API key is required; a missing or empty key fails validation at
/// startup rather than at first request.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub api_key: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the generateContent API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for media uploads (corpus ingestion)
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    /// Display name of the file-search store holding the corpus
    #[serde(default = "default_store_display_name")]
    pub store_display_name: String,

    /// Path to the corpus document uploaded at bootstrap
    #[serde(default = "default_corpus_file")]
    pub corpus_file: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is present and non-empty
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate Gemini configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GEMINI API_KEY"));
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidGeminiBaseUrl);
        }
        if self.store_display_name.is_empty() {
            return Err(ValidationError::MissingRequired("AI STORE_DISPLAY_NAME"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            upload_base_url: default_upload_base_url(),
            store_display_name: default_store_display_name(),
            corpus_file: default_corpus_file(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_upload_base_url() -> String {
    "https://generativelanguage.googleapis.com/upload/v1beta".to_string()
}

fn default_store_display_name() -> String {
    "incubation_portal_base_v2".to_string()
}

fn default_corpus_file() -> String {
    "input/SPPU_RPF_Qs&As.pdf".to_string()
}

fn default_timeout() -> u64 {
    120
}
