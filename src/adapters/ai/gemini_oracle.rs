//! Gemini implementation of the AnswerOracle port.
//!
//! Calls the `models/{model}:generateContent` REST endpoint with a fixed
//! system instruction and a `file_search` tool pointing at the corpus store,
//! so retrieval and grounding happen entirely on the provider side.
//!
//! Also owns the one-time corpus bootstrap: find or create the file-search
//! store by display name, upload the corpus document, and poll the returned
//! long-running operation until ingestion finishes.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_store_name("fileSearchStores/abc123");
//!
//! let oracle = GeminiOracle::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AnswerOracle, OracleError};

/// System instruction pinning the model to the corpus document and to the
/// bulleted answer format the portal frontend renders.
const SYSTEM_INSTRUCTION: &str = "You are an Incubation Portal Consultation Chatbot.\n\
Answer strictly and only from the provided document.\n\
Do NOT add external knowledge.\n\
Do NOT merge multiple questions.\n\
Answer ONLY the first question if multiple are asked.\n\n\
VERY IMPORTANT FORMATTING RULES (FOLLOW STRICTLY):\n\
- Use a CLEAR TITLE as the first line.\n\
- Give a ONE-LINE definition below the title.\n\
- Then provide sections with bullet points.\n\
- Use short, crisp bullets (AWS documentation style).\n\
- Do NOT write long paragraphs.\n\
- Each bullet must contain only ONE idea.\n\n\
MANDATORY ANSWER STRUCTURE:\n\
Title\n\
Short description (1–2 lines)\n\n\
Key Points:\n\
•Bullet point\n\
•Bullet point\n\n\
Facilities / Support / Details (if applicable):\n\
•Bullet point\n\
•Bullet point\n\n";

/// Seconds between polls of the ingestion operation.
const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polling attempts before giving up on ingestion.
const OPERATION_POLL_LIMIT: u32 = 150;

/// Configuration for the Gemini oracle.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Base URL for media uploads.
    pub upload_base_url: String,
    /// Resource name of the file-search store queried on every request.
    /// Empty until the bootstrap has run or a name is injected directly.
    pub store_name: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upload_base_url: "https://generativelanguage.googleapis.com/upload/v1beta".to_string(),
            store_name: String::new(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the upload base URL.
    pub fn with_upload_base_url(mut self, url: impl Into<String>) -> Self {
        self.upload_base_url = url.into();
        self
    }

    /// Sets the file-search store resource name.
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API oracle implementation.
pub struct GeminiOracle {
    config: GeminiConfig,
    client: Client,
}

impl GeminiOracle {
    /// Creates a new Gemini oracle with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Replaces the store name after bootstrap.
    pub fn set_store_name(&mut self, name: impl Into<String>) {
        self.config.store_name = name.into();
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn to_generate_request<'a>(&'a self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: InstructionPayload {
                parts: vec![PartPayload {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![ContentPayload {
                role: "user",
                parts: vec![PartPayload { text: prompt }],
            }],
            tools: vec![ToolPayload {
                file_search: FileSearchPayload {
                    file_search_store_names: vec![self.config.store_name.as_str()],
                },
            }],
        }
    }

    /// Maps transport failures to oracle errors.
    fn map_transport_error(&self, e: reqwest::Error) -> OracleError {
        if e.is_timeout() {
            OracleError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            }
        } else if e.is_connect() {
            OracleError::network(format!("Connection failed: {}", e))
        } else {
            OracleError::network(e.to_string())
        }
    }

    /// Converts non-success statuses into oracle errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, OracleError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(OracleError::AuthenticationFailed),
            429 => Err(OracleError::unavailable(format!(
                "Rate limited: {}",
                error_body
            ))),
            500..=599 => Err(OracleError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(OracleError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    // ── Corpus bootstrap ────────────────────────────────────────────────

    /// Finds or creates the file-search store, uploading the corpus file on
    /// first creation, and stores the resulting resource name on the config.
    ///
    /// Idempotent across restarts: an existing store with the configured
    /// display name is reused without re-uploading.
    pub async fn ensure_corpus_store(
        &mut self,
        display_name: &str,
        corpus_file: &str,
    ) -> Result<String, OracleError> {
        if let Some(existing) = self.find_store_by_display_name(display_name).await? {
            tracing::info!(store = %existing, "Reusing existing file-search store");
            self.config.store_name = existing.clone();
            return Ok(existing);
        }

        let store_name = self.create_store(display_name).await?;
        tracing::info!(store = %store_name, file = corpus_file, "Uploading corpus document");
        self.upload_corpus(&store_name, corpus_file).await?;

        self.config.store_name = store_name.clone();
        Ok(store_name)
    }

    async fn find_store_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<String>, OracleError> {
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/fileSearchStores", self.config.base_url))
                .header("x-goog-api-key", self.config.api_key());
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| self.map_transport_error(e))?;
            let response = self.handle_response_status(response).await?;

            let page: ListStoresResponse = response
                .json()
                .await
                .map_err(|e| OracleError::parse(format!("Failed to parse store list: {}", e)))?;

            for store in page.file_search_stores.unwrap_or_default() {
                if store.display_name.as_deref() == Some(display_name) {
                    return Ok(Some(store.name));
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(None),
            }
        }
    }

    async fn create_store(&self, display_name: &str) -> Result<String, OracleError> {
        let response = self
            .client
            .post(format!("{}/fileSearchStores", self.config.base_url))
            .header("x-goog-api-key", self.config.api_key())
            .json(&CreateStoreRequest { display_name })
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.handle_response_status(response).await?;

        let store: StoreResource = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("Failed to parse created store: {}", e)))?;

        Ok(store.name)
    }

    async fn upload_corpus(&self, store_name: &str, corpus_file: &str) -> Result<(), OracleError> {
        let bytes = tokio::fs::read(corpus_file)
            .await
            .map_err(|e| OracleError::unavailable(format!("Cannot read corpus file: {}", e)))?;

        let file_name = corpus_file
            .rsplit('/')
            .next()
            .unwrap_or(corpus_file)
            .to_string();

        let metadata = serde_json::json!({ "file": { "displayName": file_name } });
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| OracleError::parse(e.to_string()))?,
            )
            .part(
                "data",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("application/pdf")
                    .map_err(|e| OracleError::parse(e.to_string()))?,
            );

        let response = self
            .client
            .post(format!(
                "{}/{}:uploadToFileSearchStore",
                self.config.upload_base_url, store_name
            ))
            .header("x-goog-api-key", self.config.api_key())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.handle_response_status(response).await?;

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("Failed to parse upload operation: {}", e)))?;

        self.wait_for_operation(operation).await
    }

    async fn wait_for_operation(&self, mut operation: Operation) -> Result<(), OracleError> {
        let mut attempts = 0;

        while !operation.done.unwrap_or(false) {
            if attempts >= OPERATION_POLL_LIMIT {
                return Err(OracleError::unavailable(
                    "Corpus ingestion did not finish in time",
                ));
            }
            attempts += 1;
            sleep(OPERATION_POLL_INTERVAL).await;

            let response = self
                .client
                .get(format!("{}/{}", self.config.base_url, operation.name))
                .header("x-goog-api-key", self.config.api_key())
                .send()
                .await
                .map_err(|e| self.map_transport_error(e))?;
            let response = self.handle_response_status(response).await?;

            operation = response
                .json()
                .await
                .map_err(|e| OracleError::parse(format!("Failed to parse operation: {}", e)))?;
        }

        if let Some(error) = operation.error {
            return Err(OracleError::unavailable(format!(
                "Corpus ingestion failed: {}",
                error.message.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AnswerOracle for GeminiOracle {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        let request = self.to_generate_request(prompt);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.handle_response_status(response).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("Failed to parse response: {}", e)))?;

        let candidate = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::parse("No candidates in response"))?;

        let text = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(OracleError::parse("Empty answer in response"));
        }

        Ok(text)
    }
}

// ── Wire format ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: InstructionPayload<'a>,
    contents: Vec<ContentPayload<'a>>,
    tools: Vec<ToolPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct InstructionPayload<'a> {
    parts: Vec<PartPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentPayload<'a> {
    role: &'a str,
    parts: Vec<PartPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct PartPayload<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolPayload<'a> {
    file_search: FileSearchPayload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileSearchPayload<'a> {
    file_search_store_names: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateStoreRequest<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListStoresResponse {
    file_search_stores: Option<Vec<StoreResource>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreResource {
    name: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    done: Option<bool>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_sets_fields() {
        let config = GeminiConfig::new("key")
            .with_model("gemini-2.0-pro")
            .with_base_url("http://localhost:9999/v1beta")
            .with_store_name("fileSearchStores/test")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.store_name, "fileSearchStores/test");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn generate_request_carries_store_and_instruction() {
        let oracle = GeminiOracle::new(
            GeminiConfig::new("key").with_store_name("fileSearchStores/test"),
        );
        let request = oracle.to_generate_request("What is incubation?");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "What is incubation?"
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["tools"][0]["fileSearch"]["fileSearchStoreNames"][0],
            "fileSearchStores/test"
        );
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Answer strictly and only from the provided document"));
    }

    #[test]
    fn generate_url_includes_model() {
        let oracle = GeminiOracle::new(GeminiConfig::new("key").with_model("gemini-2.5-flash"));
        assert!(oracle
            .generate_url()
            .ends_with("/models/gemini-2.5-flash:generateContent"));
    }
}
