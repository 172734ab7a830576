//! Metadata about the ingested corpus document.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// One row per file-search store, upserted at corpus bootstrap so operators
/// can see which document and model back the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Provider-side store resource name, primary key.
    pub store_name: String,
    /// Human-readable store label used for reuse across restarts.
    pub display_name: String,
    pub file_name: String,
    pub file_path: String,
    pub model: String,
    pub source_type: String,
    pub created_at: Timestamp,
}

impl KnowledgeSource {
    /// Describes a PDF corpus backing the given store.
    pub fn pdf(
        store_name: impl Into<String>,
        display_name: impl Into<String>,
        file_path: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let file_path = file_path.into();
        let file_name = file_path
            .rsplit('/')
            .next()
            .unwrap_or(file_path.as_str())
            .to_string();
        Self {
            store_name: store_name.into(),
            display_name: display_name.into(),
            file_name,
            file_path,
            model: model.into(),
            source_type: "pdf".to_string(),
            created_at: Timestamp::now(),
        }
    }
}
