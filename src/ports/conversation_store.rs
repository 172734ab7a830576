//! Conversation store port - persistence for profiles, messages, and tickets.
//!
//! # Design
//!
//! - **Session-scoped**: every query is keyed by the opaque session token
//! - **No transactions across methods**: profile updates and message inserts
//!   are independent operations; the at-most-10 retention window is enforced
//!   best-effort after each normal write
//! - **Profiles are never deleted**: `clear_messages` wipes history only

use async_trait::async_trait;

use crate::domain::dialogue::{ChatMessage, EscalationTicket, KnowledgeSource, UserProfile};
use crate::domain::foundation::{MessageId, SessionId};

/// Repository port for conversation state.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Find the profile for a session.
    ///
    /// Returns `None` on first contact.
    async fn find_profile(&self, session_id: &SessionId) -> Result<Option<UserProfile>, StoreError>;

    /// Insert a freshly created profile.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the session already has a profile
    /// - `Database` on persistence failure
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Write back a mutated profile (full-row update).
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if the session has no profile
    /// - `Database` on persistence failure
    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Append a chat message.
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError>;

    /// Count stored messages for a session, optionally excluding one topic
    /// label (used to keep greetings out of the name-request counter).
    async fn count_messages(
        &self,
        session_id: &SessionId,
        exclude_topic: Option<&str>,
    ) -> Result<u64, StoreError>;

    /// Fetch the most recent `limit` messages, returned oldest-first.
    async fn recent_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, StoreError>;

    /// Ids of the `limit` oldest messages for a session (eviction order).
    async fn oldest_message_ids(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<MessageId>, StoreError>;

    /// Delete specific messages; returns the number actually removed.
    async fn delete_messages(&self, ids: &[MessageId]) -> Result<u64, StoreError>;

    /// Delete all messages for a session (profile retained); returns the
    /// number removed. Idempotent.
    async fn clear_messages(&self, session_id: &SessionId) -> Result<u64, StoreError>;

    /// Record an escalation ticket.
    async fn insert_ticket(&self, ticket: &EscalationTicket) -> Result<(), StoreError>;

    /// Upsert corpus metadata, keyed by store resource name.
    async fn upsert_knowledge_source(&self, source: &KnowledgeSource) -> Result<(), StoreError>;
}

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No profile exists for the session.
    #[error("profile not found for session {0}")]
    ProfileNotFound(SessionId),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ConversationStore) {}
    }
}
