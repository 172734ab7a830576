//! In-memory implementation of ConversationStore.
//!
//! Backs the dialogue tests; keeps messages in insertion order per session so
//! retention and windowing behave like the timestamp-ordered SQL queries.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::dialogue::{ChatMessage, EscalationTicket, KnowledgeSource, UserProfile};
use crate::domain::foundation::{MessageId, SessionId};
use crate::ports::{ConversationStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<SessionId, UserProfile>,
    messages: Vec<ChatMessage>,
    tickets: Vec<EscalationTicket>,
    knowledge: HashMap<String, KnowledgeSource>,
}

/// In-memory conversation store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All tickets recorded so far (verification helper).
    pub fn tickets(&self) -> Vec<EscalationTicket> {
        self.inner.lock().unwrap().tickets.clone()
    }

    /// All messages for a session in insertion order (verification helper).
    pub fn messages_for(&self, session_id: &SessionId) -> Vec<ChatMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Recorded knowledge sources (verification helper).
    pub fn knowledge_sources(&self) -> Vec<KnowledgeSource> {
        self.inner.lock().unwrap().knowledge.values().cloned().collect()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_profile(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.inner.lock().unwrap().profiles.get(session_id).cloned())
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.profiles.contains_key(&profile.session_id) {
            return Err(StoreError::Conflict(format!(
                "Profile exists: {}",
                profile.session_id
            )));
        }
        inner
            .profiles
            .insert(profile.session_id.clone(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.profiles.get_mut(&profile.session_id) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(())
            }
            None => Err(StoreError::ProfileNotFound(profile.session_id.clone())),
        }
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        self.inner.lock().unwrap().messages.push(message.clone());
        Ok(())
    }

    async fn count_messages(
        &self,
        session_id: &SessionId,
        exclude_topic: Option<&str>,
    ) -> Result<u64, StoreError> {
        let inner = self.inner.lock().unwrap();
        let count = inner
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .filter(|m| exclude_topic.map_or(true, |t| m.topic != t))
            .count();
        Ok(count as u64)
    }

    async fn recent_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let session: Vec<_> = inner
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect();
        let skip = session.len().saturating_sub(limit as usize);
        Ok(session.into_iter().skip(skip).collect())
    }

    async fn oldest_message_ids(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<MessageId>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .take(limit as usize)
            .map(|m| m.id)
            .collect())
    }

    async fn delete_messages(&self, ids: &[MessageId]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.messages.len();
        inner.messages.retain(|m| !ids.contains(&m.id));
        Ok((before - inner.messages.len()) as u64)
    }

    async fn clear_messages(&self, session_id: &SessionId) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.messages.len();
        inner.messages.retain(|m| &m.session_id != session_id);
        Ok((before - inner.messages.len()) as u64)
    }

    async fn insert_ticket(&self, ticket: &EscalationTicket) -> Result<(), StoreError> {
        self.inner.lock().unwrap().tickets.push(ticket.clone());
        Ok(())
    }

    async fn upsert_knowledge_source(&self, source: &KnowledgeSource) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .knowledge
            .insert(source.store_name.clone(), source.clone());
        Ok(())
    }
}
