//! Stored chat exchanges.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, SessionId, Timestamp};

/// Hard cap on retained messages per session (FIFO retention window, not an
/// LRU): after every normal-path write the oldest rows beyond this count are
/// deleted.
pub const RETENTION_WINDOW: usize = 10;

/// One question/answer exchange, ordered by timestamp within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub session_id: SessionId,
    /// Profile name at write time, if known.
    pub user_name: Option<String>,
    pub question: String,
    pub answer: String,
    /// Classified topic label, or `"greeting"`.
    pub topic: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Creates a new exchange record.
    pub fn new(
        session_id: SessionId,
        user_name: Option<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        topic: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            user_name,
            question: question.into(),
            answer: answer.into(),
            topic: topic.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_messages_get_distinct_ids() {
        let session = SessionId::new("s1").unwrap();
        let a = ChatMessage::new(session.clone(), None, "q", "a", "general", Timestamp::now());
        let b = ChatMessage::new(session, None, "q", "a", "general", Timestamp::now());
        assert_ne!(a.id, b.id);
    }
}
