//! PostgreSQL implementation of ConversationStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::dialogue::{ChatMessage, EscalationTicket, KnowledgeSource, UserProfile};
use crate::domain::foundation::{MessageId, SessionId, Timestamp};
use crate::ports::{ConversationStore, StoreError};

/// PostgreSQL implementation of ConversationStore.
#[derive(Clone)]
pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    /// Creates a new PostgresConversationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn find_profile(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, name, name_asked, name_asked_at, name_provided_at,
                   first_seen, last_seen, total_messages, first_question, topics_asked
            FROM users
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to query profile: {}", e)))?;

        row.map(profile_from_row).transpose()
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                session_id, name, name_asked, name_asked_at, name_provided_at,
                first_seen, last_seen, total_messages, first_question, topics_asked
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.session_id.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.name_asked)
        .bind(profile.name_asked_at.map(|t| *t.as_datetime()))
        .bind(profile.name_provided_at.map(|t| *t.as_datetime()))
        .bind(profile.first_seen.as_datetime())
        .bind(profile.last_seen.as_datetime())
        .bind(profile.total_messages)
        .bind(profile.first_question.as_deref())
        .bind(&profile.topics_asked)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("Profile exists: {}", db.message()))
            }
            _ => StoreError::database(format!("Failed to insert profile: {}", e)),
        })?;

        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                name_asked = $3,
                name_asked_at = $4,
                name_provided_at = $5,
                last_seen = $6,
                total_messages = $7,
                topics_asked = $8
            WHERE session_id = $1
            "#,
        )
        .bind(profile.session_id.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.name_asked)
        .bind(profile.name_asked_at.map(|t| *t.as_datetime()))
        .bind(profile.name_provided_at.map(|t| *t.as_datetime()))
        .bind(profile.last_seen.as_datetime())
        .bind(profile.total_messages)
        .bind(&profile.topics_asked)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to update profile: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProfileNotFound(profile.session_id.clone()));
        }

        Ok(())
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO chat_history (id, session_id, user_name, question, answer, topic, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.session_id.as_str())
        .bind(message.user_name.as_deref())
        .bind(&message.question)
        .bind(&message.answer)
        .bind(&message.topic)
        .bind(message.timestamp.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert message: {}", e)))?;

        Ok(())
    }

    async fn count_messages(
        &self,
        session_id: &SessionId,
        exclude_topic: Option<&str>,
    ) -> Result<u64, StoreError> {
        let count: i64 = match exclude_topic {
            Some(topic) => sqlx::query_scalar(
                "SELECT COUNT(*) FROM chat_history WHERE session_id = $1 AND topic <> $2",
            )
            .bind(session_id.as_str())
            .bind(topic)
            .fetch_one(&self.pool)
            .await,
            None => sqlx::query_scalar("SELECT COUNT(*) FROM chat_history WHERE session_id = $1")
                .bind(session_id.as_str())
                .fetch_one(&self.pool)
                .await,
        }
        .map_err(|e| StoreError::database(format!("Failed to count messages: {}", e)))?;

        Ok(count as u64)
    }

    async fn recent_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        // Newest N, then flipped to chronological order for prompt building.
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, user_name, question, answer, topic, created_at
            FROM chat_history
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(session_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to query messages: {}", e)))?;

        let mut messages = rows
            .into_iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn oldest_message_ids(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<MessageId>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM chat_history
            WHERE session_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(session_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to query oldest messages: {}", e)))?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<Uuid, _>("id")
                    .map(MessageId::from_uuid)
                    .map_err(|e| StoreError::database(format!("Bad message id: {}", e)))
            })
            .collect()
    }

    async fn delete_messages(&self, ids: &[MessageId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query("DELETE FROM chat_history WHERE id = ANY($1)")
            .bind(&uuids)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to delete messages: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn clear_messages(&self, session_id: &SessionId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM chat_history WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to clear messages: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn insert_ticket(&self, ticket: &EscalationTicket) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO escalations (id, session_id, user_name, question, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.session_id.as_str())
        .bind(&ticket.user_name)
        .bind(&ticket.question)
        .bind(ticket.status.as_str())
        .bind(ticket.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert ticket: {}", e)))?;

        Ok(())
    }

    async fn upsert_knowledge_source(&self, source: &KnowledgeSource) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO knowledge_sources (
                store_name, display_name, file_name, file_path, model, source_type, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (store_name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                file_name = EXCLUDED.file_name,
                file_path = EXCLUDED.file_path,
                model = EXCLUDED.model,
                source_type = EXCLUDED.source_type
            "#,
        )
        .bind(&source.store_name)
        .bind(&source.display_name)
        .bind(&source.file_name)
        .bind(&source.file_path)
        .bind(&source.model)
        .bind(&source.source_type)
        .bind(source.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to upsert knowledge source: {}", e)))?;

        Ok(())
    }
}

fn profile_from_row(row: sqlx::postgres::PgRow) -> Result<UserProfile, StoreError> {
    let session_id: String = field(&row, "session_id")?;
    let session_id = SessionId::new(session_id)
        .map_err(|e| StoreError::database(format!("Bad session id: {}", e)))?;

    Ok(UserProfile {
        session_id,
        name: field(&row, "name")?,
        name_asked: field(&row, "name_asked")?,
        name_asked_at: field::<Option<chrono::DateTime<chrono::Utc>>>(&row, "name_asked_at")?
            .map(Timestamp::from_datetime),
        name_provided_at: field::<Option<chrono::DateTime<chrono::Utc>>>(&row, "name_provided_at")?
            .map(Timestamp::from_datetime),
        first_seen: Timestamp::from_datetime(field(&row, "first_seen")?),
        last_seen: Timestamp::from_datetime(field(&row, "last_seen")?),
        total_messages: field(&row, "total_messages")?,
        first_question: field(&row, "first_question")?,
        topics_asked: field(&row, "topics_asked")?,
    })
}

fn message_from_row(row: sqlx::postgres::PgRow) -> Result<ChatMessage, StoreError> {
    let session_id: String = field(&row, "session_id")?;
    let session_id = SessionId::new(session_id)
        .map_err(|e| StoreError::database(format!("Bad session id: {}", e)))?;

    Ok(ChatMessage {
        id: MessageId::from_uuid(field(&row, "id")?),
        session_id,
        user_name: field(&row, "user_name")?,
        question: field(&row, "question")?,
        answer: field(&row, "answer")?,
        topic: field(&row, "topic")?,
        timestamp: Timestamp::from_datetime(field(&row, "created_at")?),
    })
}

fn field<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::database(format!("Bad column {}: {}", name, e)))
}
