//! Session dialogue manager.
//!
//! The one piece of repo-owned logic: routes each inbound question through
//! profile bootstrap, the greeting / name-capture state machine, prompt
//! construction over the rolling window, and the escalation fallback, before
//! delegating answer generation to the oracle.

use chrono::{Local, Timelike};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::dialogue::{
    classify, contextual_greeting, contextualize, escalation_reply, is_greeting, is_no_answer,
    render_history, ChatMessage, EscalationTicket, SessionState, UserProfile, GREETING_TOPIC,
    RETENTION_WINDOW,
};
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{AnswerOracle, ConversationStore, OracleError, StoreError};

/// Non-greeting messages before the bot asks for the user's name.
const NAME_REQUEST_THRESHOLD: u64 = 3;

/// Reply when a greeting arrives while a name is expected.
const GREETING_WHILE_AWAITING_NAME: &str =
    "😊 That sounds like a greeting. May I know your name?";

/// The one-time name request.
const NAME_REQUEST: &str = "Before we continue, may I know your name? 🙂";

/// Acknowledgement for a history reset.
const RESET_ACK: &str = "🔄 Conversation history cleared. How can I help you?";

/// Fixed reply for oracle connectivity failures.
const CONNECTIVITY_REPLY: &str =
    "❌ Cannot connect to the Gemini API. Please check your internet connection and try again.";

/// Fixed reply for rejected credentials.
const BAD_KEY_REPLY: &str = "❌ Invalid API key. Please check the configured Gemini API key.";

/// Longest error detail surfaced to the user.
const ERROR_DETAIL_LIMIT: usize = 100;

/// Contact details surfaced in escalation replies.
#[derive(Debug, Clone)]
pub struct SupportContact {
    pub email: String,
    pub phone: String,
}

/// Errors that can escape `handle_question`.
///
/// Oracle failures never appear here: they are converted into fixed
/// user-facing reply strings. Persistence failures do propagate.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Question is empty or whitespace only.
    #[error("Validation error: question cannot be empty")]
    EmptyQuestion,

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates one session's dialogue between the oracle and the store.
pub struct DialogueManager {
    oracle: Arc<dyn AnswerOracle>,
    store: Arc<dyn ConversationStore>,
    contact: SupportContact,
}

impl DialogueManager {
    /// Creates a new dialogue manager.
    pub fn new(
        oracle: Arc<dyn AnswerOracle>,
        store: Arc<dyn ConversationStore>,
        contact: SupportContact,
    ) -> Self {
        Self {
            oracle,
            store,
            contact,
        }
    }

    /// Handles one inbound question and returns the reply text (possibly
    /// containing lightweight HTML markup on the escalation path).
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::EmptyQuestion` for blank input and
    /// `DialogueError::Store` when persistence fails. Oracle failures are
    /// absorbed into fixed user-facing reply strings.
    #[tracing::instrument(skip(self, question), fields(session = %session_id))]
    pub async fn handle_question(
        &self,
        question: &str,
        session_id: &SessionId,
    ) -> Result<String, DialogueError> {
        if question.trim().is_empty() {
            return Err(DialogueError::EmptyQuestion);
        }

        let now = Timestamp::now();
        let mut profile = self.load_or_create_profile(session_id, question, now).await?;

        let non_greeting_count = self
            .store
            .count_messages(session_id, Some(GREETING_TOPIC))
            .await?;

        // Name capture takes priority over everything, greeting included:
        // a greeting while awaiting the name is treated as a dodge.
        if profile.state() == SessionState::AwaitingName {
            if is_greeting(question) {
                return Ok(GREETING_WHILE_AWAITING_NAME.to_string());
            }

            let name = profile.record_name(question, now).to_string();
            self.store.update_profile(&profile).await?;
            tracing::info!(name = %name, "Captured user name");
            return Ok(format!("Nice to meet you, {name} 👋 How can I help you today?"));
        }

        // Greetings short-circuit the oracle but are logged (topic
        // "greeting") so the history shows them; they never advance the
        // name-request counter.
        if is_greeting(question) {
            let reply = contextual_greeting(profile.name.as_deref(), Local::now().hour());
            let message = ChatMessage::new(
                session_id.clone(),
                profile.name.clone(),
                question,
                &reply,
                GREETING_TOPIC,
                now,
            );
            self.store.insert_message(&message).await?;
            return Ok(reply);
        }

        // Ask for the name once, after the third non-greeting message.
        if profile.state() == SessionState::New && non_greeting_count >= NAME_REQUEST_THRESHOLD {
            profile.mark_name_asked(now);
            self.store.update_profile(&profile).await?;
            return Ok(NAME_REQUEST.to_string());
        }

        // Normal path: prompt = rolling window + current question.
        let history = self
            .store
            .recent_messages(session_id, RETENTION_WINDOW as u32)
            .await?;
        let prompt = contextualize(&render_history(&history), question);

        let answer = match self.oracle.ask(&prompt).await {
            Ok(answer) => answer,
            Err(error) => {
                tracing::error!(%error, "Oracle call failed");
                return Ok(Self::oracle_failure_reply(&error));
            }
        };

        // "No information in the corpus" is a semantic signal, not an error:
        // route to a human instead of storing the non-answer.
        if is_no_answer(&answer) {
            return Ok(self.escalate(session_id, &profile, question, now).await?);
        }

        let topic = classify(question);
        let message = ChatMessage::new(
            session_id.clone(),
            profile.name.clone(),
            question,
            &answer,
            topic,
            now,
        );
        self.store.insert_message(&message).await?;

        profile.record_topic(topic);
        self.store.update_profile(&profile).await?;

        self.enforce_retention(session_id).await?;

        Ok(answer)
    }

    /// Clears the session's chat history (profile and name retained).
    ///
    /// Idempotent: clearing an empty session succeeds.
    #[tracing::instrument(skip(self), fields(session = %session_id))]
    pub async fn reset_session(&self, session_id: &SessionId) -> Result<String, DialogueError> {
        let removed = self.store.clear_messages(session_id).await?;
        tracing::info!(removed, "Cleared session history");
        Ok(RESET_ACK.to_string())
    }

    async fn load_or_create_profile(
        &self,
        session_id: &SessionId,
        question: &str,
        now: Timestamp,
    ) -> Result<UserProfile, DialogueError> {
        match self.store.find_profile(session_id).await? {
            Some(mut profile) => {
                profile.touch(now);
                self.store.update_profile(&profile).await?;
                Ok(profile)
            }
            None => {
                let profile = UserProfile::new(session_id.clone(), question, now);
                self.store.create_profile(&profile).await?;
                tracing::info!("Created profile for new session");
                Ok(profile)
            }
        }
    }

    async fn escalate(
        &self,
        session_id: &SessionId,
        profile: &UserProfile,
        question: &str,
        now: Timestamp,
    ) -> Result<String, StoreError> {
        let ticket =
            EscalationTicket::new(session_id.clone(), profile.name.as_deref(), question, now);
        self.store.insert_ticket(&ticket).await?;
        tracing::warn!(ticket = %ticket.id, "Escalated unanswerable question");

        Ok(escalation_reply(
            &ticket.user_name,
            question,
            &self.contact.email,
            &self.contact.phone,
        ))
    }

    /// Deletes the oldest rows beyond the retention window.
    ///
    /// Best-effort under concurrency: two racing requests may both observe
    /// the pre-prune count, so the cap is re-established on the next write.
    async fn enforce_retention(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let count = self.store.count_messages(session_id, None).await?;
        if count <= RETENTION_WINDOW as u64 {
            return Ok(());
        }

        let excess = (count - RETENTION_WINDOW as u64) as u32;
        let ids = self.store.oldest_message_ids(session_id, excess).await?;
        let removed = self.store.delete_messages(&ids).await?;
        tracing::debug!(removed, "Pruned retention window");
        Ok(())
    }

    /// Maps an oracle failure to one of the three fixed user-facing replies.
    fn oracle_failure_reply(error: &OracleError) -> String {
        if error.is_connectivity() {
            return CONNECTIVITY_REPLY.to_string();
        }
        if matches!(error, OracleError::AuthenticationFailed) {
            return BAD_KEY_REPLY.to_string();
        }

        let detail: String = error.to_string().chars().take(ERROR_DETAIL_LIMIT).collect();
        format!("❌ An error occurred: {detail}")
    }
}
