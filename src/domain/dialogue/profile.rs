//! Per-session user profile and the dialogue state derived from it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp};

/// How many characters of the first question are kept for analytics.
const FIRST_QUESTION_LIMIT: usize = 200;

/// Dialogue state for a session, derived from profile fields.
///
/// Derived rather than stored so the profile row stays the single source of
/// truth and the three reachable states can be asserted in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Name unknown and not yet requested.
    New,
    /// Name requested; the next non-greeting input is taken as the name.
    AwaitingName,
    /// Name captured.
    Named,
}

/// One profile per session, created on first contact and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque session token, primary key.
    pub session_id: SessionId,
    /// User's name, unset until captured.
    pub name: Option<String>,
    /// Set once when the name request has been issued; gates re-asking.
    pub name_asked: bool,
    /// When the name request was issued.
    pub name_asked_at: Option<Timestamp>,
    /// When the user provided their name.
    pub name_provided_at: Option<Timestamp>,
    /// First contact time.
    pub first_seen: Timestamp,
    /// Most recent contact time.
    pub last_seen: Timestamp,
    /// Monotonically non-decreasing message counter.
    pub total_messages: i64,
    /// Truncated copy of the session's first question (analytics only).
    pub first_question: Option<String>,
    /// Unique topic labels this session has asked about.
    pub topics_asked: Vec<String>,
}

impl UserProfile {
    /// Creates a profile for a session's first message.
    pub fn new(session_id: SessionId, first_question: &str, now: Timestamp) -> Self {
        Self {
            session_id,
            name: None,
            name_asked: false,
            name_asked_at: None,
            name_provided_at: None,
            first_seen: now,
            last_seen: now,
            total_messages: 0,
            first_question: Some(first_question.chars().take(FIRST_QUESTION_LIMIT).collect()),
            topics_asked: Vec::new(),
        }
    }

    /// Returns the dialogue state implied by the profile fields.
    pub fn state(&self) -> SessionState {
        if self.name.is_some() {
            SessionState::Named
        } else if self.name_asked {
            SessionState::AwaitingName
        } else {
            SessionState::New
        }
    }

    /// Updates `last_seen` for a returning session.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_seen = now;
    }

    /// Marks the name request as issued (New -> AwaitingName).
    pub fn mark_name_asked(&mut self, now: Timestamp) {
        self.name_asked = true;
        self.name_asked_at = Some(now);
    }

    /// Captures the user's name (AwaitingName -> Named).
    ///
    /// The raw input is trimmed and title-cased before storing.
    pub fn record_name(&mut self, raw: &str, now: Timestamp) -> &str {
        self.name = Some(title_case(raw.trim()));
        self.name_asked = false;
        self.name_provided_at = Some(now);
        self.name.as_deref().unwrap_or_default()
    }

    /// Records a completed normal exchange: bumps the counter and adds the
    /// topic to the unique set.
    pub fn record_topic(&mut self, topic: &str) {
        self.total_messages += 1;
        if !self.topics_asked.iter().any(|t| t == topic) {
            self.topics_asked.push(topic.to_string());
        }
    }
}

/// Title-cases a string the way the name capture expects: the first letter of
/// every word is uppercased, the rest lowercased, with any non-alphabetic
/// character acting as a word boundary.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for c in input.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile::new(
            SessionId::new("s1").unwrap(),
            "What is incubation?",
            Timestamp::now(),
        )
    }

    #[test]
    fn fresh_profile_starts_new() {
        let p = profile();
        assert_eq!(p.state(), SessionState::New);
        assert_eq!(p.total_messages, 0);
        assert!(!p.name_asked);
    }

    #[test]
    fn name_request_moves_to_awaiting_name() {
        let mut p = profile();
        p.mark_name_asked(Timestamp::now());
        assert_eq!(p.state(), SessionState::AwaitingName);
        assert!(p.name_asked_at.is_some());
    }

    #[test]
    fn captured_name_moves_to_named_and_clears_flag() {
        let mut p = profile();
        p.mark_name_asked(Timestamp::now());
        let stored = p.record_name("  jane doe  ", Timestamp::now()).to_string();
        assert_eq!(stored, "Jane Doe");
        assert_eq!(p.state(), SessionState::Named);
        assert!(!p.name_asked);
        assert!(p.name_provided_at.is_some());
    }

    #[test]
    fn record_topic_bumps_counter_and_dedupes() {
        let mut p = profile();
        p.record_topic("funding");
        p.record_topic("funding");
        p.record_topic("incubation");
        assert_eq!(p.total_messages, 3);
        assert_eq!(p.topics_asked, vec!["funding", "incubation"]);
    }

    #[test]
    fn first_question_is_truncated() {
        let long = "x".repeat(500);
        let p = UserProfile::new(SessionId::new("s2").unwrap(), &long, Timestamp::now());
        assert_eq!(p.first_question.as_deref().map(str::len), Some(200));
    }

    #[test]
    fn title_case_handles_hyphenated_names() {
        assert_eq!(title_case("anne-marie o'neil"), "Anne-Marie O'Neil");
        assert_eq!(title_case("RAVI"), "Ravi");
    }
}
