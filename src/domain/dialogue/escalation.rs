//! No-answer detection and the human escalation path.
//!
//! When the oracle signals that the corpus does not cover a question, the
//! reply is replaced by contact instructions (a prefilled mailto link and a
//! phone number) and the question is recorded as a pending ticket.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, TicketId, Timestamp};

/// Phrases that mark an oracle answer as "no information in the corpus".
///
/// Case-insensitive substring match against the answer text.
const NO_INFO_PHRASES: [&str; 5] = [
    "does not contain information",
    "does not specify",
    "not specified",
    "not available in the document",
    "no information provided",
];

/// Name used in the escalation email when the session has none on file.
const FALLBACK_NAME: &str = "User";

/// Returns true if the answer text signals an unanswerable question.
pub fn is_no_answer(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    NO_INFO_PHRASES.iter().any(|phrase| answer.contains(phrase))
}

/// Ticket status. Tickets are created pending and resolved out-of-band by
/// the support team; no transition is exposed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
}

impl TicketStatus {
    /// Returns the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
        }
    }
}

/// Record of a question routed to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTicket {
    pub id: TicketId,
    pub session_id: SessionId,
    pub user_name: String,
    pub question: String,
    pub status: TicketStatus,
    pub created_at: Timestamp,
}

impl EscalationTicket {
    /// Creates a pending ticket, substituting a generic name when the
    /// session never provided one.
    pub fn new(
        session_id: SessionId,
        user_name: Option<&str>,
        question: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: TicketId::new(),
            session_id,
            user_name: user_name.unwrap_or(FALLBACK_NAME).to_string(),
            question: question.into(),
            status: TicketStatus::Pending,
            created_at,
        }
    }
}

/// Builds the user-facing escalation reply: lightweight HTML with a
/// URL-encoded mailto link and the support phone number.
pub fn escalation_reply(
    user_name: &str,
    question: &str,
    support_email: &str,
    support_phone: &str,
) -> String {
    let subject = "Assistance Required – RPF Query";
    let body = format!(
        "Dear SPPU-RPF Support Team,\n\n\
         My name is {user_name}.\n\n\
         I have the following query:\n\n\
         \"{question}\"\n\n\
         I request guidance from the relevant stream expert or consultant.\n\n\
         Regards,\n\
         {user_name}\n"
    );

    let mailto = format!(
        "mailto:{support_email}?subject={}&body={}",
        urlencoding::encode(subject),
        urlencoding::encode(&body)
    );

    format!(
        "\n⚠️ This query requires expert assistance.<br><br>\n\n\
         You can directly contact our support team:<br><br>\n\n\
         📧 <a href=\"{mailto}\" style=\"color:#4da6ff; font-weight:bold;\">\n\
         {support_email}\n\
         </a><br><br>\n\n\
         📞 Contact No: <b>{support_phone}</b>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_info_phrases_match_as_substrings() {
        assert!(is_no_answer(
            "The document does NOT contain information about parking."
        ));
        assert!(is_no_answer("This is Not Specified in the provided material."));
        assert!(is_no_answer("There is no information provided on that topic."));
    }

    #[test]
    fn ordinary_answers_are_not_flagged() {
        assert!(!is_no_answer("Incubation support runs for 12 months."));
        assert!(!is_no_answer(""));
    }

    #[test]
    fn ticket_defaults_to_pending_with_fallback_name() {
        let ticket = EscalationTicket::new(
            SessionId::new("s1").unwrap(),
            None,
            "parking?",
            Timestamp::now(),
        );
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(ticket.user_name, "User");
        assert_eq!(ticket.status.as_str(), "pending");
    }

    #[test]
    fn reply_contains_encoded_mailto_and_phone() {
        let reply = escalation_reply(
            "Ravi",
            "Is parking available?",
            "support@example.org",
            "+91 11111 22222",
        );
        assert!(reply.contains("mailto:support@example.org?subject=Assistance%20Required"));
        assert!(reply.contains("%22Is%20parking%20available%3F%22"));
        assert!(reply.contains("<b>+91 11111 22222</b>"));
        // Raw question must not leak unencoded into the href.
        assert!(!reply.contains("body=Dear SPPU"));
    }
}
