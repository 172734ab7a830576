//! Dialogue domain: session profiles, greetings, topic tagging, the rolling
//! message window, and escalation rules.

mod context;
mod escalation;
mod greeting;
mod knowledge;
mod message;
mod profile;
mod topic;

pub use context::{contextualize, render_history};
pub use escalation::{escalation_reply, is_no_answer, EscalationTicket, TicketStatus};
pub use greeting::{contextual_greeting, is_greeting};
pub use knowledge::KnowledgeSource;
pub use message::{ChatMessage, RETENTION_WINDOW};
pub use profile::{title_case, SessionState, UserProfile};
pub use topic::{classify, GENERAL_TOPIC, GREETING_TOPIC};
