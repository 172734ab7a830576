//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::{InvalidSessionId, MessageId, SessionId, TicketId};
pub use timestamp::Timestamp;
