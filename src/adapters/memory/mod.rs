//! In-memory persistence adapter (tests and local development).

mod conversation_store;

pub use conversation_store::InMemoryConversationStore;
