//! Ports - trait boundaries between the dialogue core and its collaborators.

mod answer_oracle;
mod conversation_store;

pub use answer_oracle::{AnswerOracle, OracleError};
pub use conversation_store::{ConversationStore, StoreError};
