//! Application layer - use-case orchestration over the ports.

mod dialogue;

pub use dialogue::{DialogueError, DialogueManager, SupportContact};
