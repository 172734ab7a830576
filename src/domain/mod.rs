//! Domain layer - dialogue state, classification, and escalation rules.

pub mod dialogue;
pub mod foundation;
