//! Incubation Concierge - document-grounded consultation chatbot backend.
//!
//! Forwards portal questions to a Gemini file-search chat and keeps per-session
//! conversation state (profile, rolling history window, escalation tickets)
//! in PostgreSQL.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
