//! HTTP adapter - the thin REST surface over the dialogue manager.

mod dto;
mod handlers;
mod routes;
mod session;

pub use dto::{AskRequest, AskResponse, ErrorResponse, ResetResponse};
pub use handlers::{ApiError, AppState};
pub use routes::app_router;
pub use session::{SessionIdentity, SESSION_COOKIE};
