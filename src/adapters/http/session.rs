//! Cookie-based session identity.
//!
//! Session identity is an opaque per-browser token carried in a cookie,
//! minted automatically on first contact. There is no login: any non-empty
//! token presented by the client is accepted as-is.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::Response;
use std::convert::Infallible;

use crate::domain::foundation::SessionId;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "concierge_session";

/// Extracted session identity.
///
/// `issued` is true when the token was minted for this request; the handler
/// must then attach the Set-Cookie header to the response.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub session_id: SessionId,
    pub issued: bool,
}

impl SessionIdentity {
    /// Attaches the session cookie to a response when it was just minted.
    pub fn apply_cookie(&self, response: &mut Response) {
        if !self.issued {
            return;
        }

        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            self.session_id.as_str()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| {
                let (name, token) = pair.trim().split_once('=')?;
                (name == SESSION_COOKIE).then(|| token.to_string())
            })
            .next();

        match token.and_then(|t| SessionId::new(t).ok()) {
            Some(session_id) => Ok(Self {
                session_id,
                issued: false,
            }),
            None => Ok(Self {
                session_id: SessionId::generate(),
                issued: true,
            }),
        }
    }
}
