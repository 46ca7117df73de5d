//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use dyslexia_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::state::AppState;

/// The verified user behind a request, inserted by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Collects the session tokens a request carries: the `session` cookie
/// first, then an `Authorization: Bearer` header.
pub fn session_tokens(headers: &HeaderMap) -> Vec<&str> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|c| {
                let c = c.trim();
                c.strip_prefix("session=")
            })
        })
        .filter(|token| !token.is_empty());

    let from_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let mut tokens: Vec<&str> = from_cookie.into_iter().collect();
    if let Some(bearer) = from_bearer {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}

/// Middleware that validates the session token and extracts the user_id.
///
/// Candidate tokens are tried in turn. The first valid one inserts an
/// [`AuthUser`] into request extensions for handlers to use. If none is valid,
/// returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let tokens: Vec<String> = session_tokens(req.headers())
        .into_iter()
        .map(str::to_string)
        .collect();
    if tokens.is_empty() {
        return Err(HttpError::unauthorized("authentication required"));
    }

    let mut user_id = None;
    for token in &tokens {
        match state.db.validate_auth_session(token).await {
            Ok(id) => {
                user_id = Some(id);
                break;
            }
            Err(PortError::Unauthorized | PortError::NotFound(_)) => {
                debug!("Rejected unknown or expired session");
            }
            Err(other) => {
                error!("Failed to validate auth session: {:?}", other);
                return Err(HttpError::from(other));
            }
        }
    }

    let user_id =
        user_id.ok_or_else(|| HttpError::unauthorized("session expired or invalid"))?;
    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}
