//! services/api/src/web/sessions.rs
//!
//! Practice history. Sessions are not tracked as open/closed intervals; the
//! history is the list of recorded progress, and the start/end routes remain
//! only so older clients keep working.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use dyslexia_core::domain::MaterialKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorBody, HttpError};
use crate::web::extract::{AppPath, AppQuery};
use crate::web::materials::ProgressResponse;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct SessionQuery {
    /// `reading`, `speaking`, or absent for both.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionStartedResponse {
    pub message: String,
    pub id: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The user's practice history, newest first.
#[utoipa::path(
    get,
    path = "/api/sessions",
    params(SessionQuery),
    responses(
        (status = 200, description = "Progress history", body = [ProgressResponse]),
        (status = 400, description = "Unknown type", body = ErrorBody)
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppQuery(query): AppQuery<SessionQuery>,
) -> Result<Json<Vec<ProgressResponse>>, HttpError> {
    let kind = match query.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<MaterialKind>().map_err(HttpError::bad_request)?),
        None => None,
    };
    let history = state.db.list_progress(user_id, kind).await?;
    debug!("Loaded {} history entries for user {}", history.len(), user_id);
    Ok(Json(history.into_iter().map(ProgressResponse::from).collect()))
}

/// Accepted for compatibility; nothing is stored.
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses((status = 201, description = "Acknowledged", body = SessionStartedResponse))
)]
pub async fn start_session_handler() -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(SessionStartedResponse {
            message: "Session started".to_string(),
            id: format!("temp_{}", Utc::now().timestamp_millis()),
        }),
    )
}

/// Accepted for compatibility; nothing is stored.
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/end",
    params(("id" = String, Path, description = "Session id returned at start")),
    responses((status = 200, description = "Acknowledged", body = MessageResponse))
)]
pub async fn end_session_handler(AppPath(_id): AppPath<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Session ended".to_string(),
    })
}
