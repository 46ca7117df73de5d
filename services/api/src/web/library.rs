//! services/api/src/web/library.rs
//!
//! The user's vocabulary library.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use dyslexia_core::domain::{LibraryWord, WordFilter};
use dyslexia_core::ports::PortError;
use dyslexia_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::middleware::AuthUser;
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct WordQuery {
    /// Substring match on the word.
    pub search: Option<String>,
    /// Prefix match on the word.
    pub letter: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddWordRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordResponse {
    pub id: Uuid,
    pub text: String,
    pub pronunciation_url: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl From<LibraryWord> for WordResponse {
    fn from(word: LibraryWord) -> Self {
        Self {
            id: word.id,
            text: word.text,
            pronunciation_url: word.pronunciation_url,
            date_added: word.created_at,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// List the signed-in user's words, newest first.
#[utoipa::path(
    get,
    path = "/api/library",
    params(WordQuery),
    responses(
        (status = 200, description = "Words in the library", body = [WordResponse]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_words_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppQuery(query): AppQuery<WordQuery>,
) -> Result<Json<Vec<WordResponse>>, HttpError> {
    let filter = WordFilter {
        search: non_blank(query.search),
        letter: non_blank(query.letter),
    };
    let words = state.db.list_words(user_id, &filter).await?;
    Ok(Json(words.into_iter().map(WordResponse::from).collect()))
}

/// Add a word to the library.
#[utoipa::path(
    post,
    path = "/api/library",
    request_body = AddWordRequest,
    responses(
        (status = 201, description = "Word added", body = WordResponse),
        (status = 400, description = "Empty or longer than 15 characters", body = ErrorBody),
        (status = 409, description = "Word already in the library", body = ErrorBody)
    )
)]
pub async fn add_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<AddWordRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let text = validation::library_word(&req.text)?;

    if state.db.find_word(user_id, &text).await?.is_some() {
        return Err(PortError::Conflict("word already exists".to_string()).into());
    }

    let word = state.db.add_word(user_id, &text).await?;
    info!("User {} added word {}", user_id, word.id);
    Ok((StatusCode::CREATED, Json(WordResponse::from(word))))
}

/// Remove a word from the library.
#[utoipa::path(
    delete,
    path = "/api/library/{id}",
    params(("id" = Uuid, Path, description = "Word id")),
    responses(
        (status = 204, description = "Word removed"),
        (status = 403, description = "Word belongs to another user", body = ErrorBody),
        (status = 404, description = "Word not found", body = ErrorBody)
    )
)]
pub async fn delete_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppPath(word_id): AppPath<Uuid>,
) -> Result<StatusCode, HttpError> {
    let word = state.db.get_word(word_id).await?;
    if word.user_id != user_id {
        return Err(HttpError::forbidden());
    }
    state.db.delete_word(word_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
