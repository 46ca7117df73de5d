//! services/api/src/web/dashboard.rs
//!
//! Summary endpoints for the home screen.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Local, Utc};
use dyslexia_core::domain::MaterialKind;
use dyslexia_core::metrics::DashboardMetrics;
use dyslexia_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::extract::AppQuery;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

const PREVIEW_CHARS: usize = 150;
const DEFAULT_NEW_WORDS: u32 = 3;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total_reading_minutes: u64,
    pub total_speaking_minutes: u64,
    pub completed_sessions: u64,
    pub words_learned: u64,
    pub streak_days: u32,
}

impl From<DashboardMetrics> for MetricsResponse {
    fn from(m: DashboardMetrics) -> Self {
        Self {
            total_reading_minutes: m.total_reading_minutes,
            total_speaking_minutes: m.total_speaking_minutes,
            completed_sessions: m.completed_sessions,
            words_learned: m.words_learned,
            streak_days: m.streak_days,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentReadingResponse {
    pub title: String,
    pub preview: String,
    pub material_id: Option<Uuid>,
    pub last_read_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams)]
pub struct NewWordsQuery {
    /// How many words to return. Defaults to 3.
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct NewWordResponse {
    pub word: String,
    /// Always empty; definitions are not stored.
    pub definition: String,
}

/// First `PREVIEW_CHARS` characters followed by an ellipsis.
fn preview(content: Option<&str>) -> String {
    match content {
        Some(text) if !text.is_empty() => {
            let head: String = text.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        }
        _ => String::new(),
    }
}

/// Reading and speaking time, completed sessions, learned words and the
/// current streak.
#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    responses(
        (status = 200, description = "Dashboard summary", body = MetricsResponse),
        (status = 500, description = "One of the inputs could not be fetched", body = ErrorBody)
    )
)]
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<MetricsResponse>, HttpError> {
    let (reading, speaking, words) = tokio::join!(
        state.db.activity_timestamps(user_id, MaterialKind::Reading),
        state.db.activity_timestamps(user_id, MaterialKind::Speaking),
        state.db.count_words(user_id),
    );

    let (reading, speaking, words) = match (reading, speaking, words) {
        (Ok(r), Ok(s), Ok(w)) => (r, s, w),
        (r, s, w) => {
            error!(
                "Error fetching metrics: reading={:?} speaking={:?} words={:?}",
                r.err(),
                s.err(),
                w.err()
            );
            return Err(HttpError::internal("Failed to fetch metrics"));
        }
    };

    let today = Local::now().date_naive();
    let metrics = DashboardMetrics::compute(&reading, &speaking, words, &Local, today);
    Ok(Json(metrics.into()))
}

/// A preview of the most recently read material.
#[utoipa::path(
    get,
    path = "/api/dashboard/recent-reading",
    responses(
        (status = 200, description = "Latest reading, or a placeholder", body = RecentReadingResponse)
    )
)]
pub async fn recent_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<RecentReadingResponse>, HttpError> {
    let Some(latest) = state.db.latest_progress(user_id, MaterialKind::Reading).await? else {
        return Ok(Json(RecentReadingResponse {
            title: "Chào mừng!".to_string(),
            preview: "Hãy bắt đầu bài đọc đầu tiên của bạn.".to_string(),
            material_id: None,
            last_read_at: None,
        }));
    };

    match state.db.get_material(MaterialKind::Reading, latest.material_id).await {
        Ok(material) => Ok(Json(RecentReadingResponse {
            title: material.title,
            preview: preview(material.content.as_deref()),
            material_id: Some(material.id),
            last_read_at: Some(latest.created_at),
        })),
        Err(PortError::NotFound(_)) => Ok(Json(RecentReadingResponse {
            title: "Bài đọc không tồn tại".to_string(),
            preview: "Bài đọc này có thể đã bị xóa.".to_string(),
            material_id: None,
            last_read_at: Some(latest.created_at),
        })),
        Err(e) => Err(e.into()),
    }
}

/// The most recently added library words.
#[utoipa::path(
    get,
    path = "/api/dashboard/new-words",
    params(NewWordsQuery),
    responses((status = 200, description = "Newest words", body = [NewWordResponse]))
)]
pub async fn new_words_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppQuery(query): AppQuery<NewWordsQuery>,
) -> Result<Json<Vec<NewWordResponse>>, HttpError> {
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_NEW_WORDS);
    let words = state.db.recent_words(user_id, limit).await?;
    Ok(Json(
        words
            .into_iter()
            .map(|w| NewWordResponse {
                word: w.text,
                definition: String::new(),
            })
            .collect(),
    ))
}
