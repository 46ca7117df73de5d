//! services/api/src/web/materials.rs
//!
//! Reading and speaking practice materials, and the progress records users
//! append while working through them. Both kinds share one set of handlers;
//! the thin per-kind wrappers exist so each route gets its own OpenAPI entry.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use dyslexia_core::domain::{
    Level, Material, MaterialFilter, MaterialKind, MaterialUpdate, NewMaterial, NewProgress,
    ProgressRecord,
};
use dyslexia_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct MaterialQuery {
    /// `A1`..`B2`, or `All` for no filter.
    pub level: Option<String>,
    pub topic: Option<String>,
    /// Case-insensitive substring of the title or topic.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResponse {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub level: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Material> for MaterialResponse {
    fn from(m: Material) -> Self {
        Self {
            id: m.id,
            title: m.title,
            topic: m.topic,
            level: m.level.to_string(),
            content: m.content,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateMaterialRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateMaterialRequest {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub level: Option<String>,
    pub content: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub material_id: Uuid,
    pub percent: f64,
    /// Free-form analysis produced by speaking practice.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub analysis: Option<serde_json::Value>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub material_id: Uuid,
    pub material_title: Option<String>,
    pub percent: f64,
    #[schema(value_type = Option<Object>)]
    pub analysis: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ProgressRecord> for ProgressResponse {
    fn from(p: ProgressRecord) -> Self {
        Self {
            id: p.id,
            kind: p.kind.as_str().to_string(),
            material_id: p.material_id,
            material_title: p.material_title,
            percent: p.percent,
            analysis: p
                .analysis
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            created_at: p.created_at,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `All` (or nothing) means every level.
fn level_filter(raw: Option<String>) -> Result<Option<Level>, HttpError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s
            .parse::<Level>()
            .map(Some)
            .map_err(|e| HttpError::bad_request(e.to_string())),
    }
}

fn parse_level(raw: &str) -> Result<Level, HttpError> {
    let raw = validation::required("level", raw)?;
    raw.parse::<Level>()
        .map_err(|e| HttpError::bad_request(e.to_string()))
}

//=========================================================================================
// Shared Handlers
//=========================================================================================

async fn list(
    state: &AppState,
    kind: MaterialKind,
    query: MaterialQuery,
) -> Result<Json<Vec<MaterialResponse>>, HttpError> {
    let filter = MaterialFilter {
        level: level_filter(query.level)?,
        topic: non_blank(query.topic),
        search: non_blank(query.search),
    };
    let materials = state.db.list_materials(kind, &filter).await?;
    Ok(Json(materials.into_iter().map(MaterialResponse::from).collect()))
}

async fn get(state: &AppState, kind: MaterialKind, id: Uuid) -> Result<Json<MaterialResponse>, HttpError> {
    Ok(Json(state.db.get_material(kind, id).await?.into()))
}

async fn create(
    state: &AppState,
    kind: MaterialKind,
    req: CreateMaterialRequest,
) -> Result<(StatusCode, Json<MaterialResponse>), HttpError> {
    let title = validation::required("title", &req.title)?;
    let level = parse_level(&req.level)?;
    let material = state
        .db
        .create_material(
            kind,
            NewMaterial {
                title,
                topic: non_blank(req.topic).unwrap_or_default(),
                level,
                content: req.content,
            },
        )
        .await?;
    info!("Created {} material {}", kind.as_str(), material.id);
    Ok((StatusCode::CREATED, Json(material.into())))
}

async fn update(
    state: &AppState,
    kind: MaterialKind,
    id: Uuid,
    req: UpdateMaterialRequest,
) -> Result<Json<MaterialResponse>, HttpError> {
    let title = match req.title {
        Some(title) => Some(validation::required("title", &title)?),
        None => None,
    };
    let level = match req.level {
        Some(level) => Some(parse_level(&level)?),
        None => None,
    };
    let update = MaterialUpdate {
        title,
        topic: req.topic.map(|t| t.trim().to_string()),
        level,
        content: req.content,
    };
    Ok(Json(state.db.update_material(kind, id, update).await?.into()))
}

async fn delete(state: &AppState, kind: MaterialKind, id: Uuid) -> Result<StatusCode, HttpError> {
    state.db.delete_material(kind, id).await?;
    info!("Deleted {} material {}", kind.as_str(), id);
    Ok(StatusCode::NO_CONTENT)
}

async fn progress(
    state: &AppState,
    kind: MaterialKind,
    user_id: Uuid,
    req: ProgressRequest,
) -> Result<(StatusCode, Json<ProgressResponse>), HttpError> {
    let percent = validation::percent("percent", req.percent)?;
    // The material must exist; a missing one surfaces as 404.
    state.db.get_material(kind, req.material_id).await?;

    let record = state
        .db
        .record_progress(NewProgress {
            user_id,
            kind,
            material_id: req.material_id,
            percent,
            analysis: req.analysis.map(|v| v.to_string()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

//=========================================================================================
// Readings
//=========================================================================================

/// List reading materials.
#[utoipa::path(
    get,
    path = "/api/readings",
    params(MaterialQuery),
    responses(
        (status = 200, description = "Matching readings", body = [MaterialResponse]),
        (status = 400, description = "Unknown level", body = ErrorBody)
    )
)]
pub async fn list_readings_handler(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<MaterialQuery>,
) -> Result<Json<Vec<MaterialResponse>>, HttpError> {
    list(&state, MaterialKind::Reading, query).await
}

#[utoipa::path(
    get,
    path = "/api/readings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "The reading", body = MaterialResponse),
        (status = 404, description = "No such reading", body = ErrorBody)
    )
)]
pub async fn get_reading_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MaterialResponse>, HttpError> {
    get(&state, MaterialKind::Reading, id).await
}

#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Reading created", body = MaterialResponse),
        (status = 400, description = "Missing title or level", body = ErrorBody)
    )
)]
pub async fn create_reading_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateMaterialRequest>,
) -> Result<impl IntoResponse, HttpError> {
    create(&state, MaterialKind::Reading, req).await
}

#[utoipa::path(
    put,
    path = "/api/readings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Reading updated", body = MaterialResponse),
        (status = 404, description = "No such reading", body = ErrorBody)
    )
)]
pub async fn update_reading_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateMaterialRequest>,
) -> Result<Json<MaterialResponse>, HttpError> {
    update(&state, MaterialKind::Reading, id, req).await
}

#[utoipa::path(
    delete,
    path = "/api/readings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 404, description = "No such reading", body = ErrorBody)
    )
)]
pub async fn delete_reading_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, HttpError> {
    delete(&state, MaterialKind::Reading, id).await
}

/// Record how far the user got through a reading.
#[utoipa::path(
    post,
    path = "/api/readings/progress",
    request_body = ProgressRequest,
    responses(
        (status = 201, description = "Progress recorded", body = ProgressResponse),
        (status = 400, description = "Percent outside 0..=100", body = ErrorBody),
        (status = 404, description = "No such reading", body = ErrorBody)
    )
)]
pub async fn reading_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<ProgressRequest>,
) -> Result<impl IntoResponse, HttpError> {
    progress(&state, MaterialKind::Reading, user_id, req).await
}

//=========================================================================================
// Speakings
//=========================================================================================

/// List speaking materials.
#[utoipa::path(
    get,
    path = "/api/speakings",
    params(MaterialQuery),
    responses(
        (status = 200, description = "Matching speaking texts", body = [MaterialResponse]),
        (status = 400, description = "Unknown level", body = ErrorBody)
    )
)]
pub async fn list_speakings_handler(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<MaterialQuery>,
) -> Result<Json<Vec<MaterialResponse>>, HttpError> {
    list(&state, MaterialKind::Speaking, query).await
}

#[utoipa::path(
    get,
    path = "/api/speakings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "The speaking text", body = MaterialResponse),
        (status = 404, description = "No such speaking text", body = ErrorBody)
    )
)]
pub async fn get_speaking_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MaterialResponse>, HttpError> {
    get(&state, MaterialKind::Speaking, id).await
}

#[utoipa::path(
    post,
    path = "/api/speakings",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Speaking text created", body = MaterialResponse),
        (status = 400, description = "Missing title or level", body = ErrorBody)
    )
)]
pub async fn create_speaking_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateMaterialRequest>,
) -> Result<impl IntoResponse, HttpError> {
    create(&state, MaterialKind::Speaking, req).await
}

#[utoipa::path(
    put,
    path = "/api/speakings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Speaking text updated", body = MaterialResponse),
        (status = 404, description = "No such speaking text", body = ErrorBody)
    )
)]
pub async fn update_speaking_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateMaterialRequest>,
) -> Result<Json<MaterialResponse>, HttpError> {
    update(&state, MaterialKind::Speaking, id, req).await
}

#[utoipa::path(
    delete,
    path = "/api/speakings/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 204, description = "Speaking text deleted"),
        (status = 404, description = "No such speaking text", body = ErrorBody)
    )
)]
pub async fn delete_speaking_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, HttpError> {
    delete(&state, MaterialKind::Speaking, id).await
}

/// Record a speaking attempt, optionally with its analysis.
#[utoipa::path(
    post,
    path = "/api/speakings/progress",
    request_body = ProgressRequest,
    responses(
        (status = 201, description = "Progress recorded", body = ProgressResponse),
        (status = 400, description = "Percent outside 0..=100", body = ErrorBody),
        (status = 404, description = "No such speaking text", body = ErrorBody)
    )
)]
pub async fn speaking_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<ProgressRequest>,
) -> Result<impl IntoResponse, HttpError> {
    progress(&state, MaterialKind::Speaking, user_id, req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_level_means_no_filter() {
        assert_eq!(level_filter(Some("All".into())).unwrap(), None);
        assert_eq!(level_filter(Some("  ".into())).unwrap(), None);
        assert_eq!(level_filter(None).unwrap(), None);
        assert_eq!(level_filter(Some("b1".into())).unwrap(), Some(Level::B1));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = level_filter(Some("C1".into())).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
