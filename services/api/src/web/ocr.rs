//! services/api/src/web/ocr.rs
//!
//! Document import. Uploads arrive as base64 JSON; office documents are read
//! locally and images are forwarded to the OCR service. The extracted text is
//! stored per user so it can be reopened, renamed and edited later.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use dyslexia_core::domain::{NewOcrImport, OcrImport, OcrImportUpdate, OcrStatus};
use dyslexia_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::adapters::documents::{extract_text, DocumentKind};
use crate::error::{ErrorBody, HttpError};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_name: String,
    /// Base64 file contents. A `data:<mime>;base64,` prefix is accepted.
    #[serde(default)]
    pub file_data: String,
    pub file_type: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrFileResponse {
    pub id: Uuid,
    pub file_name: String,
    pub content: String,
    pub status: String,
    pub tts_ready: bool,
    pub created_at: DateTime<Utc>,
}

impl From<OcrImport> for OcrFileResponse {
    fn from(i: OcrImport) -> Self {
        Self {
            id: i.id,
            file_name: i.file_name,
            content: i.content,
            status: i.status.as_str().to_string(),
            tts_ready: i.tts_ready,
            created_at: i.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrFileSummary {
    pub id: Uuid,
    pub file_name: String,
    pub tts_ready: bool,
    pub created_at: DateTime<Utc>,
}

impl From<OcrImport> for OcrFileSummary {
    fn from(i: OcrImport) -> Self {
        Self {
            id: i.id,
            file_name: i.file_name,
            tts_ready: i.tts_ready,
            created_at: i.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file: OcrFileResponse,
    pub extracted_text: String,
}

#[derive(Deserialize, IntoParams)]
pub struct FileQuery {
    /// Substring of the file name.
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateFileRequest {
    /// New file name.
    pub name: Option<String>,
    /// Replacement text. Blank text leaves the stored text untouched.
    pub content: Option<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn decode_payload(raw: &str) -> Result<Vec<u8>, HttpError> {
    let data = validation::required("fileData", raw)?;
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data.as_str(),
    };
    STANDARD
        .decode(encoded)
        .map_err(|e| HttpError::bad_request(format!("fileData is not valid base64: {}", e)))
}

/// Loads an import and checks that `user_id` owns it.
async fn owned_import(state: &AppState, user_id: Uuid, id: Uuid) -> Result<OcrImport, HttpError> {
    let import = state.db.get_ocr_import(id).await?;
    if import.user_id != user_id {
        return Err(HttpError::forbidden());
    }
    Ok(import)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Extract text from an uploaded document or image and store it.
#[utoipa::path(
    post,
    path = "/api/ocr/upload",
    request_body = UploadRequest,
    responses(
        (status = 201, description = "Text extracted and stored", body = UploadResponse),
        (status = 400, description = "Bad name, payload or file type", body = ErrorBody),
        (status = 503, description = "OCR service unreachable", body = ErrorBody)
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<UploadRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let file_name = validation::file_name(&req.file_name)?;
    let bytes = decode_payload(&req.file_data)?;
    let file_type = req.file_type.as_deref().filter(|t| !t.is_empty());

    let kind = DocumentKind::detect(&file_name, file_type)
        .ok_or_else(|| HttpError::bad_request("unsupported file type"))?;

    let text = match kind {
        DocumentKind::Docx | DocumentKind::Pdf => {
            tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
                .await
                .map_err(|e| {
                    error!("Text extraction task failed: {:?}", e);
                    HttpError::internal("Failed to process file")
                })??
        }
        DocumentKind::Image => {
            let content_type = DocumentKind::image_content_type(&file_name, file_type);
            state.ocr.recognize(&file_name, &content_type, bytes).await?
        }
    };

    let import = state
        .db
        .create_ocr_import(NewOcrImport {
            user_id,
            file_name,
            content: text.clone(),
            status: OcrStatus::Processed,
        })
        .await?;
    info!("User {} imported file {} ({:?})", user_id, import.id, kind);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file: import.into(),
            extracted_text: text,
        }),
    ))
}

/// List the user's imported files, newest first.
#[utoipa::path(
    get,
    path = "/api/ocr/files",
    params(FileQuery),
    responses((status = 200, description = "Imported files", body = [OcrFileSummary]))
)]
pub async fn list_files_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppQuery(query): AppQuery<FileQuery>,
) -> Result<Json<Vec<OcrFileSummary>>, HttpError> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let files = state.db.list_ocr_imports(user_id, search).await?;
    Ok(Json(files.into_iter().map(OcrFileSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/ocr/files/{id}",
    params(("id" = Uuid, Path, description = "Import id")),
    responses(
        (status = 200, description = "The import", body = OcrFileResponse),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "No such import", body = ErrorBody)
    )
)]
pub async fn get_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<OcrFileResponse>, HttpError> {
    Ok(Json(owned_import(&state, user_id, id).await?.into()))
}

/// Rename an import or replace its text.
#[utoipa::path(
    put,
    path = "/api/ocr/files/{id}",
    params(("id" = Uuid, Path, description = "Import id")),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "Updated import", body = OcrFileResponse),
        (status = 400, description = "Empty or longer than 50 characters", body = ErrorBody),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "No such import", body = ErrorBody)
    )
)]
pub async fn update_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateFileRequest>,
) -> Result<Json<OcrFileResponse>, HttpError> {
    let file_name = match req.name {
        Some(name) => Some(validation::file_name(&name)?),
        None => None,
    };
    owned_import(&state, user_id, id).await?;

    let updated = state
        .db
        .update_ocr_import(
            id,
            OcrImportUpdate {
                file_name,
                content: req.content.filter(|c| !c.trim().is_empty()),
            },
        )
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/ocr/files/{id}",
    params(("id" = Uuid, Path, description = "Import id")),
    responses(
        (status = 204, description = "Import deleted"),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "No such import", body = ErrorBody)
    )
)]
pub async fn delete_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, HttpError> {
    owned_import(&state, user_id, id).await?;
    state.db.delete_ocr_import(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_prefix_is_stripped() {
        assert_eq!(decode_payload("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert_eq!(decode_payload("aGk=").unwrap(), b"hi");
    }

    #[test]
    fn invalid_base64_is_a_bad_request() {
        let err = decode_payload("not base64!").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let err = decode_payload("   ").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
