//! services/api/src/web/settings.rs
//!
//! Display and audio preferences. Every accepted field is listed explicitly;
//! unknown fields are rejected rather than merged into the stored row.

use axum::{extract::State, Extension, Json};
use dyslexia_core::settings::{
    AudioPatch, AudioSettings, ColorTheme, DisplayPatch, DisplaySettings, SettingsPatch,
    UserSettings,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::middleware::AuthUser;
use crate::web::extract::AppJson;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl From<Theme> for ColorTheme {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => ColorTheme::Light,
            Theme::Dark => ColorTheme::Dark,
            Theme::System => ColorTheme::System,
        }
    }
}

impl From<ColorTheme> for Theme {
    fn from(theme: ColorTheme) -> Self {
        match theme {
            ColorTheme::Light => Theme::Light,
            ColorTheme::Dark => Theme::Dark,
            ColorTheme::System => Theme::System,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplayPatchRequest {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_spacing: Option<f64>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AudioPatchRequest {
    pub voice: Option<String>,
    pub speech_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatchRequest {
    #[serde(default)]
    pub display: DisplayPatchRequest,
    #[serde(default)]
    pub audio: AudioPatchRequest,
}

impl From<DisplayPatchRequest> for DisplayPatch {
    fn from(req: DisplayPatchRequest) -> Self {
        Self {
            font_family: req.font_family.map(|s| s.trim().to_string()),
            font_size: req.font_size,
            letter_spacing: req.letter_spacing,
            line_spacing: req.line_spacing,
            theme: req.theme.map(ColorTheme::from),
        }
    }
}

impl From<AudioPatchRequest> for AudioPatch {
    fn from(req: AudioPatchRequest) -> Self {
        Self {
            voice: req.voice.map(|s| s.trim().to_string()),
            speech_rate: req.speech_rate,
            pitch: req.pitch,
            volume: req.volume,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResponse {
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub line_spacing: f64,
    pub theme: Theme,
}

impl From<DisplaySettings> for DisplayResponse {
    fn from(d: DisplaySettings) -> Self {
        Self {
            font_family: d.font_family,
            font_size: d.font_size,
            letter_spacing: d.letter_spacing,
            line_spacing: d.line_spacing,
            theme: d.theme.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioResponse {
    pub voice: String,
    pub speech_rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl From<AudioSettings> for AudioResponse {
    fn from(a: AudioSettings) -> Self {
        Self {
            voice: a.voice,
            speech_rate: a.speech_rate,
            pitch: a.pitch,
            volume: a.volume,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SettingsResponse {
    pub display: DisplayResponse,
    pub audio: AudioResponse,
}

impl From<UserSettings> for SettingsResponse {
    fn from(s: UserSettings) -> Self {
        Self {
            display: s.display.into(),
            audio: s.audio.into(),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

async fn load(state: &AppState, user_id: Uuid) -> Result<UserSettings, HttpError> {
    Ok(state.db.get_settings(user_id).await?.unwrap_or_default())
}

/// Validates `patch`, merges it over the stored settings and upserts the result.
async fn apply(state: &AppState, user_id: Uuid, patch: SettingsPatch) -> Result<UserSettings, HttpError> {
    patch.validate()?;
    let mut settings = load(state, user_id).await?;
    settings.merge(patch);
    debug!("Saving settings for user {}", user_id);
    Ok(state.db.upsert_settings(user_id, &settings).await?)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Read the user's settings, falling back to defaults.
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Current settings", body = SettingsResponse))
)]
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<SettingsResponse>, HttpError> {
    Ok(Json(load(&state, user_id).await?.into()))
}

/// Merge a partial update into the user's settings.
#[utoipa::path(
    post,
    path = "/api/settings",
    request_body = SettingsPatchRequest,
    responses(
        (status = 200, description = "Merged settings", body = SettingsResponse),
        (status = 400, description = "Invalid value", body = ErrorBody)
    )
)]
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<SettingsPatchRequest>,
) -> Result<Json<SettingsResponse>, HttpError> {
    let patch = SettingsPatch {
        display: req.display.into(),
        audio: req.audio.into(),
    };
    Ok(Json(apply(&state, user_id, patch).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/settings/display",
    responses((status = 200, description = "Display settings", body = DisplayResponse))
)]
pub async fn get_display_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<DisplayResponse>, HttpError> {
    Ok(Json(load(&state, user_id).await?.display.into()))
}

#[utoipa::path(
    put,
    path = "/api/settings/display",
    request_body = DisplayPatchRequest,
    responses(
        (status = 200, description = "Merged display settings", body = DisplayResponse),
        (status = 400, description = "Invalid value", body = ErrorBody)
    )
)]
pub async fn update_display_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<DisplayPatchRequest>,
) -> Result<Json<DisplayResponse>, HttpError> {
    let patch = SettingsPatch {
        display: req.into(),
        audio: AudioPatch::default(),
    };
    Ok(Json(apply(&state, user_id, patch).await?.display.into()))
}

#[utoipa::path(
    get,
    path = "/api/settings/audio",
    responses((status = 200, description = "Audio settings", body = AudioResponse))
)]
pub async fn get_audio_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<AudioResponse>, HttpError> {
    Ok(Json(load(&state, user_id).await?.audio.into()))
}

#[utoipa::path(
    put,
    path = "/api/settings/audio",
    request_body = AudioPatchRequest,
    responses(
        (status = 200, description = "Merged audio settings", body = AudioResponse),
        (status = 400, description = "Invalid value", body = ErrorBody)
    )
)]
pub async fn update_audio_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<AudioPatchRequest>,
) -> Result<Json<AudioResponse>, HttpError> {
    let patch = SettingsPatch {
        display: DisplayPatch::default(),
        audio: req.into(),
    };
    Ok(Json(apply(&state, user_id, patch).await?.audio.into()))
}
