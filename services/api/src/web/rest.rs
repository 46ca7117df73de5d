//! services/api/src/web/rest.rs
//!
//! The health probe and the master definition for the OpenAPI specification.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::error::ErrorBody;
use crate::web::{ai, auth, dashboard, library, materials, ocr, quizzes, sessions, settings};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        library::list_words_handler,
        library::add_word_handler,
        library::delete_word_handler,
        settings::get_settings_handler,
        settings::update_settings_handler,
        settings::get_display_handler,
        settings::update_display_handler,
        settings::get_audio_handler,
        settings::update_audio_handler,
        dashboard::metrics_handler,
        dashboard::recent_reading_handler,
        dashboard::new_words_handler,
        materials::list_readings_handler,
        materials::get_reading_handler,
        materials::create_reading_handler,
        materials::update_reading_handler,
        materials::delete_reading_handler,
        materials::reading_progress_handler,
        materials::list_speakings_handler,
        materials::get_speaking_handler,
        materials::create_speaking_handler,
        materials::update_speaking_handler,
        materials::delete_speaking_handler,
        materials::speaking_progress_handler,
        sessions::list_sessions_handler,
        sessions::start_session_handler,
        sessions::end_session_handler,
        ocr::upload_handler,
        ocr::list_files_handler,
        ocr::get_file_handler,
        ocr::update_file_handler,
        ocr::delete_file_handler,
        quizzes::list_quizzes_handler,
        quizzes::get_quiz_handler,
        quizzes::create_quiz_handler,
        quizzes::submit_quiz_handler,
        ai::assess_level_handler,
    ),
    components(
        schemas(
            ErrorBody,
            HealthResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UserResponse,
            auth::AuthResponse,
            auth::LogoutResponse,
            library::AddWordRequest,
            library::WordResponse,
            settings::Theme,
            settings::DisplayPatchRequest,
            settings::AudioPatchRequest,
            settings::SettingsPatchRequest,
            settings::DisplayResponse,
            settings::AudioResponse,
            settings::SettingsResponse,
            dashboard::MetricsResponse,
            dashboard::RecentReadingResponse,
            dashboard::NewWordResponse,
            materials::MaterialResponse,
            materials::CreateMaterialRequest,
            materials::UpdateMaterialRequest,
            materials::ProgressRequest,
            materials::ProgressResponse,
            sessions::SessionStartedResponse,
            sessions::MessageResponse,
            ocr::UploadRequest,
            ocr::UploadResponse,
            ocr::OcrFileResponse,
            ocr::OcrFileSummary,
            ocr::UpdateFileRequest,
            quizzes::QuestionDto,
            quizzes::QuizResponse,
            quizzes::CreateQuizRequest,
            quizzes::SubmitRequest,
            quizzes::QuizResultResponse,
            quizzes::SubmitResponse,
            ai::AssessRequest,
            ai::AssessmentResponse,
        )
    ),
    modifiers(&SessionAuth),
    tags(
        (name = "Dyslexia Backend API", description = "Reading and speaking practice, vocabulary, OCR import and settings.")
    )
)]
pub struct ApiDoc;

/// Documents the two ways a session token can be presented.
struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub time: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: "dyslexia-backend".to_string(),
        time: Utc::now(),
    })
}
