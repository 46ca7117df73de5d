//! services/api/src/web/router.rs
//!
//! Assembles the full application router: public routes, session-protected
//! routes, and the shared layers.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    ai, auth, dashboard, library, materials, middleware::require_auth, ocr, quizzes,
    rest::{health_handler, ApiDoc},
    sessions, settings,
    state::AppState,
};

pub fn app_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = state.config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/readings", get(materials::list_readings_handler))
        .route("/api/readings/{id}", get(materials::get_reading_handler))
        .route("/api/speakings", get(materials::list_speakings_handler))
        .route("/api/speakings/{id}", get(materials::get_speaking_handler))
        .route("/api/quizzes", get(quizzes::list_quizzes_handler))
        .route("/api/quizzes/{id}", get(quizzes::get_quiz_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/library",
            get(library::list_words_handler).post(library::add_word_handler),
        )
        .route("/api/library/{id}", delete(library::delete_word_handler))
        .route(
            "/api/settings",
            get(settings::get_settings_handler)
                .post(settings::update_settings_handler)
                .put(settings::update_settings_handler),
        )
        .route(
            "/api/settings/display",
            get(settings::get_display_handler).put(settings::update_display_handler),
        )
        .route(
            "/api/settings/audio",
            get(settings::get_audio_handler).put(settings::update_audio_handler),
        )
        .route("/api/dashboard/metrics", get(dashboard::metrics_handler))
        .route("/api/dashboard/recent-reading", get(dashboard::recent_reading_handler))
        .route("/api/dashboard/new-words", get(dashboard::new_words_handler))
        .route("/api/readings", post(materials::create_reading_handler))
        .route(
            "/api/readings/{id}",
            put(materials::update_reading_handler).delete(materials::delete_reading_handler),
        )
        .route("/api/readings/progress", post(materials::reading_progress_handler))
        .route("/api/speakings", post(materials::create_speaking_handler))
        .route(
            "/api/speakings/{id}",
            put(materials::update_speaking_handler).delete(materials::delete_speaking_handler),
        )
        .route("/api/speakings/progress", post(materials::speaking_progress_handler))
        .route(
            "/api/sessions",
            get(sessions::list_sessions_handler).post(sessions::start_session_handler),
        )
        .route("/api/sessions/{id}/end", put(sessions::end_session_handler))
        .route("/api/ocr/upload", post(ocr::upload_handler))
        .route("/api/ocr/files", get(ocr::list_files_handler))
        .route(
            "/api/ocr/files/{id}",
            get(ocr::get_file_handler)
                .put(ocr::update_file_handler)
                .delete(ocr::delete_file_handler),
        )
        .route("/api/quizzes", post(quizzes::create_quiz_handler))
        .route("/api/quizzes/submit", post(quizzes::submit_quiz_handler))
        .route("/api/ai/assess-level", post(ai::assess_level_handler))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let body_limit = state.config.body_limit_bytes;

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
