//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpOcrAdapter, OpenAiAssessAdapter},
    config::Config,
    error::ApiError,
    web::{app_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use dyslexia_core::ports::LevelAssessmentService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.ocr_timeout_secs))
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let ocr_adapter = Arc::new(HttpOcrAdapter::new(
        http_client,
        config.ocr_service_url.clone(),
    ));

    let assessor: Option<Arc<dyn LevelAssessmentService>> = match &config.openai_api_key {
        Some(key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            info!("Level assessment will use model {}", config.assess_model);
            Some(Arc::new(OpenAiAssessAdapter::new(
                openai_client,
                config.assess_model.clone(),
            )))
        }
        None => {
            warn!("OPENAI_API_KEY not set; level assessment will use the rule-based fallback");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        ocr: ocr_adapter,
        assessor,
    });

    // --- 5. Create the Web Router ---
    let app = app_router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
