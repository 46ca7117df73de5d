//! services/api/src/web/ai.rs
//!
//! Text difficulty assessment.

use axum::{extract::State, Json};
use dyslexia_core::assessment::assess_by_rules;
use dyslexia_core::domain::LevelAssessment;
use dyslexia_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::error::{ErrorBody, HttpError};
use crate::web::extract::AppJson;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct AssessRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub level: String,
    pub recommended_topic: String,
    pub reason: String,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub difficult_words: Vec<String>,
}

impl From<LevelAssessment> for AssessmentResponse {
    fn from(a: LevelAssessment) -> Self {
        Self {
            level: a.level.to_string(),
            recommended_topic: a.recommended_topic,
            reason: a.reason,
            avg_word_length: a.avg_word_length,
            avg_sentence_length: a.avg_sentence_length,
            difficult_words: a.difficult_words,
        }
    }
}

/// Suggest a level (A1..B2) and topic for a text. Uses the language model
/// when one is configured, and the word/sentence-length rules otherwise or
/// when the model call fails.
#[utoipa::path(
    post,
    path = "/api/ai/assess-level",
    request_body = AssessRequest,
    responses(
        (status = 200, description = "Assessment", body = AssessmentResponse),
        (status = 400, description = "Missing content", body = ErrorBody)
    )
)]
pub async fn assess_level_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AssessRequest>,
) -> Result<Json<AssessmentResponse>, HttpError> {
    let content = validation::required("content", &req.content)?;

    let assessment = match &state.assessor {
        Some(assessor) => match assessor.assess(&content).await {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!("Model assessment failed, using rules: {}", e);
                assess_by_rules(&content)
            }
        },
        None => assess_by_rules(&content),
    };

    Ok(Json(assessment.into()))
}
