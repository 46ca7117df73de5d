//! services/api/src/web/quizzes.rs
//!
//! Quiz catalogue and answer submission.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use dyslexia_core::domain::{Level, NewQuiz, NewQuizResult, Quiz, QuizQuestion, QuizResult};
use dyslexia_core::quiz::score_answers;
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
pub struct QuizQuery {
    /// Matches the quiz type, e.g. `phonics_recognition`.
    pub skill: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl From<QuizQuestion> for QuestionDto {
    fn from(q: QuizQuestion) -> Self {
        Self {
            prompt: q.prompt,
            options: q.options,
            correct_answer: q.correct_answer,
        }
    }
}

impl From<QuestionDto> for QuizQuestion {
    fn from(q: QuestionDto) -> Self {
        Self {
            prompt: q.prompt,
            options: q.options,
            correct_answer: q.correct_answer,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub quiz_type: String,
    pub level: Option<String>,
    pub questions: Vec<QuestionDto>,
    pub created_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(q: Quiz) -> Self {
        Self {
            id: q.id,
            title: q.title,
            quiz_type: q.quiz_type,
            level: q.level.map(|l| l.to_string()),
            questions: q.questions.into_iter().map(QuestionDto::from).collect(),
            created_at: q.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub quiz_type: String,
    pub level: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDto>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub quiz_id: String,
    pub answers: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub answers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<QuizResult> for QuizResultResponse {
    fn from(r: QuizResult) -> Self {
        Self {
            id: r.id,
            quiz_id: r.quiz_id,
            score: r.score,
            correct_count: r.correct_count,
            total_questions: r.total_questions,
            answers: r.answers,
            created_at: r.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub result: QuizResultResponse,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
}

/// An id that is not a UUID can never name a stored quiz.
fn parse_quiz_id(raw: &str) -> Result<Uuid, HttpError> {
    raw.trim()
        .parse()
        .map_err(|_| HttpError::not_found("Quiz not found"))
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/quizzes",
    params(QuizQuery),
    responses((status = 200, description = "Quizzes", body = [QuizResponse]))
)]
pub async fn list_quizzes_handler(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<QuizQuery>,
) -> Result<Json<Vec<QuizResponse>>, HttpError> {
    let skill = query.skill.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let quizzes = state.db.list_quizzes(skill).await?;
    Ok(Json(quizzes.into_iter().map(QuizResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "The quiz", body = QuizResponse),
        (status = 404, description = "Quiz not found", body = ErrorBody)
    )
)]
pub async fn get_quiz_handler(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<Json<QuizResponse>, HttpError> {
    Ok(Json(state.db.get_quiz(parse_quiz_id(&id)?).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizResponse),
        (status = 400, description = "Missing title or type", body = ErrorBody)
    )
)]
pub async fn create_quiz_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let title = validation::required("title", &req.title)?;
    let quiz_type = validation::required("type", &req.quiz_type)?;
    let level = match req.level.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<Level>()
                .map_err(|e| HttpError::bad_request(e.to_string()))?,
        ),
        None => None,
    };

    let quiz = state
        .db
        .create_quiz(NewQuiz {
            title,
            quiz_type,
            level,
            questions: req.questions.into_iter().map(QuizQuestion::from).collect(),
        })
        .await?;
    info!("Created quiz {} with {} questions", quiz.id, quiz.questions.len());
    Ok((StatusCode::CREATED, Json(QuizResponse::from(quiz))))
}

/// Score a set of answers against a quiz and store the result.
#[utoipa::path(
    post,
    path = "/api/quizzes/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Scored result", body = SubmitResponse),
        (status = 404, description = "Quiz not found", body = ErrorBody)
    )
)]
pub async fn submit_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(req): AppJson<SubmitRequest>,
) -> Result<Json<SubmitResponse>, HttpError> {
    let quiz = state.db.get_quiz(parse_quiz_id(&req.quiz_id)?).await?;
    let scored = score_answers(&quiz.questions, &req.answers);

    let result = state
        .db
        .save_quiz_result(NewQuizResult {
            user_id,
            quiz_id: quiz.id,
            score: scored.score,
            correct_count: scored.correct_count,
            total_questions: scored.total_questions,
            answers: req.answers,
        })
        .await?;
    info!(
        "User {} scored {} on quiz {} ({}/{})",
        user_id, scored.score, quiz.id, scored.correct_count, scored.total_questions
    );

    Ok(Json(SubmitResponse {
        result: result.into(),
        score: scored.score,
        correct_count: scored.correct_count,
        total_questions: scored.total_questions,
    }))
}
