//! crates/dyslexia_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    AuthSession, LevelAssessment, LibraryWord, Material, MaterialFilter, MaterialKind,
    MaterialUpdate, NewMaterial, NewOcrImport, NewProgress, NewQuiz, NewQuizResult, NewUser,
    OcrImport, OcrImportUpdate, ProgressRecord, Quiz, QuizResult, User, UserCredentials,
    WordFilter,
};
use crate::settings::UserSettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("Unauthorized")]
    Unauthorized,
    /// A dependent service could not be reached at all.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users & Auth ---
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    /// True if either the username or the email is already registered.
    async fn user_exists(&self, username: &str, email: &str) -> PortResult<bool>;

    /// Looks a user up by username or email.
    async fn get_credentials(&self, login: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;

    /// Resolves a live session to its user. Expired sessions are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Vocabulary Library ---
    /// Newest first.
    async fn list_words(&self, user_id: Uuid, filter: &WordFilter) -> PortResult<Vec<LibraryWord>>;

    async fn find_word(&self, user_id: Uuid, text: &str) -> PortResult<Option<LibraryWord>>;

    async fn get_word(&self, word_id: Uuid) -> PortResult<LibraryWord>;

    /// Fails with `Conflict` if the user already holds the same word.
    async fn add_word(&self, user_id: Uuid, text: &str) -> PortResult<LibraryWord>;

    async fn delete_word(&self, word_id: Uuid) -> PortResult<()>;

    async fn count_words(&self, user_id: Uuid) -> PortResult<u64>;

    async fn recent_words(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<LibraryWord>>;

    // --- Settings ---
    async fn get_settings(&self, user_id: Uuid) -> PortResult<Option<UserSettings>>;

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> PortResult<UserSettings>;

    // --- Materials ---
    async fn list_materials(&self, kind: MaterialKind, filter: &MaterialFilter) -> PortResult<Vec<Material>>;

    async fn get_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<Material>;

    async fn create_material(&self, kind: MaterialKind, material: NewMaterial) -> PortResult<Material>;

    async fn update_material(
        &self,
        kind: MaterialKind,
        id: Uuid,
        update: MaterialUpdate,
    ) -> PortResult<Material>;

    async fn delete_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<()>;

    // --- Progress ---
    async fn record_progress(&self, progress: NewProgress) -> PortResult<ProgressRecord>;

    /// Newest first. `None` returns both kinds.
    async fn list_progress(
        &self,
        user_id: Uuid,
        kind: Option<MaterialKind>,
    ) -> PortResult<Vec<ProgressRecord>>;

    async fn activity_timestamps(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Vec<DateTime<Utc>>>;

    async fn latest_progress(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Option<ProgressRecord>>;

    // --- Quizzes ---
    async fn list_quizzes(&self, quiz_type: Option<&str>) -> PortResult<Vec<Quiz>>;

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz>;

    async fn create_quiz(&self, quiz: NewQuiz) -> PortResult<Quiz>;

    async fn save_quiz_result(&self, result: NewQuizResult) -> PortResult<QuizResult>;

    // --- OCR Imports ---
    async fn create_ocr_import(&self, import: NewOcrImport) -> PortResult<OcrImport>;

    /// Newest first, optionally filtered by a file-name substring.
    async fn list_ocr_imports(&self, user_id: Uuid, search: Option<&str>) -> PortResult<Vec<OcrImport>>;

    async fn get_ocr_import(&self, id: Uuid) -> PortResult<OcrImport>;

    async fn update_ocr_import(&self, id: Uuid, update: OcrImportUpdate) -> PortResult<OcrImport>;

    async fn delete_ocr_import(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait OcrService: Send + Sync {
    /// Recognizes the text in an image. Fails with `Unavailable` when the
    /// recognition service cannot be reached.
    async fn recognize(&self, file_name: &str, content_type: &str, data: Vec<u8>) -> PortResult<String>;
}

#[async_trait]
pub trait LevelAssessmentService: Send + Sync {
    /// Estimates the difficulty level and topic of a text.
    async fn assess(&self, content: &str) -> PortResult<LevelAssessment>;
}
