//! crates/dyslexia_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users & Auth
//=========================================================================================

/// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to persist a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub hashed_password: String,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie or bearer token)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Materials
//=========================================================================================

/// The four difficulty tiers a material or quiz can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::A1, Level::A2, Level::B1, Level::B2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level '{0}', expected one of A1, A2, B1, B2")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Whether a material is used for reading or speaking practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Reading,
    Speaking,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Reading => "reading",
            MaterialKind::Speaking => "speaking",
        }
    }
}

impl FromStr for MaterialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(MaterialKind::Reading),
            "speaking" => Ok(MaterialKind::Speaking),
            other => Err(format!("type must be \"reading\" or \"speaking\", got '{}'", other)),
        }
    }
}

/// A reading or speaking practice text.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: Uuid,
    pub kind: MaterialKind,
    pub title: String,
    pub topic: String,
    pub level: Level,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub topic: String,
    pub level: Level,
    pub content: Option<String>,
}

/// Field-by-field update of a material. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct MaterialUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub level: Option<Level>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialFilter {
    pub level: Option<Level>,
    pub topic: Option<String>,
    /// Case-insensitive substring of title or topic.
    pub search: Option<String>,
}

//=========================================================================================
// Vocabulary Library
//=========================================================================================

/// A user-scoped vocabulary entry.
#[derive(Debug, Clone)]
pub struct LibraryWord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub pronunciation_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    /// Case-insensitive substring.
    pub search: Option<String>,
    /// Case-insensitive prefix.
    pub letter: Option<String>,
}

//=========================================================================================
// Progress
//=========================================================================================

/// A timestamped outcome of a user completing or attempting a material.
#[derive(Debug, Clone)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: MaterialKind,
    pub material_id: Uuid,
    /// Joined from the material, absent if the material has been deleted.
    pub material_title: Option<String>,
    pub percent: f64,
    /// Free-form analysis payload (serialized JSON) recorded by speaking practice.
    pub analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProgress {
    pub user_id: Uuid,
    pub kind: MaterialKind,
    pub material_id: Uuid,
    pub percent: f64,
    pub analysis: Option<String>,
}

//=========================================================================================
// Quizzes
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub quiz_type: String,
    pub level: Option<Level>,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub quiz_type: String,
    pub level: Option<Level>,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub answers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub answers: Vec<String>,
}

//=========================================================================================
// OCR Imports
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrStatus {
    Pending,
    Processed,
    Error,
}

impl OcrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrStatus::Pending => "pending",
            OcrStatus::Processed => "processed",
            OcrStatus::Error => "error",
        }
    }
}

impl FromStr for OcrStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OcrStatus::Pending),
            "processed" => Ok(OcrStatus::Processed),
            "error" => Ok(OcrStatus::Error),
            other => Err(format!("unknown OCR status '{}'", other)),
        }
    }
}

/// Text extracted from an uploaded document or image.
#[derive(Debug, Clone)]
pub struct OcrImport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub content: String,
    pub status: OcrStatus,
    pub tts_ready: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOcrImport {
    pub user_id: Uuid,
    pub file_name: String,
    pub content: String,
    pub status: OcrStatus,
}

#[derive(Debug, Clone, Default)]
pub struct OcrImportUpdate {
    pub file_name: Option<String>,
    pub content: Option<String>,
}

//=========================================================================================
// Level Assessment
//=========================================================================================

/// Suggested difficulty tier and topic for a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAssessment {
    pub level: Level,
    pub recommended_topic: String,
    pub reason: String,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub difficult_words: Vec<String>,
}
