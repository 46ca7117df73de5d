//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dyslexia_core::domain::{
    AuthSession, Level, LibraryWord, Material, MaterialFilter, MaterialKind, MaterialUpdate,
    NewMaterial, NewOcrImport, NewProgress, NewQuiz, NewQuizResult, NewUser, OcrImport,
    OcrImportUpdate, OcrStatus, ProgressRecord, Quiz, QuizQuestion, QuizResult, User,
    UserCredentials, WordFilter,
};
use dyslexia_core::ports::{DatabaseService, PortError, PortResult};
use dyslexia_core::settings::{AudioSettings, DisplaySettings, UserSettings};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error and Query Helpers
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => PortError::Unexpected(other.to_string()),
    }
}

fn conflict_or(what: &'static str) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => PortError::Conflict(what.to_string()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

/// Builds a `LIKE` pattern that matches `needle` literally.
fn like_pattern(needle: &str, prefix_only: bool) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if prefix_only {
        format!("{}%", escaped)
    } else {
        format!("%{}%", escaped)
    }
}

fn parse_level(raw: &str) -> PortResult<Level> {
    raw.parse::<Level>()
        .map_err(|e| PortError::Unexpected(format!("corrupt level column: {}", e)))
}

fn parse_kind(raw: &str) -> PortResult<MaterialKind> {
    raw.parse::<MaterialKind>()
        .map_err(|e| PortError::Unexpected(format!("corrupt kind column: {}", e)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    username: String,
    email: String,
    full_name: Option<String>,
    birth_date: Option<NaiveDate>,
    hashed_password: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: User {
                user_id: self.user_id,
                username: self.username,
                email: self.email,
                full_name: self.full_name,
                birth_date: self.birth_date,
                created_at: self.created_at,
            },
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct WordRecord {
    id: Uuid,
    user_id: Uuid,
    word: String,
    pronunciation_url: Option<String>,
    created_at: DateTime<Utc>,
}
impl WordRecord {
    fn to_domain(self) -> LibraryWord {
        LibraryWord {
            id: self.id,
            user_id: self.user_id,
            text: self.word,
            pronunciation_url: self.pronunciation_url,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    font_family: String,
    font_size: f64,
    letter_spacing: f64,
    line_spacing: f64,
    theme: String,
    voice: String,
    speech_rate: f64,
    pitch: f64,
    volume: f64,
}
impl SettingsRecord {
    fn to_domain(self) -> PortResult<UserSettings> {
        Ok(UserSettings {
            display: DisplaySettings {
                font_family: self.font_family,
                font_size: self.font_size,
                letter_spacing: self.letter_spacing,
                line_spacing: self.line_spacing,
                theme: self.theme.parse().map_err(PortError::Unexpected)?,
            },
            audio: AudioSettings {
                voice: self.voice,
                speech_rate: self.speech_rate,
                pitch: self.pitch,
                volume: self.volume,
            },
        })
    }
}

#[derive(FromRow)]
struct MaterialRecord {
    id: Uuid,
    kind: String,
    title: String,
    topic: String,
    level: String,
    content: Option<String>,
    created_at: DateTime<Utc>,
}
impl MaterialRecord {
    fn to_domain(self) -> PortResult<Material> {
        Ok(Material {
            id: self.id,
            kind: parse_kind(&self.kind)?,
            title: self.title,
            topic: self.topic,
            level: parse_level(&self.level)?,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProgressRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    material_id: Uuid,
    material_title: Option<String>,
    percent: f64,
    analysis: Option<String>,
    created_at: DateTime<Utc>,
}
impl ProgressRow {
    fn to_domain(self) -> PortResult<ProgressRecord> {
        Ok(ProgressRecord {
            id: self.id,
            user_id: self.user_id,
            kind: parse_kind(&self.kind)?,
            material_id: self.material_id,
            material_title: self.material_title,
            percent: self.percent,
            analysis: self.analysis,
            created_at: self.created_at,
        })
    }
}

/// The JSON shape of a stored quiz question.
#[derive(Serialize, Deserialize)]
struct QuestionJson {
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
}

#[derive(FromRow)]
struct QuizRecord {
    id: Uuid,
    title: String,
    quiz_type: String,
    level: Option<String>,
    questions: Json<Vec<QuestionJson>>,
    created_at: DateTime<Utc>,
}
impl QuizRecord {
    fn to_domain(self) -> PortResult<Quiz> {
        Ok(Quiz {
            id: self.id,
            title: self.title,
            quiz_type: self.quiz_type,
            level: self.level.as_deref().map(parse_level).transpose()?,
            questions: self
                .questions
                .0
                .into_iter()
                .map(|q| QuizQuestion {
                    prompt: q.prompt,
                    options: q.options,
                    correct_answer: q.correct_answer,
                })
                .collect(),
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QuizResultRecord {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    score: f64,
    correct_count: i32,
    total_questions: i32,
    answers: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}
impl QuizResultRecord {
    fn to_domain(self) -> QuizResult {
        QuizResult {
            id: self.id,
            user_id: self.user_id,
            quiz_id: self.quiz_id,
            score: self.score,
            correct_count: self.correct_count.max(0) as usize,
            total_questions: self.total_questions.max(0) as usize,
            answers: self.answers.0,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct OcrImportRecord {
    id: Uuid,
    user_id: Uuid,
    file_name: String,
    content: String,
    status: String,
    tts_ready: bool,
    created_at: DateTime<Utc>,
}
impl OcrImportRecord {
    fn to_domain(self) -> PortResult<OcrImport> {
        Ok(OcrImport {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            content: self.content,
            status: self.status.parse::<OcrStatus>().map_err(PortError::Unexpected)?,
            tts_ready: self.tts_ready,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "user_id, username, email, full_name, birth_date, hashed_password, created_at";
const WORD_COLUMNS: &str = "id, user_id, word, pronunciation_url, created_at";
const MATERIAL_COLUMNS: &str = "id, kind, title, topic, level, content, created_at";
const QUIZ_COLUMNS: &str = "id, title, quiz_type, level, questions, created_at";
const OCR_COLUMNS: &str = "id, user_id, file_name, content, status, tts_ready, created_at";
const PROGRESS_SELECT: &str = "SELECT p.id, p.user_id, p.kind, p.material_id, m.title AS material_title, \
     p.percent, p.analysis::text AS analysis, p.created_at \
     FROM progress p LEFT JOIN materials m ON m.id = p.material_id";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- Users & Auth ---

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (user_id, username, email, full_name, birth_date, hashed_password) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(new_user.birth_date)
        .bind(&new_user.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or("email or username already registered"))?;
        Ok(record.to_domain().user)
    }

    async fn user_exists(&self, username: &str, email: &str) -> PortResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR lower(email) = lower($2))",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(exists)
    }

    async fn get_credentials(&self, login: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR lower(email) = lower($1) LIMIT 1",
            USER_COLUMNS
        ))
        .bind(login)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("User {} not found", login)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Vocabulary Library ---

    async fn list_words(&self, user_id: Uuid, filter: &WordFilter) -> PortResult<Vec<LibraryWord>> {
        let records = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {} FROM library_words \
             WHERE user_id = $1 \
               AND ($2::text IS NULL OR word ILIKE $2) \
               AND ($3::text IS NULL OR word ILIKE $3) \
             ORDER BY created_at DESC",
            WORD_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.search.as_deref().map(|s| like_pattern(s, false)))
        .bind(filter.letter.as_deref().map(|s| like_pattern(s, true)))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_word(&self, user_id: Uuid, text: &str) -> PortResult<Option<LibraryWord>> {
        let record = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {} FROM library_words WHERE user_id = $1 AND word = $2 LIMIT 1",
            WORD_COLUMNS
        ))
        .bind(user_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn get_word(&self, word_id: Uuid) -> PortResult<LibraryWord> {
        let record = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {} FROM library_words WHERE id = $1",
            WORD_COLUMNS
        ))
        .bind(word_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("Word {} not found", word_id)))?;
        Ok(record.to_domain())
    }

    async fn add_word(&self, user_id: Uuid, text: &str) -> PortResult<LibraryWord> {
        let record = sqlx::query_as::<_, WordRecord>(&format!(
            "INSERT INTO library_words (id, user_id, word) VALUES ($1, $2, $3) RETURNING {}",
            WORD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or("word already exists"))?;
        Ok(record.to_domain())
    }

    async fn delete_word(&self, word_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM library_words WHERE id = $1")
            .bind(word_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn count_words(&self, user_id: Uuid) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_words WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count.max(0) as u64)
    }

    async fn recent_words(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<LibraryWord>> {
        let records = sqlx::query_as::<_, WordRecord>(&format!(
            "SELECT {} FROM library_words WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            WORD_COLUMNS
        ))
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    // --- Settings ---

    async fn get_settings(&self, user_id: Uuid) -> PortResult<Option<UserSettings>> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT font_family, font_size, letter_spacing, line_spacing, theme, \
                    voice, speech_rate, pitch, volume \
             FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> PortResult<UserSettings> {
        let display = &settings.display;
        let audio = &settings.audio;
        let record = sqlx::query_as::<_, SettingsRecord>(
            "INSERT INTO user_settings \
                (user_id, font_family, font_size, letter_spacing, line_spacing, theme, \
                 voice, speech_rate, pitch, volume, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                font_family = EXCLUDED.font_family, \
                font_size = EXCLUDED.font_size, \
                letter_spacing = EXCLUDED.letter_spacing, \
                line_spacing = EXCLUDED.line_spacing, \
                theme = EXCLUDED.theme, \
                voice = EXCLUDED.voice, \
                speech_rate = EXCLUDED.speech_rate, \
                pitch = EXCLUDED.pitch, \
                volume = EXCLUDED.volume, \
                updated_at = now() \
             RETURNING font_family, font_size, letter_spacing, line_spacing, theme, \
                       voice, speech_rate, pitch, volume",
        )
        .bind(user_id)
        .bind(&display.font_family)
        .bind(display.font_size)
        .bind(display.letter_spacing)
        .bind(display.line_spacing)
        .bind(display.theme.as_str())
        .bind(&audio.voice)
        .bind(audio.speech_rate)
        .bind(audio.pitch)
        .bind(audio.volume)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    // --- Materials ---

    async fn list_materials(&self, kind: MaterialKind, filter: &MaterialFilter) -> PortResult<Vec<Material>> {
        let records = sqlx::query_as::<_, MaterialRecord>(&format!(
            "SELECT {} FROM materials \
             WHERE kind = $1 \
               AND ($2::text IS NULL OR level = $2) \
               AND ($3::text IS NULL OR topic = $3) \
               AND ($4::text IS NULL OR title ILIKE $4 OR topic ILIKE $4) \
             ORDER BY created_at ASC",
            MATERIAL_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(filter.level.map(|l| l.as_str()))
        .bind(filter.topic.as_deref())
        .bind(filter.search.as_deref().map(|s| like_pattern(s, false)))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<Material> {
        let record = sqlx::query_as::<_, MaterialRecord>(&format!(
            "SELECT {} FROM materials WHERE kind = $1 AND id = $2",
            MATERIAL_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("{} material {} not found", kind.as_str(), id)))?;
        record.to_domain()
    }

    async fn create_material(&self, kind: MaterialKind, material: NewMaterial) -> PortResult<Material> {
        let record = sqlx::query_as::<_, MaterialRecord>(&format!(
            "INSERT INTO materials (id, kind, title, topic, level, content) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            MATERIAL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(kind.as_str())
        .bind(&material.title)
        .bind(&material.topic)
        .bind(material.level.as_str())
        .bind(&material.content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update_material(
        &self,
        kind: MaterialKind,
        id: Uuid,
        update: MaterialUpdate,
    ) -> PortResult<Material> {
        let record = sqlx::query_as::<_, MaterialRecord>(&format!(
            "UPDATE materials SET \
                title = COALESCE($3, title), \
                topic = COALESCE($4, topic), \
                level = COALESCE($5, level), \
                content = COALESCE($6, content) \
             WHERE kind = $1 AND id = $2 RETURNING {}",
            MATERIAL_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(id)
        .bind(update.title)
        .bind(update.topic)
        .bind(update.level.map(|l| l.as_str()))
        .bind(update.content)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("{} material {} not found", kind.as_str(), id)))?;
        record.to_domain()
    }

    async fn delete_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("{} material {} not found", kind.as_str(), id)));
        }
        Ok(())
    }

    // --- Progress ---

    async fn record_progress(&self, progress: NewProgress) -> PortResult<ProgressRecord> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO progress (id, user_id, kind, material_id, percent, analysis) \
             VALUES ($1, $2, $3, $4, $5, $6::jsonb)",
        )
        .bind(id)
        .bind(progress.user_id)
        .bind(progress.kind.as_str())
        .bind(progress.material_id)
        .bind(progress.percent)
        .bind(&progress.analysis)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        let row = sqlx::query_as::<_, ProgressRow>(&format!("{} WHERE p.id = $1", PROGRESS_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        row.to_domain()
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        kind: Option<MaterialKind>,
    ) -> PortResult<Vec<ProgressRecord>> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            "{} WHERE p.user_id = $1 AND ($2::text IS NULL OR p.kind = $2) ORDER BY p.created_at DESC",
            PROGRESS_SELECT
        ))
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn activity_timestamps(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Vec<DateTime<Utc>>> {
        sqlx::query_scalar("SELECT created_at FROM progress WHERE user_id = $1 AND kind = $2")
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn latest_progress(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Option<ProgressRecord>> {
        let row = sqlx::query_as::<_, ProgressRow>(&format!(
            "{} WHERE p.user_id = $1 AND p.kind = $2 ORDER BY p.created_at DESC LIMIT 1",
            PROGRESS_SELECT
        ))
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        row.map(|r| r.to_domain()).transpose()
    }

    // --- Quizzes ---

    async fn list_quizzes(&self, quiz_type: Option<&str>) -> PortResult<Vec<Quiz>> {
        let records = sqlx::query_as::<_, QuizRecord>(&format!(
            "SELECT {} FROM quizzes WHERE ($1::text IS NULL OR quiz_type = $1) ORDER BY created_at ASC",
            QUIZ_COLUMNS
        ))
        .bind(quiz_type)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz> {
        let record = sqlx::query_as::<_, QuizRecord>(&format!(
            "SELECT {} FROM quizzes WHERE id = $1",
            QUIZ_COLUMNS
        ))
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Quiz not found".to_string()))?;
        record.to_domain()
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> PortResult<Quiz> {
        let questions: Vec<QuestionJson> = quiz
            .questions
            .into_iter()
            .map(|q| QuestionJson {
                prompt: q.prompt,
                options: q.options,
                correct_answer: q.correct_answer,
            })
            .collect();
        let record = sqlx::query_as::<_, QuizRecord>(&format!(
            "INSERT INTO quizzes (id, title, quiz_type, level, questions) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            QUIZ_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&quiz.title)
        .bind(&quiz.quiz_type)
        .bind(quiz.level.map(|l| l.as_str()))
        .bind(Json(questions))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn save_quiz_result(&self, result: NewQuizResult) -> PortResult<QuizResult> {
        let record = sqlx::query_as::<_, QuizResultRecord>(
            "INSERT INTO quiz_results \
                (id, user_id, quiz_id, score, correct_count, total_questions, answers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, quiz_id, score, correct_count, total_questions, answers, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(result.score)
        .bind(i32::try_from(result.correct_count).unwrap_or(i32::MAX))
        .bind(i32::try_from(result.total_questions).unwrap_or(i32::MAX))
        .bind(Json(&result.answers))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    // --- OCR Imports ---

    async fn create_ocr_import(&self, import: NewOcrImport) -> PortResult<OcrImport> {
        let record = sqlx::query_as::<_, OcrImportRecord>(&format!(
            "INSERT INTO ocr_imports (id, user_id, file_name, content, status, tts_ready) \
             VALUES ($1, $2, $3, $4, $5, FALSE) RETURNING {}",
            OCR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(import.user_id)
        .bind(&import.file_name)
        .bind(&import.content)
        .bind(import.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_ocr_imports(&self, user_id: Uuid, search: Option<&str>) -> PortResult<Vec<OcrImport>> {
        let records = sqlx::query_as::<_, OcrImportRecord>(&format!(
            "SELECT {} FROM ocr_imports \
             WHERE user_id = $1 AND ($2::text IS NULL OR file_name ILIKE $2) \
             ORDER BY created_at DESC",
            OCR_COLUMNS
        ))
        .bind(user_id)
        .bind(search.map(|s| like_pattern(s, false)))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_ocr_import(&self, id: Uuid) -> PortResult<OcrImport> {
        let record = sqlx::query_as::<_, OcrImportRecord>(&format!(
            "SELECT {} FROM ocr_imports WHERE id = $1",
            OCR_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("file not found".to_string()))?;
        record.to_domain()
    }

    async fn update_ocr_import(&self, id: Uuid, update: OcrImportUpdate) -> PortResult<OcrImport> {
        let record = sqlx::query_as::<_, OcrImportRecord>(&format!(
            "UPDATE ocr_imports SET \
                file_name = COALESCE($2, file_name), \
                content = COALESCE($3, content) \
             WHERE id = $1 RETURNING {}",
            OCR_COLUMNS
        ))
        .bind(id)
        .bind(update.file_name)
        .bind(update.content)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("file not found".to_string()))?;
        record.to_domain()
    }

    async fn delete_ocr_import(&self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM ocr_imports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
