//! In-memory stand-ins for the service ports, and helpers for driving the
//! real router with `oneshot`.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{app_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use dyslexia_core::domain::{
    AuthSession, LibraryWord, Material, MaterialFilter, MaterialKind, MaterialUpdate, NewMaterial,
    NewOcrImport, NewProgress, NewQuiz, NewQuizResult, NewUser, OcrImport, OcrImportUpdate,
    ProgressRecord, Quiz, QuizResult, User, UserCredentials, WordFilter,
};
use dyslexia_core::ports::{DatabaseService, OcrService, PortError, PortResult};
use dyslexia_core::settings::UserSettings;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

//=========================================================================================
// In-memory DatabaseService
//=========================================================================================

#[derive(Default)]
struct Store {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    words: Vec<LibraryWord>,
    settings: HashMap<Uuid, UserSettings>,
    materials: Vec<Material>,
    progress: Vec<ProgressRecord>,
    quizzes: Vec<Quiz>,
    results: Vec<QuizResult>,
    imports: Vec<OcrImport>,
}

#[derive(Default)]
pub struct MemoryDb {
    store: Mutex<Store>,
    /// Number of `create_user` calls, including rejected ones.
    pub create_user_calls: Mutex<usize>,
    /// When set, `count_words` fails as if the store were down.
    pub fail_word_count: Mutex<bool>,
}

impl MemoryDb {
    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }

    pub fn insert_material(&self, kind: MaterialKind, title: &str, content: &str) -> Uuid {
        let material = Material {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            topic: "Động vật".to_string(),
            level: dyslexia_core::Level::A1,
            content: Some(content.to_string()),
            created_at: Utc::now(),
        };
        let id = material.id;
        self.store.lock().unwrap().materials.push(material);
        id
    }

    pub fn insert_quiz(&self, quiz: Quiz) {
        self.store.lock().unwrap().quizzes.push(quiz);
    }

    pub fn insert_progress_at(&self, user_id: Uuid, kind: MaterialKind, at: DateTime<Utc>) {
        self.store.lock().unwrap().progress.push(ProgressRecord {
            id: Uuid::new_v4(),
            user_id,
            kind,
            material_id: Uuid::new_v4(),
            material_title: None,
            percent: 100.0,
            analysis: None,
            created_at: at,
        });
    }

    pub fn saved_results(&self) -> Vec<QuizResult> {
        self.store.lock().unwrap().results.clone()
    }

    pub fn import_count(&self) -> usize {
        self.store.lock().unwrap().imports.len()
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

// In-memory mirrors of the WHERE clauses and UPDATE in adapters/db.rs.

fn material_matches(filter: &MaterialFilter, material: &Material) -> bool {
    if filter.level.is_some_and(|level| material.level != level) {
        return false;
    }
    if filter.topic.as_ref().is_some_and(|topic| &material.topic != topic) {
        return false;
    }
    match &filter.search {
        Some(search) => {
            let needle = search.to_lowercase();
            material.title.to_lowercase().contains(&needle)
                || material.topic.to_lowercase().contains(&needle)
        }
        None => true,
    }
}

fn word_matches(filter: &WordFilter, word: &LibraryWord) -> bool {
    let text = word.text.to_lowercase();
    let search_ok = filter
        .search
        .as_ref()
        .map_or(true, |search| text.contains(&search.to_lowercase()));
    let letter_ok = filter
        .letter
        .as_ref()
        .map_or(true, |letter| text.starts_with(&letter.to_lowercase()));
    search_ok && letter_ok
}

fn apply_update(update: MaterialUpdate, material: &mut Material) {
    if let Some(title) = update.title {
        material.title = title;
    }
    if let Some(topic) = update.topic {
        material.topic = topic;
    }
    if let Some(level) = update.level {
        material.level = level;
    }
    if let Some(content) = update.content {
        material.content = Some(content);
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        *self.create_user_calls.lock().unwrap() += 1;
        let mut store = self.store.lock().unwrap();
        if store
            .users
            .iter()
            .any(|c| c.user.username == new_user.username || c.user.email == new_user.email)
        {
            return Err(PortError::Conflict("email or username already registered".into()));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            full_name: new_user.full_name,
            birth_date: new_user.birth_date,
            created_at: Utc::now(),
        };
        store.users.push(UserCredentials {
            user: user.clone(),
            hashed_password: new_user.hashed_password,
        });
        Ok(user)
    }

    async fn user_exists(&self, username: &str, email: &str) -> PortResult<bool> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .any(|c| c.user.username == username || c.user.email == email))
    }

    async fn get_credentials(&self, login: &str) -> PortResult<UserCredentials> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|c| c.user.username == login || c.user.email == login)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {}", login)))
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        self.store
            .lock()
            .unwrap()
            .sessions
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let store = self.store.lock().unwrap();
        match store.sessions.get(session_id) {
            Some(s) if s.expires_at > Utc::now() => Ok(s.user_id),
            Some(_) => Err(PortError::Unauthorized),
            None => Err(PortError::NotFound("session".into())),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.store.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn list_words(&self, user_id: Uuid, filter: &WordFilter) -> PortResult<Vec<LibraryWord>> {
        let store = self.store.lock().unwrap();
        let mut words: Vec<LibraryWord> = store
            .words
            .iter()
            .filter(|w| w.user_id == user_id && word_matches(filter, w))
            .cloned()
            .collect();
        newest_first(&mut words, |w| w.created_at);
        Ok(words)
    }

    async fn find_word(&self, user_id: Uuid, text: &str) -> PortResult<Option<LibraryWord>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .words
            .iter()
            .find(|w| w.user_id == user_id && w.text == text)
            .cloned())
    }

    async fn get_word(&self, word_id: Uuid) -> PortResult<LibraryWord> {
        let store = self.store.lock().unwrap();
        store
            .words
            .iter()
            .find(|w| w.id == word_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("word not found".into()))
    }

    async fn add_word(&self, user_id: Uuid, text: &str) -> PortResult<LibraryWord> {
        let mut store = self.store.lock().unwrap();
        if store.words.iter().any(|w| w.user_id == user_id && w.text == text) {
            return Err(PortError::Conflict("word already exists".into()));
        }
        let word = LibraryWord {
            id: Uuid::new_v4(),
            user_id,
            text: text.to_string(),
            pronunciation_url: None,
            created_at: Utc::now(),
        };
        store.words.push(word.clone());
        Ok(word)
    }

    async fn delete_word(&self, word_id: Uuid) -> PortResult<()> {
        self.store.lock().unwrap().words.retain(|w| w.id != word_id);
        Ok(())
    }

    async fn count_words(&self, user_id: Uuid) -> PortResult<u64> {
        if *self.fail_word_count.lock().unwrap() {
            return Err(PortError::Unexpected("connection reset".into()));
        }
        let store = self.store.lock().unwrap();
        Ok(store.words.iter().filter(|w| w.user_id == user_id).count() as u64)
    }

    async fn recent_words(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<LibraryWord>> {
        let mut words = self.list_words(user_id, &WordFilter::default()).await?;
        words.truncate(limit as usize);
        Ok(words)
    }

    async fn get_settings(&self, user_id: Uuid) -> PortResult<Option<UserSettings>> {
        Ok(self.store.lock().unwrap().settings.get(&user_id).cloned())
    }

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> PortResult<UserSettings> {
        self.store
            .lock()
            .unwrap()
            .settings
            .insert(user_id, settings.clone());
        Ok(settings.clone())
    }

    async fn list_materials(&self, kind: MaterialKind, filter: &MaterialFilter) -> PortResult<Vec<Material>> {
        let store = self.store.lock().unwrap();
        let mut materials: Vec<Material> = store
            .materials
            .iter()
            .filter(|m| m.kind == kind && material_matches(filter, m))
            .cloned()
            .collect();
        newest_first(&mut materials, |m| m.created_at);
        Ok(materials)
    }

    async fn get_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<Material> {
        let store = self.store.lock().unwrap();
        store
            .materials
            .iter()
            .find(|m| m.kind == kind && m.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", kind.as_str(), id)))
    }

    async fn create_material(&self, kind: MaterialKind, material: NewMaterial) -> PortResult<Material> {
        let material = Material {
            id: Uuid::new_v4(),
            kind,
            title: material.title,
            topic: material.topic,
            level: material.level,
            content: material.content,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().materials.push(material.clone());
        Ok(material)
    }

    async fn update_material(
        &self,
        kind: MaterialKind,
        id: Uuid,
        update: MaterialUpdate,
    ) -> PortResult<Material> {
        let mut store = self.store.lock().unwrap();
        let material = store
            .materials
            .iter_mut()
            .find(|m| m.kind == kind && m.id == id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", kind.as_str(), id)))?;
        apply_update(update, material);
        Ok(material.clone())
    }

    async fn delete_material(&self, kind: MaterialKind, id: Uuid) -> PortResult<()> {
        let mut store = self.store.lock().unwrap();
        let before = store.materials.len();
        store.materials.retain(|m| !(m.kind == kind && m.id == id));
        if store.materials.len() == before {
            return Err(PortError::NotFound(format!("{} {} not found", kind.as_str(), id)));
        }
        Ok(())
    }

    async fn record_progress(&self, progress: NewProgress) -> PortResult<ProgressRecord> {
        let mut store = self.store.lock().unwrap();
        let material_title = store
            .materials
            .iter()
            .find(|m| m.id == progress.material_id)
            .map(|m| m.title.clone());
        let record = ProgressRecord {
            id: Uuid::new_v4(),
            user_id: progress.user_id,
            kind: progress.kind,
            material_id: progress.material_id,
            material_title,
            percent: progress.percent,
            analysis: progress.analysis,
            created_at: Utc::now(),
        };
        store.progress.push(record.clone());
        Ok(record)
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        kind: Option<MaterialKind>,
    ) -> PortResult<Vec<ProgressRecord>> {
        let store = self.store.lock().unwrap();
        let mut records: Vec<ProgressRecord> = store
            .progress
            .iter()
            .filter(|p| p.user_id == user_id && kind.map_or(true, |k| p.kind == k))
            .cloned()
            .collect();
        newest_first(&mut records, |p| p.created_at);
        Ok(records)
    }

    async fn activity_timestamps(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Vec<DateTime<Utc>>> {
        let records = self.list_progress(user_id, Some(kind)).await?;
        Ok(records.into_iter().map(|p| p.created_at).collect())
    }

    async fn latest_progress(
        &self,
        user_id: Uuid,
        kind: MaterialKind,
    ) -> PortResult<Option<ProgressRecord>> {
        let records = self.list_progress(user_id, Some(kind)).await?;
        Ok(records.into_iter().next())
    }

    async fn list_quizzes(&self, quiz_type: Option<&str>) -> PortResult<Vec<Quiz>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .quizzes
            .iter()
            .filter(|q| quiz_type.map_or(true, |t| q.quiz_type == t))
            .cloned()
            .collect())
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> PortResult<Quiz> {
        let store = self.store.lock().unwrap();
        store
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Quiz not found".into()))
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> PortResult<Quiz> {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: quiz.title,
            quiz_type: quiz.quiz_type,
            level: quiz.level,
            questions: quiz.questions,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn save_quiz_result(&self, result: NewQuizResult) -> PortResult<QuizResult> {
        let result = QuizResult {
            id: Uuid::new_v4(),
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            score: result.score,
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            answers: result.answers,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().results.push(result.clone());
        Ok(result)
    }

    async fn create_ocr_import(&self, import: NewOcrImport) -> PortResult<OcrImport> {
        let import = OcrImport {
            id: Uuid::new_v4(),
            user_id: import.user_id,
            file_name: import.file_name,
            content: import.content,
            status: import.status,
            tts_ready: false,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().imports.push(import.clone());
        Ok(import)
    }

    async fn list_ocr_imports(&self, user_id: Uuid, search: Option<&str>) -> PortResult<Vec<OcrImport>> {
        let store = self.store.lock().unwrap();
        let needle = search.map(str::to_lowercase);
        let mut imports: Vec<OcrImport> = store
            .imports
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter(|i| {
                needle
                    .as_deref()
                    .map_or(true, |n| i.file_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        newest_first(&mut imports, |i| i.created_at);
        Ok(imports)
    }

    async fn get_ocr_import(&self, id: Uuid) -> PortResult<OcrImport> {
        let store = self.store.lock().unwrap();
        store
            .imports
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("file not found".into()))
    }

    async fn update_ocr_import(&self, id: Uuid, update: OcrImportUpdate) -> PortResult<OcrImport> {
        let mut store = self.store.lock().unwrap();
        let import = store
            .imports
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| PortError::NotFound("file not found".into()))?;
        if let Some(name) = update.file_name {
            import.file_name = name;
        }
        if let Some(content) = update.content {
            import.content = content;
        }
        Ok(import.clone())
    }

    async fn delete_ocr_import(&self, id: Uuid) -> PortResult<()> {
        self.store.lock().unwrap().imports.retain(|i| i.id != id);
        Ok(())
    }
}

//=========================================================================================
// OCR doubles
//=========================================================================================

/// Always answers with the same text.
pub struct FixedOcr(pub &'static str);

#[async_trait]
impl OcrService for FixedOcr {
    async fn recognize(&self, _file_name: &str, _content_type: &str, _data: Vec<u8>) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

//=========================================================================================
// App Harness
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: Level::WARN,
        cors_origin: "http://localhost:3000".to_string(),
        session_ttl_days: 7,
        body_limit_bytes: 10 * 1024 * 1024,
        // Nothing listens on port 1, so connecting fails immediately.
        ocr_service_url: "http://127.0.0.1:1/api/ocr".to_string(),
        ocr_timeout_secs: 5,
        openai_api_key: None,
        assess_model: "gpt-4o-mini".to_string(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryDb>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ocr(Arc::new(FixedOcr("xin chào")))
    }

    pub fn with_ocr(ocr: Arc<dyn OcrService>) -> Self {
        let db = Arc::new(MemoryDb::default());
        let state = Arc::new(AppState {
            db: db.clone(),
            config: Arc::new(test_config()),
            ocr,
            assessor: None,
        });
        let router = app_router(state).unwrap();
        Self { router, db }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    /// Registers a user and returns their session token.
    pub async fn register(&self, username: &str) -> String {
        self.register_user(username).await.0
    }

    /// Registers a user and returns their session token and id.
    pub async fn register_user(&self, username: &str) -> (String, Uuid) {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123",
            "confirmPassword": "secret123",
        });
        let (status, json) = self.send(post_json("/api/auth/register", None, body)).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", json);
        let token = json["token"].as_str().unwrap().to_string();
        let id = json["user"]["id"].as_str().unwrap().parse().unwrap();
        (token, id)
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {}", t)),
        None => builder,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method("DELETE").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    send_json("POST", uri, token, body)
}

pub fn put_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    send_json("PUT", uri, token, body)
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
