//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, NaiveDate, Utc};
use dyslexia_core::domain::{AuthSession, NewUser, User};
use dyslexia_core::ports::PortError;
use dyslexia_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::extract::AppJson;
use crate::web::middleware::session_tokens;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            birth_date: user.birth_date,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Session token; also set as the `session` cookie.
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub ok: bool,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> Result<String, HttpError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HttpError::internal("Failed to hash password")
        })
}

/// Stores a fresh session for `user_id` and returns its token and cookie.
async fn issue_session(state: &AppState, user_id: Uuid) -> Result<(String, String), HttpError> {
    let ttl = Duration::days(state.config.session_ttl_days);
    let session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + ttl,
    };
    let token = session.id.clone();

    state.db.create_auth_session(session).await.map_err(|e| {
        error!("Failed to create auth session: {:?}", e);
        HttpError::from(e)
    })?;

    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        ttl.num_seconds()
    );
    Ok((token, cookie))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing field, password mismatch or bad email", body = ErrorBody),
        (status = 409, description = "Email or username already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Validate everything before touching storage
    let registration =
        validation::registration(&req.username, &req.email, &req.password, &req.confirm_password)?;

    let birth_date = match req.birth_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| HttpError::bad_request("birthDate must be formatted as YYYY-MM-DD"))?,
        ),
        None => None,
    };

    // 2. Reject duplicates
    if state
        .db
        .user_exists(&registration.username, &registration.email)
        .await?
    {
        return Err(PortError::Conflict("email or username already registered".to_string()).into());
    }

    // 3. Hash the password and create the user
    let hashed_password = hash_password(&registration.password)?;
    let user = state
        .db
        .create_user(NewUser {
            username: registration.username,
            email: registration.email,
            full_name: req.full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            birth_date,
            hashed_password,
        })
        .await?;
    info!("Registered user {}", user.user_id);

    // 4. Log the new user in
    let (token, cookie) = issue_session(&state, user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing username or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let login = validation::required("username", &req.username)?;
    if req.password.is_empty() {
        return Err(HttpError::bad_request("password is required"));
    }

    // 1. Get user by username or email
    let creds = state.db.get_credentials(&login).await.map_err(|e| match e {
        PortError::NotFound(_) => HttpError::unauthorized("invalid credentials"),
        other => HttpError::from(other),
    })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::internal("Authentication error")
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(HttpError::unauthorized("invalid credentials"));
    }

    // 3. Create the session
    let (token, cookie) = issue_session(&state, creds.user.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: creds.user.into(),
            token,
        }),
    ))
}

/// POST /api/auth/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    for token in session_tokens(&headers) {
        state.db.delete_auth_session(token).await.map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            HttpError::from(e)
        })?;
    }

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(LogoutResponse { ok: true }),
    ))
}
