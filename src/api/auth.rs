//! Registration, login, token refresh and identity echo.
//!
//! # Responsibilities
//! - Registration: strength-check and hash the password, sanitize
//!   free-text fields, insert into the user store
//! - Login: look up identity, verify credentials, issue one access and
//!   one refresh token
//! - Refresh: trade a live refresh token for a fresh access token
//!
//! # Design Decisions
//! - Login failure is one opaque rejection whether the user is unknown
//!   or the password is wrong
//! - The auth-scope rate limiter runs BEFORE any of these handlers, so
//!   brute-force cost is bounded ahead of credential checks

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::security::guard::CurrentUser;
use crate::security::token::TokenKind;
use crate::security::{password, sanitize};
use crate::store::{NewUser, StoreError, UserRecord};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// User representation safe to put on the wire: no password material.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&UserRecord> for PublicUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            is_admin: record.is_admin,
        }
    }
}

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    password::validate_strength(&req.password)?;

    let username = sanitize::sanitize(req.username.trim());
    let email = sanitize::sanitize(req.email.trim());
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let password_hash = password::hash(&req.password).map_err(|err| {
        tracing::error!(%err, "password hashing failed");
        ApiError::Internal
    })?;

    let record = state
        .users
        .insert(NewUser {
            username,
            email,
            password_hash,
            is_admin: req.is_admin,
        })
        .map_err(|err: StoreError| ApiError::Conflict(err.to_string()))?;

    tracing::info!(user = %record.username, id = record.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": PublicUser::from(&record),
        })),
    ))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .lookup(&req.username)
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify(&user.password_hash, &req.password) {
        tracing::warn!(user = %req.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let access = state
        .tokens
        .issue(user.id, &user.username, user.is_admin, TokenKind::Access)
        .map_err(|_| ApiError::Internal)?;
    let refresh = state
        .tokens
        .issue(user.id, &user.username, user.is_admin, TokenKind::Refresh)
        .map_err(|_| ApiError::Internal)?;

    tracing::info!(user = %user.username, "login succeeded");
    Ok(Json(json!({
        "message": "Login successful",
        "access_token": access,
        "refresh_token": refresh,
        "user": PublicUser::from(&user),
    })))
}

/// POST /api/v1/users/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let access = state
        .tokens
        .refresh_access(&req.refresh_token)
        .map_err(|_| ApiError::InvalidToken)?;
    Ok(Json(json!({ "access_token": access })))
}

/// GET /api/v1/users/me — echoes the verified identity context.
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(json!({
        "id": user.id,
        "username": user.username,
        "is_admin": user.is_admin,
    }))
}
