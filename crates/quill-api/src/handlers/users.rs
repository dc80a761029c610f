//! Account and session HTTP handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::password::{hash_password, verify_password};
use crate::validate::FieldErrors;
use crate::{ApiError, AppState, AuthUser};
use quill_core::defaults::{EMAIL_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN, PASSWORD_MIN_LEN};
use quill_core::{
    CreateUserRequest, Notification, SessionRepository, UserProfile, UserRepository,
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Register a new account.
///
/// # Returns
/// - 201 Created with the public profile
/// - 400 Bad Request with field-level messages
/// - 409 Conflict when the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let mut v = FieldErrors::new();
    v.require_len("firstname", &req.firstname, NAME_MIN_LEN, NAME_MAX_LEN);
    v.require_len("lastname", &req.lastname, NAME_MIN_LEN, NAME_MAX_LEN);
    v.require_email("email", &req.email, EMAIL_MAX_LEN);
    v.require_min_len("password", &req.password, PASSWORD_MIN_LEN);
    v.require_match(
        "password_confirmation",
        &req.password,
        &req.password_confirmation,
    );
    v.into_result()?;

    let password_hash = hash_password(&req.password)?;
    let user = state
        .db
        .users
        .create(CreateUserRequest {
            firstname: req.firstname.trim().to_string(),
            lastname: req.lastname.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash,
        })
        .await?;

    info!(
        subsystem = "api",
        op = "register",
        user_id = %user.id,
        "User registered"
    );
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut v = FieldErrors::new();
    v.require_email("email", &req.email, EMAIL_MAX_LEN);
    v.require_min_len("password", &req.password, PASSWORD_MIN_LEN);
    v.into_result()?;

    let user = state
        .db
        .users
        .find_by_email(req.email.trim().to_lowercase().as_str())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Email is not registered".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Wrong password".to_string()));
    }

    let issued = state.db.sessions.issue(user.id).await?;
    info!(
        subsystem = "api",
        op = "login",
        user_id = %user.id,
        "Login successful"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
    }))
}

/// Revoke the presented session token.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.sessions.revoke(&auth.token).await?;
    info!(
        subsystem = "api",
        op = "logout",
        user_id = %auth.user.id,
        "User logged out"
    );
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

/// Return the authenticated user's profile.
pub async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(UserProfile::from(&auth.user))
}

/// Issue a one-time password-reset token and dispatch it by mail.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut v = FieldErrors::new();
    v.require_email("email", &req.email, EMAIL_MAX_LEN);
    v.into_result()?;

    let user = state
        .db
        .users
        .find_by_email(req.email.trim().to_lowercase().as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Email is not registered".to_string()))?;

    let token = state.db.sessions.create_reset_token(user.id).await?;

    // The reset outcome is already recorded; delivery is best-effort.
    quill_notify::dispatch(
        state.notifier.clone(),
        Notification::PasswordReset {
            recipient: user.email.clone(),
            token,
        },
    );

    Ok(Json(serde_json::json!({
        "message": "Password reset link sent"
    })))
}

/// Consume a reset token and store a new password hash.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut v = FieldErrors::new();
    v.require_min_len("password", &req.password, PASSWORD_MIN_LEN);
    v.into_result()?;

    let user_id = state
        .db
        .sessions
        .consume_reset_token(&req.token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired reset token".to_string()))?;

    let password_hash = hash_password(&req.password)?;
    state.db.users.update_password(user_id, &password_hash).await?;

    info!(
        subsystem = "api",
        op = "reset_password",
        user_id = %user_id,
        "Password reset"
    );
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}
