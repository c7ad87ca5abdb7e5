use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use skal_shared::clients::email;
use skal_shared::errors::{AppError, AppResult, ErrorCode};
use skal_shared::types::{AccessToken, ApiResponse, TokenPurpose};

use crate::models::{NewUser, User};
use crate::schema::users;
use crate::services::{auth_service, token_service, user_service};
use crate::AppState;

// --- POST /auth/register ---

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub user_id: Uuid,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<RegisteredResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    auth_service::validate_password(&req.password)?;

    let email_addr = req.email.to_lowercase();
    if let Some(domain) = &state.config.allowed_email_domain {
        if !email_addr.ends_with(&format!("@{domain}")) {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                format!("sign-up requires a {domain} email address"),
            ));
        }
    }

    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    if user_service::username_taken(&mut conn, &req.username)? {
        return Err(AppError::new(
            ErrorCode::UsernameTaken,
            "the desired username is already in use",
        ));
    }
    if user_service::email_taken(&mut conn, &email_addr)? {
        return Err(AppError::new(
            ErrorCode::EmailAlreadyExists,
            "account already created for this email, please login",
        ));
    }

    let new_user = NewUser::new(&req.username, &email_addr, password_hash);
    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)?;

    send_verification_email(&state, &user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(Json(ApiResponse::ok_with_message(
        RegisteredResponse { user_id: user.id },
        "please check your inbox for a confirmation email",
    )))
}

fn send_verification_email(state: &Arc<AppState>, user: &User) -> AppResult<()> {
    let token = token_service::create_action_token(
        user.id,
        TokenPurpose::VerifyEmail,
        &state.config.jwt_secret,
        state.config.verify_token_ttl,
    )?;
    let verify_url = format!("{}/verify/{}", state.config.base_url, token);

    let client = state.email.clone();
    let to = user.email.clone();
    let username = user.username.clone();
    email::dispatch(async move {
        client.send_verification_email(&to, &username, &verify_url).await
    });
    Ok(())
}

// --- POST /auth/login ---

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = user_service::find_by_email(&mut conn, &req.email.to_lowercase())?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    if !auth_service::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::new(
            ErrorCode::InvalidCredentials,
            "invalid email or password",
        ));
    }
    if !user.verified {
        return Err(AppError::new(
            ErrorCode::EmailNotVerified,
            "account requires email verification",
        ));
    }
    if user.banned {
        return Err(AppError::new(ErrorCode::UserBanned, "account is banned"));
    }

    let token = token_service::create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.access_ttl,
    )?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(AccessToken::new(
        token,
        state.config.access_ttl,
    ))))
}

// --- POST /auth/verify/:token ---

#[derive(Debug, Serialize)]
pub struct VerifiedResponse {
    pub verified: bool,
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<VerifiedResponse>>> {
    let user_id =
        token_service::verify_action_token(&token, TokenPurpose::VerifyEmail, &state.config.jwt_secret)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::mark_verified(&mut conn, user_id)?;

    tracing::info!(user_id = %user_id, "account verified");

    Ok(Json(ApiResponse::ok_with_message(
        VerifiedResponse { verified: true },
        "account verified",
    )))
}

// --- POST /auth/verify-request ---

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailQueuedResponse {
    pub sent: bool,
}

/// Re-sends the verification email. Always answers the same way so the
/// endpoint cannot be used to probe which addresses have accounts.
pub async fn verify_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> AppResult<Json<ApiResponse<EmailQueuedResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    if let Some(user) = user_service::find_by_email(&mut conn, &req.email.to_lowercase())? {
        if !user.verified {
            send_verification_email(&state, &user)?;
        }
    }

    Ok(Json(ApiResponse::ok_with_message(
        EmailQueuedResponse { sent: true },
        "check your email for the instructions to verify your account",
    )))
}

// --- POST /auth/forgot-password ---

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> AppResult<Json<ApiResponse<EmailQueuedResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    if let Some(user) = user_service::find_by_email(&mut conn, &req.email.to_lowercase())? {
        let token = token_service::create_action_token(
            user.id,
            TokenPurpose::ResetPassword,
            &state.config.jwt_secret,
            state.config.reset_token_ttl,
        )?;
        let reset_url = format!("{}/reset_password/{}", state.config.base_url, token);

        let client = state.email.clone();
        let to = user.email.clone();
        let username = user.username.clone();
        email::dispatch(async move {
            client.send_password_reset_email(&to, &username, &reset_url).await
        });
    }

    Ok(Json(ApiResponse::ok_with_message(
        EmailQueuedResponse { sent: true },
        "check your email for the instructions to reset your password",
    )))
}

// --- POST /auth/reset-password ---

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetResponse {
    pub reset: bool,
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<PasswordResetResponse>>> {
    let user_id = token_service::verify_action_token(
        &req.token,
        TokenPurpose::ResetPassword,
        &state.config.jwt_secret,
    )?;

    auth_service::validate_password(&req.password)?;
    let hash = auth_service::hash_password(&req.password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::set_password_hash(&mut conn, user_id, &hash)?;

    tracing::info!(user_id = %user_id, "password reset");

    Ok(Json(ApiResponse::ok_with_message(
        PasswordResetResponse { reset: true },
        "your password has been reset",
    )))
}
