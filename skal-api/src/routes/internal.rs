use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult};
use skal_shared::types::ApiResponse;

use crate::seed;
use crate::services::user_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BanResponse {
    pub banned: bool,
}

/// POST /internal/users/:id/ban — service-to-service, no auth
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BanResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::set_banned(&mut conn, user_id, true)?;

    tracing::warn!(user_id = %user_id, "user banned");
    Ok(Json(ApiResponse::ok(BanResponse { banned: true })))
}

/// DELETE /internal/users/:id/ban — service-to-service, no auth
pub async fn unban_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BanResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::set_banned(&mut conn, user_id, false)?;

    tracing::info!(user_id = %user_id, "user unbanned");
    Ok(Json(ApiResponse::ok(BanResponse { banned: false })))
}

/// POST /internal/seed — populate test data (service-to-service, no auth)
pub async fn seed_data(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<seed::SeedSummary>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let summary = seed::seed(&mut conn)?;
    Ok(Json(ApiResponse::ok(summary)))
}

#[derive(Debug, Serialize)]
pub struct WipedResponse {
    pub wiped: bool,
}

/// POST /internal/wipe — delete all store data (service-to-service, no auth)
pub async fn wipe_data(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<WipedResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    seed::wipe(&mut conn)?;
    Ok(Json(ApiResponse::ok(WipedResponse { wiped: true })))
}
