use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult, ErrorCode};
use skal_shared::types::{ApiResponse, AuthUser};

use crate::models::LikeTarget;
use crate::schema::{comments, posts};
use crate::services::{engagement_service, stats_service, user_service};
use crate::AppState;

fn parse_target(kind: &str, id: Uuid) -> AppResult<LikeTarget> {
    match kind {
        "post" => Ok(LikeTarget::Post(id)),
        "comment" => Ok(LikeTarget::Comment(id)),
        other => Err(AppError::new(
            ErrorCode::InvalidLikeTarget,
            format!("unknown like target kind '{other}', expected 'post' or 'comment'"),
        )),
    }
}

/// Owner of the liked content, whose clout the like affects.
fn target_owner(conn: &mut PgConnection, target: LikeTarget) -> AppResult<Uuid> {
    let owner: Option<Uuid> = match target {
        LikeTarget::Post(id) => posts::table
            .find(id)
            .select(posts::user_id)
            .first(conn)
            .optional()?,
        LikeTarget::Comment(id) => comments::table
            .find(id)
            .select(comments::user_id)
            .first(conn)
            .optional()?,
    };

    owner.ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidLikeTarget,
            "like target does not resolve to a post or comment",
        )
    })
}

#[derive(Debug, Serialize)]
pub struct LikeStateResponse {
    pub liked: bool,
    pub like_count: i64,
    pub target: LikeTarget,
}

// --- POST /likes/:kind/:id ---

pub async fn like_target(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<LikeStateResponse>>> {
    let target = parse_target(&kind, id)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let owner = target_owner(&mut conn, target)?;

    let edge = engagement_service::like(&mut conn, actor.id, target)?;
    // decode the persisted row; a corrupt edge surfaces here, not downstream
    let stored_target = edge.target()?;

    // the like changed the owner's clout; the actor's stats refresh too
    stats_service::recompute(&mut conn, owner)?;
    if owner != actor.id {
        stats_service::recompute(&mut conn, actor.id)?;
    }

    let like_count = engagement_service::like_count(&mut conn, target)?;

    Ok(Json(ApiResponse::ok(LikeStateResponse {
        liked: true,
        like_count,
        target: stored_target,
    })))
}

// --- DELETE /likes/:kind/:id ---

pub async fn unlike_target(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<LikeStateResponse>>> {
    let target = parse_target(&kind, id)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let owner = target_owner(&mut conn, target)?;

    engagement_service::unlike(&mut conn, actor.id, target)?;

    stats_service::recompute(&mut conn, owner)?;
    if owner != actor.id {
        stats_service::recompute(&mut conn, actor.id)?;
    }

    let like_count = engagement_service::like_count(&mut conn, target)?;

    Ok(Json(ApiResponse::ok(LikeStateResponse {
        liked: false,
        like_count,
        target,
    })))
}

// --- GET /likes/:kind/:id ---

pub async fn check_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<LikeStateResponse>>> {
    let target = parse_target(&kind, id)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    // confirm the target resolves before reporting counts
    target_owner(&mut conn, target)?;

    let liked = engagement_service::has_liked(&mut conn, actor.id, target)?;
    let like_count = engagement_service::like_count(&mut conn, target)?;

    Ok(Json(ApiResponse::ok(LikeStateResponse {
        liked,
        like_count,
        target,
    })))
}
