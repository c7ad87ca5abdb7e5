use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult, ErrorCode};
use skal_shared::types::{ApiResponse, AuthUser};

use crate::models::{PublicProfile, User};
use crate::schema::users;
use crate::services::{follow_service, user_service};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FollowStateResponse {
    pub following: bool,
}

// --- POST /follows/:username ---

pub async fn follow_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<FollowStateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let target = user_service::find_by_username(&mut conn, &username)?;

    if actor.id == target.id {
        return Err(AppError::new(
            ErrorCode::CannotFollowSelf,
            "you cannot follow yourself",
        ));
    }

    follow_service::follow(&mut conn, actor.id, target.id)?;

    tracing::debug!(follower = %actor.username, followed = %target.username, "follow");

    Ok(Json(ApiResponse::ok_with_message(
        FollowStateResponse { following: true },
        format!("you are following {username}"),
    )))
}

// --- DELETE /follows/:username ---

pub async fn unfollow_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<FollowStateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let target = user_service::find_by_username(&mut conn, &username)?;

    if actor.id == target.id {
        return Err(AppError::new(
            ErrorCode::CannotFollowSelf,
            "you cannot unfollow yourself",
        ));
    }

    follow_service::unfollow(&mut conn, actor.id, target.id)?;

    Ok(Json(ApiResponse::ok_with_message(
        FollowStateResponse { following: false },
        format!("you are not following {username}"),
    )))
}

// --- GET /follows/:username ---

pub async fn check_following(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<FollowStateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let target = user_service::find_by_username(&mut conn, &username)?;
    let following = follow_service::is_following(&mut conn, actor.id, target.id)?;

    Ok(Json(ApiResponse::ok(FollowStateResponse { following })))
}

// --- GET /following ---

pub async fn list_following(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let ids = follow_service::followed_ids(&mut conn, actor.id)?;
    Ok(Json(ApiResponse::ok(load_profiles_in_order(&mut conn, &ids)?)))
}

// --- GET /followers ---

pub async fn list_followers(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let ids = follow_service::follower_ids(&mut conn, actor.id)?;
    Ok(Json(ApiResponse::ok(load_profiles_in_order(&mut conn, &ids)?)))
}

/// Loads profiles for the given ids, preserving the edge-recency order of
/// the id list.
fn load_profiles_in_order(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> AppResult<Vec<PublicProfile>> {
    let mut rows = users::table
        .filter(users::id.eq_any(ids))
        .load::<User>(conn)?;

    let id_order: HashMap<Uuid, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    rows.sort_by_key(|u| id_order.get(&u.id).copied().unwrap_or(usize::MAX));

    Ok(rows.into_iter().map(PublicProfile::from).collect())
}
