use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use skal_shared::errors::{AppError, AppResult, ErrorCode};
use skal_shared::types::{ApiResponse, AuthUser, Page, PageParams};

use crate::models::{Post, PublicProfile, User, AVATARS};
use crate::schema::users;
use crate::services::{feed_service, user_service};
use crate::AppState;

const USERNAME_CHANGE_COOLDOWN_DAYS: i64 = 7;

// --- GET /me ---

pub async fn get_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let me = user_service::load_actor(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(me)))
}

// --- PATCH /me ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 140, message = "about me must be at most 140 characters"))]
    pub about_me: Option<String>,
    pub avatar: Option<String>,
    pub show_last_seen: Option<bool>,
}

pub async fn update_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    if let Some(avatar) = &req.avatar {
        if !AVATARS.contains(&avatar.as_str()) {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "avatar must be one of the provided selectors",
            ));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let me = user_service::load_actor(&mut conn, user.id)?;

    let mut username = me.username.clone();
    let mut old_username = me.old_username.clone();
    let mut username_changed_at = me.username_changed_at;

    if let Some(requested) = &req.username {
        if *requested != me.username {
            if user_service::username_taken(&mut conn, requested)? {
                return Err(AppError::new(
                    ErrorCode::UsernameTaken,
                    "the desired username is already in use",
                ));
            }
            let cooldown = Duration::days(USERNAME_CHANGE_COOLDOWN_DAYS);
            let available_at = me.username_changed_at + cooldown;
            if Utc::now() < available_at {
                return Err(AppError::new(
                    ErrorCode::UsernameChangeTooSoon,
                    format!(
                        "you cannot change your username more than once in a week, please wait until {}",
                        available_at.to_rfc3339()
                    ),
                ));
            }
            old_username = Some(me.username.clone());
            username_changed_at = Utc::now();
            username = requested.clone();
        }
    }

    let updated = diesel::update(users::table.find(me.id))
        .set((
            users::username.eq(&username),
            users::old_username.eq(old_username.clone()),
            users::username_changed_at.eq(username_changed_at),
            users::about_me.eq(merge_about_me(req.about_me.as_deref(), me.about_me.clone())),
            users::avatar.eq(req.avatar.clone().unwrap_or_else(|| me.avatar.clone())),
            users::show_last_seen.eq(req.show_last_seen.unwrap_or(me.show_last_seen)),
        ))
        .get_result::<User>(&mut conn)?;

    tracing::info!(user_id = %updated.id, "profile updated");

    Ok(Json(ApiResponse::ok(updated)))
}

/// An absent field leaves the stored text alone; an explicitly empty
/// string clears it.
fn merge_about_me(requested: Option<&str>, current: Option<String>) -> Option<String> {
    match requested {
        Some("") => None,
        Some(text) => Some(text.to_string()),
        None => current,
    }
}

// --- GET /users/:username ---

pub async fn get_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::load_actor(&mut conn, user.id)?;
    let target = user_service::find_by_username(&mut conn, &username)?;
    Ok(Json(ApiResponse::ok(PublicProfile::from(target))))
}

// --- GET /users/:username/posts ---

pub async fn get_user_posts(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Page<Post>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    user_service::load_actor(&mut conn, user.id)?;
    let target = user_service::find_by_username(&mut conn, &username)?;
    let page = feed_service::posts_by_user(&mut conn, target.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_about_me_keeps_the_stored_text() {
        assert_eq!(merge_about_me(None, Some("old".into())), Some("old".into()));
        assert_eq!(merge_about_me(None, None), None);
    }

    #[test]
    fn provided_about_me_replaces_the_stored_text() {
        assert_eq!(merge_about_me(Some("new"), Some("old".into())), Some("new".into()));
        assert_eq!(merge_about_me(Some("new"), None), Some("new".into()));
    }

    #[test]
    fn empty_about_me_clears_the_stored_text() {
        assert_eq!(merge_about_me(Some(""), Some("old".into())), None);
        assert_eq!(merge_about_me(Some(""), None), None);
    }
}
