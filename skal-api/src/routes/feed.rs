use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult};
use skal_shared::types::{ApiResponse, AuthUser, Page, PageParams};

use crate::models::{Post, User};
use crate::schema::{comments, likes, users};
use crate::services::{feed_service, user_service};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author: String,
    pub author_avatar: String,
    pub like_count: i64,
    pub comment_count: i64,
}

// --- GET /feed ---

pub async fn home_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Page<FeedItem>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = user_service::load_actor(&mut conn, user.id)?;
    let page = feed_service::compose_feed(&mut conn, actor.id, &params)?;

    Ok(Json(ApiResponse::ok(enrich(&mut conn, page)?)))
}

// --- GET /feed/newest ---

pub async fn newest_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Page<FeedItem>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    user_service::load_actor(&mut conn, user.id)?;
    let page = feed_service::compose_global_feed(&mut conn, &params)?;

    Ok(Json(ApiResponse::ok(enrich(&mut conn, page)?)))
}

/// Decorates a page of posts with author and engagement counts, one batch
/// query per concern rather than per row.
fn enrich(conn: &mut PgConnection, page: Page<Post>) -> AppResult<Page<FeedItem>> {
    let post_ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = page.items.iter().map(|p| p.user_id).collect();

    let authors: HashMap<Uuid, (String, String)> = users::table
        .filter(users::id.eq_any(&author_ids))
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, (u.username, u.avatar)))
        .collect();

    let mut like_counts: HashMap<Uuid, i64> = HashMap::new();
    for liked_post in likes::table
        .filter(likes::post_id.eq_any(&post_ids))
        .select(likes::post_id)
        .load::<Option<Uuid>>(conn)?
        .into_iter()
        .flatten()
    {
        *like_counts.entry(liked_post).or_default() += 1;
    }

    let mut comment_counts: HashMap<Uuid, i64> = HashMap::new();
    for commented_post in comments::table
        .filter(comments::post_id.eq_any(&post_ids))
        .select(comments::post_id)
        .load::<Uuid>(conn)?
    {
        *comment_counts.entry(commented_post).or_default() += 1;
    }

    let items = page
        .items
        .into_iter()
        .map(|post| {
            let (author, avatar) = authors
                .get(&post.user_id)
                .cloned()
                .unwrap_or_else(|| ("unknown".to_string(), String::new()));
            FeedItem {
                id: post.id,
                body: post.body,
                created_at: post.created_at,
                author,
                author_avatar: avatar,
                like_count: like_counts.get(&post.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&post.id).copied().unwrap_or(0),
            }
        })
        .collect();

    Ok(Page {
        items,
        page: page.page,
        per_page: page.per_page,
        has_next: page.has_next,
        has_prev: page.has_prev,
    })
}
