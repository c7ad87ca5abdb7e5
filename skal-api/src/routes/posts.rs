use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use skal_shared::errors::{AppError, AppResult, ErrorCode};
use skal_shared::types::{ApiResponse, AuthUser};

use crate::models::{Comment, LikeTarget, NewComment, NewPost, Post, User};
use crate::schema::{comments, posts, users};
use crate::services::{engagement_service, stats_service, user_service};
use crate::AppState;

// --- POST /posts ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 1400, message = "post body must be 1-1400 characters"))]
    pub body: String,
}

pub async fn create_post(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let actor = user_service::load_actor(&mut conn, user.id)?;

    let post: Post = diesel::insert_into(posts::table)
        .values(&NewPost::new(actor.id, &req.body))
        .get_result(&mut conn)?;

    // keep the author's derived post_count in step
    stats_service::recompute(&mut conn, actor.id)?;

    tracing::info!(user_id = %actor.id, post_id = %post.id, "post created");

    Ok(Json(ApiResponse::ok_with_message(post, "your post is now live")))
}

// --- GET /posts/:id ---

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub body: String,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub like_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub body: String,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub like_count: i64,
    pub comment_count: i64,
    pub comments: Vec<CommentView>,
}

pub async fn get_post(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PostDetail>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    user_service::load_actor(&mut conn, user.id)?;
    let post = find_post(&mut conn, post_id)?;
    let author = user_service::find_by_id(&mut conn, post.user_id)?;

    let post_comments: Vec<Comment> = comments::table
        .filter(comments::post_id.eq(post.id))
        .order(comments::created_at.asc())
        .load(&mut conn)?;

    let commenter_ids: Vec<Uuid> = post_comments.iter().map(|c| c.user_id).collect();
    let commenters: HashMap<Uuid, String> = users::table
        .filter(users::id.eq_any(&commenter_ids))
        .load::<User>(&mut conn)?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let mut views = Vec::with_capacity(post_comments.len());
    for comment in &post_comments {
        let like_count =
            engagement_service::like_count(&mut conn, LikeTarget::Comment(comment.id))?;
        views.push(CommentView {
            id: comment.id,
            body: comment.body.clone(),
            author: commenters
                .get(&comment.user_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            created_at: comment.created_at,
            like_count,
        });
    }

    let like_count = engagement_service::like_count(&mut conn, LikeTarget::Post(post.id))?;

    Ok(Json(ApiResponse::ok(PostDetail {
        id: post.id,
        body: post.body,
        author: author.username,
        created_at: post.created_at,
        like_count,
        comment_count: views.len() as i64,
        comments: views,
    })))
}

// --- POST /posts/:id/comments ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 140, message = "comment must be 1-140 characters"))]
    pub body: String,
}

pub async fn create_comment(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let actor = user_service::load_actor(&mut conn, user.id)?;
    let post = find_post(&mut conn, post_id)?;

    let comment: Comment = diesel::insert_into(comments::table)
        .values(&NewComment::new(actor.id, post.id, &req.body))
        .get_result(&mut conn)?;

    tracing::info!(user_id = %actor.id, post_id = %post.id, comment_id = %comment.id, "comment created");

    Ok(Json(ApiResponse::ok_with_message(
        comment,
        "your comment has been posted",
    )))
}

pub(crate) fn find_post(conn: &mut PgConnection, post_id: Uuid) -> AppResult<Post> {
    posts::table
        .find(post_id)
        .first::<Post>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PostNotFound, "post not found"))
}
