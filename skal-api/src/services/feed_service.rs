use diesel::prelude::*;
use uuid::Uuid;

use skal_shared::errors::AppResult;
use skal_shared::types::{Page, PageParams};

use crate::models::Post;
use crate::schema::posts;
use crate::services::follow_service;

/// A user's home feed: their own posts merged with posts from everyone
/// they follow, newest first. Authorship is single, so the union holds
/// each post at most once. Ties on timestamp break by id descending so
/// page boundaries are deterministic.
pub fn compose_feed(
    conn: &mut PgConnection,
    user_id: Uuid,
    params: &PageParams,
) -> AppResult<Page<Post>> {
    params.validate()?;

    let mut author_ids = follow_service::followed_ids(conn, user_id)?;
    author_ids.push(user_id);

    let rows = posts::table
        .filter(posts::user_id.eq_any(&author_ids))
        .order((posts::created_at.desc(), posts::id.desc()))
        .offset(params.offset())
        .limit(params.limit() + 1)
        .load::<Post>(conn)?;

    Ok(Page::from_rows(rows, params))
}

/// The "newest" view: all posts system-wide, newest first.
pub fn compose_global_feed(conn: &mut PgConnection, params: &PageParams) -> AppResult<Page<Post>> {
    params.validate()?;

    let rows = posts::table
        .order((posts::created_at.desc(), posts::id.desc()))
        .offset(params.offset())
        .limit(params.limit() + 1)
        .load::<Post>(conn)?;

    Ok(Page::from_rows(rows, params))
}

/// One author's posts, newest first (the profile page listing).
pub fn posts_by_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    params: &PageParams,
) -> AppResult<Page<Post>> {
    params.validate()?;

    let rows = posts::table
        .filter(posts::user_id.eq(user_id))
        .order((posts::created_at.desc(), posts::id.desc()))
        .offset(params.offset())
        .limit(params.limit() + 1)
        .load::<Post>(conn)?;

    Ok(Page::from_rows(rows, params))
}
