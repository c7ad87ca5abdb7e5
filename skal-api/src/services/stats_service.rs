use diesel::prelude::*;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult, ErrorCode};

use crate::schema::{comments, likes, posts, users};

/// Recomputes a user's derived counters from scratch: `post_count` is the
/// number of owned posts, `clout` the likes received across all owned
/// posts and comments. A full recomputation rather than incremental
/// counters, scoped to one user and wrapped in a transaction, so repeated
/// calls with no intervening mutation write identical values.
pub fn recompute(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        let post_ids: Vec<Uuid> = posts::table
            .filter(posts::user_id.eq(user_id))
            .select(posts::id)
            .load(conn)?;

        let comment_ids: Vec<Uuid> = comments::table
            .filter(comments::user_id.eq(user_id))
            .select(comments::id)
            .load(conn)?;

        let post_likes: i64 = likes::table
            .filter(likes::post_id.eq_any(&post_ids))
            .count()
            .get_result(conn)?;

        let comment_likes: i64 = likes::table
            .filter(likes::comment_id.eq_any(&comment_ids))
            .count()
            .get_result(conn)?;

        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::post_count.eq(post_ids.len() as i32),
                users::clout.eq((post_likes + comment_likes) as i32),
            ))
            .execute(conn)?;

        if updated == 0 {
            return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
        }

        tracing::debug!(
            user_id = %user_id,
            post_count = post_ids.len(),
            clout = post_likes + comment_likes,
            "stats recomputed"
        );
        Ok(())
    })
}
