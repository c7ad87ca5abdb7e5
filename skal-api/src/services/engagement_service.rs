use diesel::prelude::*;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Like, LikeTarget, NewLike};
use crate::schema::{comments, likes, posts};

/// Fails with InvalidLikeTarget unless the target resolves to an existing
/// post or comment at call time.
fn resolve_target(conn: &mut PgConnection, target: LikeTarget) -> AppResult<()> {
    let exists: i64 = match target {
        LikeTarget::Post(id) => posts::table
            .filter(posts::id.eq(id))
            .count()
            .get_result(conn)?,
        LikeTarget::Comment(id) => comments::table
            .filter(comments::id.eq(id))
            .count()
            .get_result(conn)?,
    };

    if exists == 0 {
        return Err(AppError::new(
            ErrorCode::InvalidLikeTarget,
            "like target does not resolve to a post or comment",
        ));
    }
    Ok(())
}

fn find_like(conn: &mut PgConnection, user_id: Uuid, target: LikeTarget) -> AppResult<Option<Like>> {
    let existing = match target {
        LikeTarget::Post(id) => likes::table
            .filter(likes::user_id.eq(user_id))
            .filter(likes::post_id.eq(id))
            .first::<Like>(conn)
            .optional()?,
        LikeTarget::Comment(id) => likes::table
            .filter(likes::user_id.eq(user_id))
            .filter(likes::comment_id.eq(id))
            .first::<Like>(conn)
            .optional()?,
    };
    Ok(existing)
}

pub fn has_liked(conn: &mut PgConnection, user_id: Uuid, target: LikeTarget) -> AppResult<bool> {
    Ok(find_like(conn, user_id, target)?.is_some())
}

/// Creates the like edge unless one already exists for (user, target).
/// Repeats and concurrent attempts converge on one edge: the insert runs
/// ON CONFLICT DO NOTHING against the unique (user_id, post_id) and
/// (user_id, comment_id) pairs, and the surviving row is read back.
pub fn like(conn: &mut PgConnection, user_id: Uuid, target: LikeTarget) -> AppResult<Like> {
    resolve_target(conn, target)?;

    diesel::insert_into(likes::table)
        .values(&NewLike::for_target(user_id, target))
        .on_conflict_do_nothing()
        .execute(conn)?;

    find_like(conn, user_id, target)?
        .ok_or_else(|| AppError::internal("like edge missing after insert"))
}

/// Removes the like edge for (user, target) if present; no-op otherwise.
pub fn unlike(conn: &mut PgConnection, user_id: Uuid, target: LikeTarget) -> AppResult<()> {
    resolve_target(conn, target)?;

    match target {
        LikeTarget::Post(id) => {
            diesel::delete(
                likes::table
                    .filter(likes::user_id.eq(user_id))
                    .filter(likes::post_id.eq(id)),
            )
            .execute(conn)?;
        }
        LikeTarget::Comment(id) => {
            diesel::delete(
                likes::table
                    .filter(likes::user_id.eq(user_id))
                    .filter(likes::comment_id.eq(id)),
            )
            .execute(conn)?;
        }
    }
    Ok(())
}

pub fn like_count(conn: &mut PgConnection, target: LikeTarget) -> AppResult<i64> {
    let count: i64 = match target {
        LikeTarget::Post(id) => likes::table
            .filter(likes::post_id.eq(id))
            .count()
            .get_result(conn)?,
        LikeTarget::Comment(id) => likes::table
            .filter(likes::comment_id.eq(id))
            .count()
            .get_result(conn)?,
    };
    Ok(count)
}
