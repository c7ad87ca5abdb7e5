use diesel::prelude::*;
use uuid::Uuid;

use skal_shared::errors::AppResult;

use crate::models::NewFollow;
use crate::schema::follows;

/// Directed follow edges between users. Follow and unfollow are idempotent:
/// repeats converge to the same edge state without error.
pub fn is_following(conn: &mut PgConnection, follower: Uuid, followed: Uuid) -> AppResult<bool> {
    let count: i64 = follows::table
        .filter(follows::follower_id.eq(follower))
        .filter(follows::followed_id.eq(followed))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn follow(conn: &mut PgConnection, follower: Uuid, followed: Uuid) -> AppResult<()> {
    diesel::insert_into(follows::table)
        .values(&NewFollow::new(follower, followed))
        .on_conflict_do_nothing()
        .execute(conn)?;
    Ok(())
}

pub fn unfollow(conn: &mut PgConnection, follower: Uuid, followed: Uuid) -> AppResult<()> {
    diesel::delete(
        follows::table
            .filter(follows::follower_id.eq(follower))
            .filter(follows::followed_id.eq(followed)),
    )
    .execute(conn)?;
    Ok(())
}

/// All users `follower` follows, most recent edge first.
pub fn followed_ids(conn: &mut PgConnection, follower: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(follows::table
        .filter(follows::follower_id.eq(follower))
        .order(follows::created_at.desc())
        .select(follows::followed_id)
        .load::<Uuid>(conn)?)
}

/// All users following `followed`, most recent edge first.
pub fn follower_ids(conn: &mut PgConnection, followed: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(follows::table
        .filter(follows::followed_id.eq(followed))
        .order(follows::created_at.desc())
        .select(follows::follower_id)
        .load::<Uuid>(conn)?)
}
