use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use skal_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::User;
use crate::schema::users;

pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<User> {
    users::table
        .find(id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn find_by_username(conn: &mut PgConnection, username: &str) -> AppResult<User> {
    users::table
        .filter(users::username.eq(username))
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn find_by_email(conn: &mut PgConnection, email: &str) -> AppResult<Option<User>> {
    Ok(users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()?)
}

/// Loads the user behind an authenticated request, rejecting banned
/// accounts and bumping `last_seen` as the original did on every request.
pub fn load_actor(conn: &mut PgConnection, id: Uuid) -> AppResult<User> {
    let user = find_by_id(conn, id)?;
    if user.banned {
        return Err(AppError::new(ErrorCode::UserBanned, "account is banned"));
    }

    diesel::update(users::table.find(user.id))
        .set(users::last_seen.eq(Utc::now()))
        .execute(conn)?;

    Ok(user)
}

pub fn username_taken(conn: &mut PgConnection, username: &str) -> AppResult<bool> {
    let count: i64 = users::table
        .filter(users::username.eq(username))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn email_taken(conn: &mut PgConnection, email: &str) -> AppResult<bool> {
    let count: i64 = users::table
        .filter(users::email.eq(email))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn set_banned(conn: &mut PgConnection, id: Uuid, banned: bool) -> AppResult<()> {
    let updated = diesel::update(users::table.find(id))
        .set(users::banned.eq(banned))
        .execute(conn)?;
    if updated == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    Ok(())
}

pub fn mark_verified(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let updated = diesel::update(users::table.find(id))
        .set(users::verified.eq(true))
        .execute(conn)?;
    if updated == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    Ok(())
}

pub fn set_password_hash(conn: &mut PgConnection, id: Uuid, hash: &str) -> AppResult<()> {
    let updated = diesel::update(users::table.find(id))
        .set(users::password_hash.eq(hash))
        .execute(conn)?;
    if updated == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    Ok(())
}
