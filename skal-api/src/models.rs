use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use skal_shared::errors::{AppError, ErrorCode};

use crate::schema::{comments, follows, likes, posts, users};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    pub about_me: Option<String>,
    pub verified: bool,
    pub banned: bool,
    pub last_seen: DateTime<Utc>,
    pub show_last_seen: bool,
    pub old_username: Option<String>,
    pub username_changed_at: DateTime<Utc>,
    pub post_count: i32,
    pub clout: i32,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_AVATAR: &str = "helmet.png";
pub const AVATARS: [&str; 3] = ["helmet.png", "axe.png", "ship.png"];

impl User {
    pub fn avatar_url(&self) -> String {
        format!("/static/avatars/{}", self.avatar)
    }
}

/// What other users get to see of a profile. `last_seen` honors the
/// owner's visibility flag; email and credentials never leave the server.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub avatar_url: String,
    pub about_me: Option<String>,
    pub verified: bool,
    pub post_count: i32,
    pub clout: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        let last_seen = user.show_last_seen.then_some(user.last_seen);
        let avatar_url = user.avatar_url();
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            avatar_url,
            about_me: user.about_me,
            verified: user.verified,
            post_count: user.post_count,
            clout: user.clout,
            last_seen,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub verified: bool,
    pub banned: bool,
    pub last_seen: DateTime<Utc>,
    pub show_last_seen: bool,
    pub username_changed_at: DateTime<Utc>,
    pub post_count: i32,
    pub clout: i32,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            avatar: DEFAULT_AVATAR.to_string(),
            verified: false,
            banned: false,
            last_seen: now,
            show_last_seen: true,
            username_changed_at: now,
            post_count: 0,
            clout: 0,
            created_at: now,
        }
    }
}

// --- Follow edge ---

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewFollow {
    pub fn new(follower_id: Uuid, followed_id: Uuid) -> Self {
        Self {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        }
    }
}

// --- Post ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(user_id: Uuid, body: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }
}

// --- Comment ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(user_id: Uuid, post_id: Uuid, body: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }
}

// --- Like edge ---

/// What a like points at. Exactly one of the two, by construction; the
/// invalid "both" and "neither" column states cannot be expressed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LikeTarget {
    Post(Uuid),
    Comment(Uuid),
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Decodes the two nullable columns back into the tagged target. A row
    /// violating the XOR invariant is reported, not replicated.
    pub fn target(&self) -> Result<LikeTarget, AppError> {
        match (self.post_id, self.comment_id) {
            (Some(post_id), None) => Ok(LikeTarget::Post(post_id)),
            (None, Some(comment_id)) => Ok(LikeTarget::Comment(comment_id)),
            _ => Err(AppError::new(
                ErrorCode::InvalidLikeTarget,
                format!("like {} does not reference exactly one target", self.id),
            )),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NewLike {
    pub fn for_target(user_id: Uuid, target: LikeTarget) -> Self {
        let (post_id, comment_id) = match target {
            LikeTarget::Post(id) => (Some(id), None),
            LikeTarget::Comment(id) => (None, Some(id)),
        };
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            comment_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like_row(post_id: Option<Uuid>, comment_id: Option<Uuid>) -> Like {
        Like {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            post_id,
            comment_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn like_target_round_trips_for_posts() {
        let post = Uuid::new_v4();
        let new = NewLike::for_target(Uuid::new_v4(), LikeTarget::Post(post));
        assert_eq!(new.post_id, Some(post));
        assert_eq!(new.comment_id, None);

        let row = like_row(new.post_id, new.comment_id);
        assert_eq!(row.target().unwrap(), LikeTarget::Post(post));
    }

    #[test]
    fn like_target_round_trips_for_comments() {
        let comment = Uuid::new_v4();
        let new = NewLike::for_target(Uuid::new_v4(), LikeTarget::Comment(comment));
        assert_eq!(new.post_id, None);
        assert_eq!(new.comment_id, Some(comment));

        let row = like_row(new.post_id, new.comment_id);
        assert_eq!(row.target().unwrap(), LikeTarget::Comment(comment));
    }

    #[test]
    fn corrupt_like_rows_are_rejected() {
        assert!(like_row(None, None).target().is_err());
        assert!(like_row(Some(Uuid::new_v4()), Some(Uuid::new_v4())).target().is_err());
    }
}
