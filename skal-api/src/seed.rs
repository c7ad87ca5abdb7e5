use diesel::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use skal_shared::errors::AppResult;

use crate::models::{LikeTarget, NewComment, NewPost, NewUser, AVATARS};
use crate::schema::{comments, follows, likes, posts, users};
use crate::services::{auth_service, engagement_service, follow_service, stats_service};

const NAMES: [&str; 40] = [
    "Abigail", "Alice", "Amber", "Amelia", "Ava", "Brooke", "Charlotte", "Chloe", "Daisy",
    "Elizabeth", "Emily", "Emma", "Erin", "Freya", "Grace", "Hannah", "Isabella", "Jessica",
    "Katie", "Lucy", "Mia", "Olivia", "Phoebe", "Ruby", "Sophie", "Adam", "Alexander", "Benjamin",
    "Charlie", "Daniel", "Edward", "George", "Harry", "Isaac", "Jack", "James", "Liam", "Noah",
    "Oliver", "Thomas",
];

const WORDS: [&str; 24] = [
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud",
];

fn generate_words(rng: &mut impl Rng, count: usize) -> String {
    (0..count.max(1))
        .map(|_| *WORDS.choose(rng).unwrap_or(&WORDS[0]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Populates the store with a roster of verified users plus random posts,
/// follows, comments and likes, then recomputes everyone's stats. Test
/// data only; never wired into the public surface.
pub fn seed(conn: &mut PgConnection) -> AppResult<SeedSummary> {
    let mut rng = rand::thread_rng();

    let password_hash = auth_service::hash_password("password")?;

    let mut user_ids: Vec<Uuid> = Vec::with_capacity(NAMES.len());
    for name in NAMES {
        let existing: i64 = users::table
            .filter(users::username.eq(name))
            .count()
            .get_result(conn)?;
        let username = if existing > 0 {
            format!("{name}{}", rng.gen_range(0..100))
        } else {
            name.to_string()
        };

        let email = format!("{}@luther.edu", username.to_lowercase());
        let mut new_user = NewUser::new(&username, &email, password_hash.clone());
        new_user.avatar = AVATARS.choose(&mut rng).unwrap_or(&AVATARS[0]).to_string();
        new_user.verified = true;

        let about_len = rng.gen_range(0..23);
        if about_len > 0 {
            // about_me column caps at 140 chars
            let mut about = generate_words(&mut rng, about_len);
            about.truncate(140);
            diesel::insert_into(users::table)
                .values((&new_user, users::about_me.eq(about)))
                .execute(conn)?;
        } else {
            diesel::insert_into(users::table)
                .values(&new_user)
                .execute(conn)?;
        }
        user_ids.push(new_user.id);
    }

    let mut post_ids: Vec<Uuid> = Vec::new();
    for &user_id in &user_ids {
        for _ in 0..5 {
            let word_count = rng.gen_range(4..40);
            let body = generate_words(&mut rng, word_count);
            let new_post = NewPost::new(user_id, &body);
            diesel::insert_into(posts::table)
                .values(&new_post)
                .execute(conn)?;
            post_ids.push(new_post.id);
        }
    }

    for &user_id in &user_ids {
        for _ in 0..5 {
            let target = *user_ids.choose(&mut rng).unwrap_or(&user_id);
            if target != user_id {
                follow_service::follow(conn, user_id, target)?;
            }
        }
    }

    let mut comment_ids: Vec<Uuid> = Vec::new();
    for &user_id in &user_ids {
        for _ in 0..5 {
            if let Some(&post_id) = post_ids.choose(&mut rng) {
                let word_count = rng.gen_range(1..15);
                let body = generate_words(&mut rng, word_count);
                let new_comment = NewComment::new(user_id, post_id, &body);
                diesel::insert_into(comments::table)
                    .values(&new_comment)
                    .execute(conn)?;
                comment_ids.push(new_comment.id);
            }
        }
    }

    for &user_id in &user_ids {
        for _ in 0..5 {
            if let Some(&post_id) = post_ids.choose(&mut rng) {
                engagement_service::like(conn, user_id, LikeTarget::Post(post_id))?;
            }
            if let Some(&comment_id) = comment_ids.choose(&mut rng) {
                engagement_service::like(conn, user_id, LikeTarget::Comment(comment_id))?;
            }
        }
    }

    for &user_id in &user_ids {
        stats_service::recompute(conn, user_id)?;
    }

    tracing::info!(
        users = user_ids.len(),
        posts = post_ids.len(),
        comments = comment_ids.len(),
        "seed data created"
    );

    Ok(SeedSummary {
        users: user_ids.len(),
        posts: post_ids.len(),
        comments: comment_ids.len(),
    })
}

#[derive(Debug, serde::Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

/// Deletes all rows, children first.
pub fn wipe(conn: &mut PgConnection) -> AppResult<()> {
    diesel::delete(likes::table).execute(conn)?;
    diesel::delete(comments::table).execute(conn)?;
    diesel::delete(posts::table).execute(conn)?;
    diesel::delete(follows::table).execute(conn)?;
    diesel::delete(users::table).execute(conn)?;

    tracing::warn!("all store data wiped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_bodies_have_requested_word_count() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let count = rng.gen_range(1..40);
            let body = generate_words(&mut rng, count);
            assert_eq!(body.split(' ').count(), count);
        }
    }

    #[test]
    fn zero_word_request_still_yields_a_body() {
        let mut rng = rand::thread_rng();
        assert!(!generate_words(&mut rng, 0).is_empty());
    }
}
