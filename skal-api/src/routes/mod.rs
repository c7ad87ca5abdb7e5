pub mod auth;
pub mod feed;
pub mod follows;
pub mod health;
pub mod internal;
pub mod likes;
pub mod posts;
pub mod profile;
