pub mod auth_service;
pub mod engagement_service;
pub mod feed_service;
pub mod follow_service;
pub mod stats_service;
pub mod token_service;
pub mod user_service;
