use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod seed;
mod services;

use config::AppConfig;
use skal_shared::clients::db::{create_pool, DbPool};
use skal_shared::clients::email::EmailClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub email: EmailClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skal_shared::middleware::init_tracing("skal-api");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var so the shared auth extractor can read it
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url)?;
    let email = EmailClient::new(&config.resend_api_key, &config.from_email, "Skal");

    let state = Arc::new(AppState { db, config, email });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // account flows
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/verify/:token", post(routes::auth::verify_email))
        .route("/auth/verify-request", post(routes::auth::verify_request))
        .route("/auth/forgot-password", post(routes::auth::forgot_password))
        .route("/auth/reset-password", post(routes::auth::reset_password))
        // profiles
        .route("/me", get(routes::profile::get_me))
        .route("/me", patch(routes::profile::update_me))
        .route("/users/:username", get(routes::profile::get_user))
        .route("/users/:username/posts", get(routes::profile::get_user_posts))
        // social graph
        .route(
            "/follows/:username",
            post(routes::follows::follow_user)
                .delete(routes::follows::unfollow_user)
                .get(routes::follows::check_following),
        )
        .route("/following", get(routes::follows::list_following))
        .route("/followers", get(routes::follows::list_followers))
        // content
        .route("/posts", post(routes::posts::create_post))
        .route("/posts/:id", get(routes::posts::get_post))
        .route("/posts/:id/comments", post(routes::posts::create_comment))
        // engagement
        .route(
            "/likes/:kind/:id",
            post(routes::likes::like_target)
                .delete(routes::likes::unlike_target)
                .get(routes::likes::check_like),
        )
        // feeds
        .route("/feed", get(routes::feed::home_feed))
        .route("/feed/newest", get(routes::feed::newest_feed))
        // internal service-to-service endpoints (no auth)
        .route("/internal/users/:id/ban", post(routes::internal::ban_user).delete(routes::internal::unban_user))
        .route("/internal/seed", post(routes::internal::seed_data))
        .route("/internal/wipe", post(routes::internal::wipe_data))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "skal-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
