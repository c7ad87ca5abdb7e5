use axum::Json;

use skal_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("skal-api", env!("CARGO_PKG_VERSION")))
}
