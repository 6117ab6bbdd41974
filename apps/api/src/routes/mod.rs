pub mod health;

use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;

use crate::assessment::handlers::handle_generate;
use crate::document::handlers::handle_fill;
use crate::state::AppState;

/// Directory holding the static form frontend.
const PUBLIC_DIR: &str = "public";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/generate", post(handle_generate))
        .route("/api/fill", post(handle_fill))
        .fallback_service(ServeDir::new(PUBLIC_DIR))
        .with_state(state)
}
