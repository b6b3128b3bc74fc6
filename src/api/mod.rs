mod dto;
mod handlers;
mod state;

pub use handlers::{APOLOGY_REPLY, EMPTY_QUESTION_REPLY};
pub use state::AppState;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router. Cross-origin access is restricted to the
/// single configured origin, all methods and headers allowed.
pub fn router(state: Arc<AppState>) -> Router {
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            tracing::warn!(
                origin = %state.config.allowed_origin,
                "invalid ALLOWED_ORIGIN, falling back to http://localhost:3000"
            );
            HeaderValue::from_static("http://localhost:3000")
        });

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/categories", get(handlers::categories))
        .route("/brands", get(handlers::brands))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
