pub mod cost;
pub mod health;
pub mod tokens;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body. Token counting takes pasted documents.
/// Oversized bodies surface as a `Json` rejection, so they get the usual
/// `{ "error": .. }` shape.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/count-tokens", post(tokens::count_tokens))
        .route("/models", get(cost::list_models))
        .route("/cost", post(cost::compute))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
