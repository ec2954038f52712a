pub mod auth;
pub mod blog;
pub mod contact;
pub mod health;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/test", get(health::diagnostics))
        .merge(auth::router())
        .merge(blog::router())
        .merge(contact::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
