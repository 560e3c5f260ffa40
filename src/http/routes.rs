use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Renderable state
        .route("/session", get(handlers::get_session))
        // Capture control
        .route("/session/capture/start", post(handlers::start_capture))
        .route("/session/capture/stop", post(handlers::stop_capture))
        .route("/session/capture/toggle", post(handlers::toggle_capture))
        // Browser front-ends poll from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
