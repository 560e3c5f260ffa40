//! HTTP control API for presentation layers
//!
//! This module exposes the session state and capture controls:
//! - GET /session - Current renderable snapshot
//! - POST /session/capture/start - Begin a capture
//! - POST /session/capture/stop - End the active capture
//! - POST /session/capture/toggle - Single-button toggle
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
