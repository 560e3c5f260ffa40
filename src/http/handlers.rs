use super::state::AppState;
use crate::error::VoiceError;
use crate::session::Input;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Queue a capture input and reply with the snapshot at acceptance time
///
/// The input is applied asynchronously, so the returned snapshot reflects the
/// state before it takes effect. Poll `GET /session` for the outcome.
fn accept(state: &AppState, input: Input) -> axum::response::Response {
    let snapshot = state.controller.snapshot();
    if !snapshot.capture_enabled {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            VoiceError::CapabilityUnavailable.to_string(),
        );
    }

    info!(?input, "Capture request accepted");

    match state.controller.send(input) {
        Ok(()) => (StatusCode::ACCEPTED, Json(snapshot)).into_response(),
        Err(e) => {
            error!("Failed to queue capture input: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /session
/// Current renderable snapshot
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.controller.snapshot()))
}

/// POST /session/capture/start
pub async fn start_capture(State(state): State<AppState>) -> impl IntoResponse {
    accept(&state, Input::CaptureOn)
}

/// POST /session/capture/stop
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    accept(&state, Input::CaptureOff)
}

/// POST /session/capture/toggle
pub async fn toggle_capture(State(state): State<AppState>) -> impl IntoResponse {
    accept(&state, Input::Toggle)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
