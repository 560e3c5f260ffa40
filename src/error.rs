//! Error taxonomy for voice interactions
//!
//! Every kind here is terminal to the current capture cycle only. None of them
//! is fatal to the process.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for voice-qa operations
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Errors surfaced by the recognition adapter and the interaction controller
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoiceError {
    /// No native speech recognition exists on this host
    #[error("speech recognition is not available on this host")]
    CapabilityUnavailable,

    /// The recognition platform failed to produce an utterance
    #[error("speech recognition failed: {0}")]
    Recognition(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures of a single answer request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnswerError {
    /// The service answered with an explicit error message
    ///
    /// Displayed verbatim so the user sees exactly what the service said.
    #[error("{0}")]
    Service(String),

    /// Transport-level failure or non-success HTTP status
    #[error("request failed: {0}")]
    Request(String),

    /// Response body carried neither `answer` nor `error`
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No response within the configured bound
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for AnswerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AnswerError::MalformedResponse(err.to_string())
        } else {
            AnswerError::Request(err.to_string())
        }
    }
}
