//! Voice interaction session
//!
//! This module provides the `Session` state machine that owns:
//! - The interaction phase (idle, listening, processing, answered, failed)
//! - Transcript, answer, and error fields for rendering
//! - Capture generations used to drop stale events and replies
//! - The renderable `SessionSnapshot`

mod config;
mod session;
mod snapshot;

pub use config::{RecognitionErrorPolicy, SessionConfig, StatusLabels};
pub use session::{Effect, Input, Phase, Session};
pub use snapshot::SessionSnapshot;
