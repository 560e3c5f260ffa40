use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::Phase;

/// Renderable view of the session, published after every input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: Phase,

    /// Status label for the current phase
    pub status: String,

    /// Most recent recognized utterance
    pub transcript: Option<String>,

    /// Most recent answer; only present while `Answered`
    pub answer: Option<String>,

    /// Failure description; only present while `Failed`
    pub error: Option<String>,

    /// Transient, non-fatal message (recognition hiccup, capability missing)
    pub notice: Option<String>,

    /// Current capture generation
    pub generation: u64,

    /// Whether capture controls should be enabled
    pub capture_enabled: bool,

    /// When the session last changed
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn is_listening(&self) -> bool {
        self.phase == Phase::Listening
    }
}
