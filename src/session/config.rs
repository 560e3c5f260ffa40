use serde::{Deserialize, Serialize};

use super::session::Phase;

/// How a platform recognition failure is shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorPolicy {
    /// Return to `Idle` and keep the reason as a transient notice
    #[default]
    Reset,
    /// Enter `Failed` with the reason as the error message
    Surface,
}

/// Status label shown for each phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub idle: String,
    pub listening: String,
    pub processing: String,
    pub answered: String,
    pub failed: String,
    /// Shown instead of everything else when capture is disabled
    pub unavailable: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            idle: "Tap to talk".to_string(),
            listening: "Listening...".to_string(),
            processing: "Thinking...".to_string(),
            answered: "Tap to ask again".to_string(),
            failed: "Something went wrong".to_string(),
            unavailable: "Speech recognition unavailable".to_string(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, phase: Phase, capture_enabled: bool) -> &str {
        if !capture_enabled {
            return &self.unavailable;
        }
        match phase {
            Phase::Idle => &self.idle,
            Phase::Listening => &self.listening,
            Phase::Processing => &self.processing,
            Phase::Answered => &self.answered,
            Phase::Failed => &self.failed,
        }
    }
}

/// Configuration for the interaction session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Policy for `onError` while listening
    pub recognition_errors: RecognitionErrorPolicy,

    /// Labels rendered for each phase
    pub labels: StatusLabels,
}
