use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::command::CommandBackend;
use super::scripted::ScriptedBackend;

/// Default BCP-47 locale handed to the recognizer
pub const DEFAULT_LANGUAGE: &str = "th-TH";

/// Lifecycle and result events emitted by a recognition backend
///
/// Per capture: `Started` comes first, then at most one of `Result`/`Error`,
/// and `Ended` exactly once. `Result` and `Ended` may arrive in either order
/// on some platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RecognitionEvent {
    /// Platform is actively recording
    Started,
    /// Capture stopped for any reason
    Ended,
    /// A recognized utterance (may be empty)
    Result(String),
    /// Platform failed to recognize (permission denied, no speech, ...)
    Error(String),
}

/// Configuration for recognition backends
#[derive(Debug, Clone)]
pub struct RecognitionBackendConfig {
    /// BCP-47 language tag, e.g. "th-TH"
    pub language: String,
    /// Capacity of the event channel returned by `start`
    pub event_buffer: usize,
}

impl Default for RecognitionBackendConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            event_buffer: 16,
        }
    }
}

/// Speech recognition backend trait
///
/// Implementations:
/// - Command: runs a host speech-to-text program for each capture
/// - Scripted: replays canned event sequences (testing/demos)
/// - Unavailable: no recognition on this host
#[async_trait::async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Whether the host provides this recognition capability
    fn is_available(&self) -> bool;

    /// Set the recognition locale. Takes effect on the next `start`.
    fn configure(&mut self, language: &str);

    /// Begin listening
    ///
    /// Returns a channel receiver that yields the events of this capture
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognitionEvent>>;

    /// End listening early. No-op when not capturing.
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Recognition source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum RecognitionSource {
    /// Host speech-to-text program; `{lang}` in args is replaced by the locale
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Canned event sequences, one per capture
    Scripted {
        #[serde(default)]
        scripts: Vec<Vec<RecognitionEvent>>,
    },
    /// No recognition capability
    #[default]
    None,
}

/// Recognition backend factory
pub struct RecognitionBackendFactory;

impl RecognitionBackendFactory {
    /// Create a recognition backend for the configured source
    pub fn create(
        source: RecognitionSource,
        config: RecognitionBackendConfig,
    ) -> Box<dyn RecognitionBackend> {
        match source {
            RecognitionSource::Command { program, args } => {
                Box::new(CommandBackend::new(program, args, config))
            }
            RecognitionSource::Scripted { scripts } => {
                Box::new(ScriptedBackend::new(scripts).with_config(config))
            }
            RecognitionSource::None => Box::new(ScriptedBackend::unavailable()),
        }
    }
}
