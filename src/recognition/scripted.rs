// Scripted recognition backend: replays canned event sequences

use anyhow::{bail, Result};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::backend::{RecognitionBackend, RecognitionBackendConfig, RecognitionEvent};

/// Backend that replays one scripted event sequence per capture
///
/// A script that does not contain `Ended` leaves the capture open until
/// `stop()` is called, which then emits `Ended` like a real platform would.
pub struct ScriptedBackend {
    config: RecognitionBackendConfig,
    scripts: VecDeque<Vec<RecognitionEvent>>,
    available: bool,
    live: Option<mpsc::Sender<RecognitionEvent>>,
    starts: usize,
}

impl ScriptedBackend {
    pub fn new(scripts: Vec<Vec<RecognitionEvent>>) -> Self {
        Self {
            config: RecognitionBackendConfig::default(),
            scripts: scripts.into(),
            available: true,
            live: None,
            starts: 0,
        }
    }

    /// A backend reporting that the host has no recognition capability
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_config(mut self, config: RecognitionBackendConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of times `start` reached the backend
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Currently configured locale
    pub fn language(&self) -> &str {
        &self.config.language
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for ScriptedBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn configure(&mut self, language: &str) {
        self.config.language = language.to_string();
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<RecognitionEvent>> {
        if !self.available {
            bail!("Scripted backend is unavailable");
        }
        if self.live.is_some() {
            bail!("Already capturing");
        }

        self.starts += 1;

        let script = self.scripts.pop_front().unwrap_or_else(|| {
            vec![RecognitionEvent::Started, RecognitionEvent::Ended]
        });
        let capacity = self.config.event_buffer.max(script.len() + 1);
        let (tx, rx) = mpsc::channel(capacity);

        let ended = script.contains(&RecognitionEvent::Ended);
        for event in script {
            debug!(?event, "Replaying scripted recognition event");
            tx.try_send(event)?;
        }

        if !ended {
            self.live = Some(tx);
        }

        info!("Scripted capture #{} started ({})", self.starts, self.config.language);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.live.take() {
            info!("Stopping scripted capture");
            if tx.try_send(RecognitionEvent::Ended).is_err() {
                debug!("Capture listener already gone");
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.live.is_some()
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}
