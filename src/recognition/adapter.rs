use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{RecognitionBackend, RecognitionEvent};
use crate::error::{Result, VoiceError};

/// Uniform start/stop surface over a platform recognition backend
///
/// Availability is probed once at construction. When it is missing every
/// other operation fails with `CapabilityUnavailable` without touching the
/// backend.
pub struct RecognitionAdapter {
    backend: Box<dyn RecognitionBackend>,
    available: bool,
}

impl RecognitionAdapter {
    pub fn new(backend: Box<dyn RecognitionBackend>) -> Self {
        let available = backend.is_available();
        if available {
            info!("Recognition backend ready: {}", backend.name());
        } else {
            warn!("Recognition backend unavailable: {}", backend.name());
        }
        Self { backend, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Set the recognition locale before the next capture
    pub fn configure(&mut self, language: &str) -> Result<()> {
        if !self.available {
            return Err(VoiceError::CapabilityUnavailable);
        }
        info!("Recognition locale: {}", language);
        self.backend.configure(language);
        Ok(())
    }

    /// Begin a capture
    ///
    /// Returns `None` when a capture is already active; the platform is not
    /// invoked twice.
    pub async fn start(&mut self) -> Result<Option<mpsc::Receiver<RecognitionEvent>>> {
        if !self.available {
            return Err(VoiceError::CapabilityUnavailable);
        }
        if self.backend.is_capturing() {
            warn!("Capture already active, ignoring start");
            return Ok(None);
        }

        self.backend
            .start()
            .await
            .map(Some)
            .map_err(|e| VoiceError::Recognition(format!("{:#}", e)))
    }

    /// End the active capture early. Safe to call when not listening.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.available {
            return Err(VoiceError::CapabilityUnavailable);
        }
        if !self.backend.is_capturing() {
            return Ok(());
        }

        self.backend
            .stop()
            .await
            .map_err(|e| VoiceError::Recognition(format!("{:#}", e)))
    }

    pub fn is_capturing(&self) -> bool {
        self.available && self.backend.is_capturing()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
