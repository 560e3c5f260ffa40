use super::config::{RecognitionErrorPolicy, SessionConfig};
use super::snapshot::SessionSnapshot;
use crate::error::{AnswerError, VoiceError};
use crate::recognition::RecognitionEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Phase of the voice interaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No capture active, no pending request
    #[default]
    Idle,
    /// Capture requested or in progress
    Listening,
    /// Transcript dispatched, waiting for the answer
    Processing,
    /// Answer available until the next capture
    Answered,
    /// Error message available until the next capture
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Listening => "listening",
            Phase::Processing => "processing",
            Phase::Answered => "answered",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Something that happened to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// User asked to start capturing
    CaptureOn,
    /// User asked to stop capturing
    CaptureOff,
    /// Single capture button: off while listening, on otherwise
    Toggle,
    /// Event from the capture started for `generation`
    Recognition {
        generation: u64,
        event: RecognitionEvent,
    },
    /// Completion of the request dispatched for `generation`
    Reply {
        generation: u64,
        outcome: Result<String, AnswerError>,
    },
}

/// Work the session asks its driver to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a capture whose events belong to `generation`
    StartCapture { generation: u64 },
    /// Stop the active capture
    StopCapture,
    /// Send `text` to the answer service on behalf of `generation`
    Dispatch { generation: u64, text: String },
}

/// The single voice interaction
///
/// All mutation goes through [`Session::apply`], which returns the effects the
/// caller must carry out. Requests and capture events are tagged with the
/// generation that produced them; anything older than the current generation
/// is dropped.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    available: bool,
    phase: Phase,
    transcript: Option<String>,
    answer: Option<String>,
    error_message: Option<String>,
    notice: Option<String>,
    generation: u64,
    /// Generation of the capture that has started but not yet ended
    live_capture: Option<u64>,
    /// Generation of the most recent capture actually started
    started_capture: Option<u64>,
    stop_requested: bool,
    result_received: bool,
    updated_at: chrono::DateTime<Utc>,
}

impl Session {
    /// Create the session. `available` is the recognition capability probe.
    pub fn new(config: SessionConfig, available: bool) -> Self {
        let notice = if available {
            None
        } else {
            warn!("{}", VoiceError::CapabilityUnavailable);
            Some(VoiceError::CapabilityUnavailable.to_string())
        };

        Self {
            config,
            available,
            phase: Phase::Idle,
            transcript: None,
            answer: None,
            error_message: None,
            notice,
            generation: 0,
            live_capture: None,
            started_capture: None,
            stop_requested: false,
            result_received: false,
            updated_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn capture_enabled(&self) -> bool {
        self.available
    }

    /// Whether a capture has been started and has not reported its end
    pub fn capture_active(&self) -> bool {
        self.live_capture.is_some()
    }

    /// Apply one input and return the effects to perform, in order
    pub fn apply(&mut self, input: Input) -> Vec<Effect> {
        if !self.available {
            debug!(?input, "Capture disabled, ignoring input");
            return Vec::new();
        }

        let before = self.phase;
        let effects = match input {
            Input::Toggle if self.phase == Phase::Listening => self.capture_off(),
            Input::Toggle | Input::CaptureOn => self.capture_on(),
            Input::CaptureOff => self.capture_off(),
            Input::Recognition { generation, event } => self.on_recognition(generation, event),
            Input::Reply {
                generation,
                outcome,
            } => self.on_reply(generation, outcome),
        };

        if before != self.phase {
            info!("Session {} -> {} (generation {})", before, self.phase, self.generation);
        }
        self.updated_at = Utc::now();

        effects
    }

    /// Renderable view of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            status: self.config.labels.label(self.phase, self.available).to_string(),
            transcript: self.transcript.clone(),
            answer: self.answer.clone(),
            error: self.error_message.clone(),
            notice: self.notice.clone(),
            generation: self.generation,
            capture_enabled: self.available,
            updated_at: self.updated_at,
        }
    }

    fn capture_on(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Listening {
            debug!("Already listening");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.live_capture.is_some() {
            effects.push(Effect::StopCapture);
        }

        self.generation += 1;
        self.transcript = None;
        self.answer = None;
        self.error_message = None;
        self.notice = None;
        self.stop_requested = false;
        self.result_received = false;
        self.live_capture = Some(self.generation);
        self.started_capture = Some(self.generation);
        self.phase = Phase::Listening;

        effects.push(Effect::StartCapture {
            generation: self.generation,
        });
        effects
    }

    fn capture_off(&mut self) -> Vec<Effect> {
        let stop = if self.live_capture.is_some() {
            vec![Effect::StopCapture]
        } else {
            Vec::new()
        };

        match self.phase {
            Phase::Listening => {
                self.stop_requested = true;
                // Leaves Listening when the platform reports the end
                if self.live_capture.is_none() {
                    self.phase = Phase::Idle;
                }
            }
            Phase::Processing => {
                // Abandon the in-flight request; its reply will be stale
                self.generation += 1;
                self.phase = Phase::Idle;
            }
            Phase::Answered | Phase::Failed => {
                self.answer = None;
                self.error_message = None;
                self.phase = Phase::Idle;
            }
            Phase::Idle => {}
        }

        stop
    }

    fn on_recognition(&mut self, generation: u64, event: RecognitionEvent) -> Vec<Effect> {
        if event == RecognitionEvent::Ended && self.live_capture == Some(generation) {
            self.live_capture = None;
        }

        if generation != self.generation {
            debug!(?event, generation, current = self.generation, "Dropping event from old capture");
            return Vec::new();
        }

        match event {
            RecognitionEvent::Started => {
                debug!("Platform is recording");
                Vec::new()
            }
            RecognitionEvent::Result(text) => self.on_result(text),
            RecognitionEvent::Error(reason) => {
                self.on_error(reason);
                Vec::new()
            }
            RecognitionEvent::Ended => {
                if self.phase == Phase::Listening {
                    self.phase = Phase::Idle;
                }
                Vec::new()
            }
        }
    }

    fn on_result(&mut self, text: String) -> Vec<Effect> {
        if self.stop_requested {
            debug!("Capture was stopped, discarding result");
            return Vec::new();
        }
        if self.started_capture != Some(self.generation) {
            warn!(generation = self.generation, "No capture was started, ignoring result");
            return Vec::new();
        }
        if self.result_received {
            warn!("Ignoring additional result for generation {}", self.generation);
            return Vec::new();
        }
        // Idle here means the end arrived before the result
        if !matches!(self.phase, Phase::Listening | Phase::Idle) {
            return Vec::new();
        }

        self.result_received = true;

        let text = text.trim();
        if text.is_empty() {
            info!("Empty utterance, nothing to ask");
            self.transcript = Some(String::new());
            self.phase = Phase::Idle;
            return Vec::new();
        }

        self.transcript = Some(text.to_string());
        self.phase = Phase::Processing;

        vec![Effect::Dispatch {
            generation: self.generation,
            text: text.to_string(),
        }]
    }

    fn on_error(&mut self, reason: String) {
        if self.phase != Phase::Listening {
            return;
        }
        if self.stop_requested {
            debug!(%reason, "Recognition error after stop");
            return;
        }

        self.result_received = true;
        let message = VoiceError::Recognition(reason).to_string();
        warn!("{}", message);

        match self.config.recognition_errors {
            RecognitionErrorPolicy::Reset => {
                self.notice = Some(message);
                self.phase = Phase::Idle;
            }
            RecognitionErrorPolicy::Surface => {
                self.error_message = Some(message);
                self.phase = Phase::Failed;
            }
        }
    }

    fn on_reply(&mut self, generation: u64, outcome: Result<String, AnswerError>) -> Vec<Effect> {
        if generation != self.generation || self.phase != Phase::Processing {
            warn!(
                generation,
                current = self.generation,
                "Discarding stale answer"
            );
            return Vec::new();
        }

        match outcome {
            Ok(answer) => {
                self.answer = Some(answer);
                self.phase = Phase::Answered;
            }
            Err(e) => {
                self.error_message = Some(e.to_string());
                self.phase = Phase::Failed;
            }
        }

        Vec::new()
    }
}
