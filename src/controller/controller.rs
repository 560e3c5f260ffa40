use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::answer::AnswerService;
use crate::error::{AnswerError, VoiceError};
use crate::recognition::{RecognitionAdapter, RecognitionEvent};
use crate::session::{Effect, Input, Session, SessionConfig, SessionSnapshot};

enum Message {
    Input(Input),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle used by presentation layers
///
/// Sends user inputs to the controller and observes the renderable state.
#[derive(Clone)]
pub struct ControllerHandle {
    inbox: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<SessionSnapshot>,
}

impl ControllerHandle {
    /// Queue an input for the controller
    ///
    /// Recognition events and replies only enter through the controller's own
    /// tasks; outside callers use the capture methods below.
    pub(crate) fn send(&self, input: Input) -> anyhow::Result<()> {
        self.inbox
            .send(Message::Input(input))
            .map_err(|_| anyhow::anyhow!("Controller is not running"))
    }

    pub fn toggle(&self) -> anyhow::Result<()> {
        self.send(Input::Toggle)
    }

    pub fn start_capture(&self) -> anyhow::Result<()> {
        self.send(Input::CaptureOn)
    }

    pub fn stop_capture(&self) -> anyhow::Result<()> {
        self.send(Input::CaptureOff)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every processed input
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Stop the capture (if any) and end the event loop
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(Message::Shutdown(tx))
            .map_err(|_| anyhow::anyhow!("Controller is not running"))?;
        rx.await
            .map_err(|_| anyhow::anyhow!("Controller exited before acknowledging shutdown"))
    }
}

/// Drives the session: one event loop, one mutation per message
///
/// Recognition events and request completions are funneled through the same
/// inbox as user inputs, so they are applied strictly one at a time.
pub struct InteractionController {
    session: Session,
    adapter: RecognitionAdapter,
    answers: Arc<dyn AnswerService>,
    request_timeout: Duration,
    inbox_tx: mpsc::UnboundedSender<Message>,
    inbox_rx: mpsc::UnboundedReceiver<Message>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl InteractionController {
    pub fn new(
        config: SessionConfig,
        adapter: RecognitionAdapter,
        answers: Arc<dyn AnswerService>,
        request_timeout: Duration,
    ) -> Self {
        let session = Session::new(config, adapter.is_available());
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(session.snapshot());

        Self {
            session,
            adapter,
            answers,
            request_timeout,
            inbox_tx,
            inbox_rx,
            state_tx,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            inbox: self.inbox_tx.clone(),
            state: self.state_tx.subscribe(),
        }
    }

    /// Spawn the event loop and return a handle to it
    pub fn spawn(self) -> ControllerHandle {
        let handle = self.handle();
        tokio::spawn(self.run());
        handle
    }

    /// Run the event loop until shutdown
    pub async fn run(mut self) {
        info!(
            "Interaction controller running (recognition: {}, capture enabled: {})",
            self.adapter.backend_name(),
            self.session.capture_enabled()
        );

        while let Some(message) = self.inbox_rx.recv().await {
            match message {
                Message::Input(input) => {
                    let effects = self.session.apply(input);
                    for effect in effects {
                        self.execute(effect).await;
                    }
                    self.state_tx.send_replace(self.session.snapshot());
                }
                Message::Shutdown(ack) => {
                    info!("Shutting down interaction controller");
                    if self.adapter.is_available() {
                        if let Err(e) = self.adapter.stop().await {
                            error!("Failed to stop capture: {}", e);
                        }
                    }
                    let _ = ack.send(());
                    break;
                }
            }
        }

        info!("Interaction controller stopped");
    }

    async fn execute(&mut self, effect: Effect) {
        debug!(?effect, "Executing effect");

        match effect {
            Effect::StartCapture { generation } => self.start_capture(generation).await,
            Effect::StopCapture => {
                if let Err(e) = self.adapter.stop().await {
                    error!("Failed to stop capture: {}", e);
                }
            }
            Effect::Dispatch { generation, text } => self.dispatch(generation, text),
        }
    }

    async fn start_capture(&mut self, generation: u64) {
        let inbox = self.inbox_tx.clone();

        let mut events = match self.adapter.start().await {
            Ok(Some(events)) => events,
            outcome => {
                let reason = match outcome {
                    Err(VoiceError::Recognition(reason)) => reason,
                    Err(e) => e.to_string(),
                    Ok(_) => "capture already active".to_string(),
                };
                error!("Failed to start capture: {}", reason);
                // Report like the platform would so the session settles
                for event in [RecognitionEvent::Error(reason), RecognitionEvent::Ended] {
                    let _ = inbox.send(Message::Input(Input::Recognition { generation, event }));
                }
                return;
            }
        };

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                debug!(?event, generation, "Recognition event");
                if inbox
                    .send(Message::Input(Input::Recognition { generation, event }))
                    .is_err()
                {
                    break;
                }
            }
        });
    }

    fn dispatch(&self, generation: u64, text: String) {
        let inbox = self.inbox_tx.clone();
        let answers = Arc::clone(&self.answers);
        let limit = self.request_timeout;

        info!(generation, "Asking: {}", text);

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(limit, answers.ask(&text)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AnswerError::Timeout(limit)),
            };

            match &outcome {
                Ok(_) => debug!(generation, "Answer request completed"),
                Err(e) => warn!(generation, "Answer request failed: {}", e),
            }

            let _ = inbox.send(Message::Input(Input::Reply {
                generation,
                outcome,
            }));
        });
    }
}
