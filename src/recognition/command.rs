// Host speech-to-text program backend
//
// Each capture spawns the configured program. Whatever it prints on stdout is
// the utterance; a non-zero exit is a recognition failure described by stderr.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::{RecognitionBackend, RecognitionBackendConfig, RecognitionEvent};

/// Placeholder in program arguments replaced by the configured locale
pub const LANGUAGE_PLACEHOLDER: &str = "{lang}";

/// Recognition backend driving an external speech-to-text program
pub struct CommandBackend {
    config: RecognitionBackendConfig,
    program: String,
    args: Vec<String>,
    capturing: Arc<AtomicBool>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CommandBackend {
    pub fn new(program: String, args: Vec<String>, config: RecognitionBackendConfig) -> Self {
        Self {
            config,
            program,
            args,
            capturing: Arc::new(AtomicBool::new(false)),
            cancel: None,
            task: None,
        }
    }

    /// Arguments with the locale placeholder substituted
    pub fn resolved_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(LANGUAGE_PLACEHOLDER, &self.config.language))
            .collect()
    }

    /// Executable the capture would run, if it can be found
    fn resolve_program(&self) -> Option<PathBuf> {
        if self.program.is_empty() {
            return None;
        }
        which::which(&self.program).ok()
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for CommandBackend {
    fn is_available(&self) -> bool {
        self.resolve_program().is_some()
    }

    fn configure(&mut self, language: &str) {
        self.config.language = language.to_string();
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<RecognitionEvent>> {
        if self.capturing.load(Ordering::SeqCst) {
            bail!("Already capturing");
        }

        let program = self
            .resolve_program()
            .with_context(|| format!("Recognizer program not found: {}", self.program))?;
        let args = self.resolved_args();

        info!("Starting recognizer: {} {:?}", program.display(), args);

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program.display()))?;

        let stdout = child.stdout.take().context("Recognizer stdout not captured")?;
        let stderr = child.stderr.take().context("Recognizer stderr not captured")?;

        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(4));
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        self.capturing.store(true, Ordering::SeqCst);
        self.cancel = Some(cancel_tx);

        let capturing = Arc::clone(&self.capturing);
        let task = tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started).await;

            let stdout_task = tokio::spawn(read_to_string(stdout));
            let stderr_task = tokio::spawn(read_to_string(stderr));

            let status = tokio::select! {
                status = child.wait() => Some(status),
                _ = &mut cancel_rx => None,
            };

            let event = match status {
                None => {
                    info!("Recognizer cancelled");
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill recognizer: {}", e);
                    }
                    None
                }
                Some(Err(e)) => {
                    error!("Failed to wait for recognizer: {}", e);
                    Some(RecognitionEvent::Error(e.to_string()))
                }
                Some(Ok(status)) if status.success() => {
                    let text = stdout_task.await.unwrap_or_default();
                    Some(RecognitionEvent::Result(text.trim().to_string()))
                }
                Some(Ok(status)) => {
                    let reason = stderr_task.await.unwrap_or_default();
                    let reason = reason.trim();
                    warn!("Recognizer exited with {}: {}", status, reason);
                    Some(RecognitionEvent::Error(if reason.is_empty() {
                        format!("recognizer exited with {}", status)
                    } else {
                        reason.to_string()
                    }))
                }
            };

            capturing.store(false, Ordering::SeqCst);

            if let Some(event) = event {
                let _ = tx.send(event).await;
            }
            let _ = tx.send(RecognitionEvent::Ended).await;
        });
        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(cancel) = self.cancel.take() {
            if self.capturing.load(Ordering::SeqCst) {
                info!("Stopping recognizer");
                let _ = cancel.send(());
            }
        }

        // Wait for the capture task so a following start sees a clean slate
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Recognizer task panicked: {}", e);
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "Command"
    }
}

async fn read_to_string<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut out = String::new();
    if let Err(e) = reader.read_to_string(&mut out).await {
        warn!("Failed to read recognizer output: {}", e);
    }
    out
}
