// Integration tests for the interaction controller
//
// The controller runs its real event loop with a scripted recognizer and an
// in-memory answer service, and the tests observe the published snapshots.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use voice_qa::recognition::ScriptedBackend;
use voice_qa::{
    AnswerError, AnswerService, ControllerHandle, InteractionController, Phase,
    RecognitionAdapter, RecognitionEvent, SessionConfig, SessionSnapshot,
};

/// Answer service returning queued outcomes, optionally held behind a gate
#[derive(Default)]
struct FakeAnswers {
    outcomes: Mutex<VecDeque<Result<String, AnswerError>>>,
    gates: Mutex<VecDeque<Arc<Notify>>>,
    questions: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeAnswers {
    fn new(outcomes: Vec<Result<&str, AnswerError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|o| o.map(str::to_string))
                    .collect(),
            ),
            ..Default::default()
        })
    }

    /// Hold the next request until the returned notify fires
    async fn gate_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().await.push_back(Arc::clone(&gate));
        gate
    }
}

#[async_trait::async_trait]
impl AnswerService for FakeAnswers {
    async fn ask(&self, text: &str) -> Result<String, AnswerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.questions.lock().await.push(text.to_string());

        let gate = self.gates.lock().await.pop_front();
        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AnswerError::Request("no scripted outcome".into())));

        if let Some(gate) = gate {
            gate.notified().await;
        }
        outcome
    }
}

fn spawn(
    backend: ScriptedBackend,
    answers: Arc<FakeAnswers>,
    timeout: Duration,
) -> ControllerHandle {
    InteractionController::new(
        SessionConfig::default(),
        RecognitionAdapter::new(Box::new(backend)),
        answers,
        timeout,
    )
    .spawn()
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionSnapshot>,
    predicate: impl FnMut(&SessionSnapshot) -> bool,
) -> Result<SessionSnapshot> {
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate)).await??;
    Ok(snapshot.clone())
}

#[tokio::test]
async fn test_answer_is_rendered() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![
        RecognitionEvent::Started,
        RecognitionEvent::Result("what time is it".into()),
        RecognitionEvent::Ended,
    ]]);
    let answers = FakeAnswers::new(vec![Ok("3 PM")]);
    let controller = spawn(backend, Arc::clone(&answers), Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    let snapshot = wait_for(&mut rx, |s| s.phase == Phase::Answered).await?;

    assert_eq!(snapshot.answer.as_deref(), Some("3 PM"));
    assert_eq!(snapshot.transcript.as_deref(), Some("what time is it"));
    assert_eq!(*answers.questions.lock().await, vec!["what time is it"]);

    controller.shutdown().await
}

#[tokio::test]
async fn test_recognition_error_returns_to_idle() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![
        RecognitionEvent::Started,
        RecognitionEvent::Error("no-speech".into()),
        RecognitionEvent::Ended,
    ]]);
    let answers = FakeAnswers::new(Vec::new());
    let controller = spawn(backend, Arc::clone(&answers), Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.start_capture()?;
    let snapshot = wait_for(&mut rx, |s| s.generation == 1 && s.phase == Phase::Idle).await?;

    assert!(snapshot.transcript.is_none());
    assert!(snapshot.error.is_none());
    assert!(snapshot.notice.is_some());
    assert_eq!(answers.calls.load(Ordering::SeqCst), 0);

    controller.shutdown().await
}

#[tokio::test]
async fn test_stale_answer_does_not_overwrite_new_cycle() -> Result<()> {
    let backend = ScriptedBackend::new(vec![
        vec![
            RecognitionEvent::Started,
            RecognitionEvent::Result("hello".into()),
            RecognitionEvent::Ended,
        ],
        // Second capture stays open
        vec![RecognitionEvent::Started],
    ]);
    let answers = FakeAnswers::new(vec![Ok("ignored")]);
    let gate = answers.gate_next().await;
    let controller = spawn(backend, Arc::clone(&answers), Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    wait_for(&mut rx, |s| s.phase == Phase::Processing).await?;

    controller.toggle()?;
    wait_for(&mut rx, |s| s.generation == 2 && s.phase == Phase::Listening).await?;

    gate.notify_one();
    // Let the stale reply travel through the event loop
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.phase, Phase::Listening);
    assert!(snapshot.answer.is_none());
    assert!(snapshot.transcript.is_none());

    controller.shutdown().await
}

#[tokio::test]
async fn test_service_error_fails_cycle() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![
        RecognitionEvent::Started,
        RecognitionEvent::Result("hello".into()),
        RecognitionEvent::Ended,
    ]]);
    let answers = FakeAnswers::new(vec![Err(AnswerError::Service("timeout".into()))]);
    let controller = spawn(backend, answers, Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    let snapshot = wait_for(&mut rx, |s| s.phase == Phase::Failed).await?;

    assert_eq!(snapshot.error.as_deref(), Some("timeout"));
    assert!(snapshot.answer.is_none());

    controller.shutdown().await
}

#[tokio::test]
async fn test_unavailable_never_captures() -> Result<()> {
    let answers = FakeAnswers::new(Vec::new());
    let controller = spawn(
        ScriptedBackend::unavailable(),
        Arc::clone(&answers),
        Duration::from_secs(5),
    );

    controller.toggle()?;
    controller.start_capture()?;
    controller.stop_capture()?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.generation, 0);
    assert!(!snapshot.capture_enabled);
    assert_eq!(answers.calls.load(Ordering::SeqCst), 0);

    controller.shutdown().await
}

#[tokio::test]
async fn test_empty_utterance_sends_nothing() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![
        RecognitionEvent::Started,
        RecognitionEvent::Result(String::new()),
        RecognitionEvent::Ended,
    ]]);
    let answers = FakeAnswers::new(vec![Ok("unused")]);
    let controller = spawn(backend, Arc::clone(&answers), Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    let snapshot = wait_for(&mut rx, |s| s.transcript.is_some()).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.transcript.as_deref(), Some(""));
    assert_eq!(answers.calls.load(Ordering::SeqCst), 0);

    controller.shutdown().await
}

#[tokio::test]
async fn test_stop_while_listening_ends_capture() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![RecognitionEvent::Started]]);
    let controller = spawn(backend, FakeAnswers::new(Vec::new()), Duration::from_secs(5));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    wait_for(&mut rx, SessionSnapshot::is_listening).await?;

    controller.toggle()?;
    let snapshot = wait_for(&mut rx, |s| s.phase == Phase::Idle).await?;

    assert_eq!(snapshot.generation, 1);
    assert!(snapshot.transcript.is_none());

    controller.shutdown().await
}

#[tokio::test]
async fn test_slow_answer_is_bounded() -> Result<()> {
    let backend = ScriptedBackend::new(vec![vec![
        RecognitionEvent::Started,
        RecognitionEvent::Result("hello".into()),
        RecognitionEvent::Ended,
    ]]);
    let answers = FakeAnswers::new(vec![Ok("never shown")]);
    // Gate is never released
    let _gate = answers.gate_next().await;
    let controller = spawn(backend, answers, Duration::from_millis(100));
    let mut rx = controller.subscribe();

    controller.toggle()?;
    let snapshot = wait_for(&mut rx, |s| s.phase == Phase::Failed).await?;

    assert_eq!(snapshot.error.as_deref(), Some("request timed out after 100ms"));

    controller.shutdown().await
}
