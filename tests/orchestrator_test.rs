//! End-to-end tests for the voice turn pipeline through the orchestrator,
//! using scripted collaborators in place of the platform engines.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use pocket_agent::backend::{BackendError, ConversationBackend, SmsDecision};
use pocket_agent::config::Config;
use pocket_agent::orchestrator::Orchestrator;
use pocket_agent::screening::HeuristicReputation;
use pocket_agent::telemetry::ExchangeSink;
use pocket_agent::types::{CallEvent, ConversationExchange, StatusSnapshot, TurnState};
use pocket_agent::voice::{
    ChannelRecognizer, SilentCaptureSource, SpeechSynthesizer, VoiceDeps,
};

/// Backend fake that records conversation inputs and replies after a short
/// delay (long enough for status watchers to observe Processing).
struct ScriptedBackend {
    reply: Result<String, BackendError>,
    delay: Duration,
    conversation_inputs: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            delay: Duration::from_millis(100),
            conversation_inputs: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: BackendError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            delay: Duration::from_millis(100),
            conversation_inputs: Mutex::new(Vec::new()),
        })
    }

    fn inputs(&self) -> Vec<String> {
        self.conversation_inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationBackend for ScriptedBackend {
    async fn process_conversation(&self, _user_id: i64, text: &str) -> Result<String, BackendError> {
        self.conversation_inputs.lock().unwrap().push(text.to_string());
        tokio::time::sleep(self.delay).await;
        self.reply.clone()
    }

    async fn make_sms_decision(&self, _user_id: i64, _text: &str) -> Result<SmsDecision, BackendError> {
        Ok(SmsDecision { reply: None })
    }
}

/// Synthesizer fake that records utterances and takes a beat to "play" them
#[derive(Default)]
struct RecordingSynthesizer {
    utterances: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    fn utterances(&self) -> Vec<String> {
        self.utterances.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn prepare(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn speak(&self, text: &str, _flush: bool) -> anyhow::Result<()> {
        self.utterances.lock().unwrap().push(text.to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }

    fn release(&self) {}
}

#[derive(Default)]
struct CollectingSink {
    exchanges: Mutex<Vec<ConversationExchange>>,
}

#[async_trait]
impl ExchangeSink for CollectingSink {
    async fn record(&self, exchange: ConversationExchange) {
        self.exchanges.lock().unwrap().push(exchange);
    }
}

struct Harness {
    orchestrator: Orchestrator,
    recognizer: Arc<ChannelRecognizer>,
    backend: Arc<ScriptedBackend>,
    synthesizer: Arc<RecordingSynthesizer>,
    sink: Arc<CollectingSink>,
}

fn harness_with(backend: Arc<ScriptedBackend>) -> Harness {
    let config = Config::default();
    let recognizer = ChannelRecognizer::new();
    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let sink = Arc::new(CollectingSink::default());

    let deps = VoiceDeps {
        recognizer: recognizer.clone(),
        synthesizer: synthesizer.clone(),
        capture: SilentCaptureSource::new(),
        backend: backend.clone(),
        sink: sink.clone(),
    };

    let orchestrator = Orchestrator::new(&config, Arc::new(HeuristicReputation), deps);
    Harness { orchestrator, recognizer, backend, synthesizer, sink }
}

async fn wait_for(
    status: &mut watch::Receiver<StatusSnapshot>,
    what: &str,
    pred: impl Fn(&StatusSnapshot) -> bool,
) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&status.borrow_and_update()) {
                return;
            }
            if status.changed().await.is_err() {
                panic!("status channel closed while waiting for {what}");
            }
        }
    })
    .await;
    result.unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

/// Spawn a watcher that records every observed state transition
fn observe_states(mut status: watch::Receiver<StatusSnapshot>) -> Arc<Mutex<Vec<StatusSnapshot>>> {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    tokio::spawn(async move {
        loop {
            let snapshot = status.borrow_and_update().clone();
            sink.lock().unwrap().push(snapshot);
            if status.changed().await.is_err() {
                break;
            }
        }
    });
    observed
}

#[tokio::test]
async fn test_end_to_end_wake_phrase_turn() {
    let harness = harness_with(ScriptedBackend::replying("The lights are on."));
    let mut status = harness.orchestrator.status();
    let observed = observe_states(harness.orchestrator.status());

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_partial("hey jar").await;
    harness.recognizer.inject_final("hey jarvis turn on the lights").await;

    // Recording window opens, the stripped command round-trips, the reply
    // is spoken, and the machine returns to Listening
    wait_for(&mut status, "turn completion", |s| {
        s.state == TurnState::Listening && s.recording
    })
    .await;

    assert_eq!(harness.backend.inputs(), vec!["turn on the lights".to_string()]);
    assert_eq!(harness.synthesizer.utterances(), vec!["The lights are on.".to_string()]);

    let observed = observed.lock().unwrap().clone();
    assert!(observed.iter().any(|s| s.recording), "recording window never observed");
    assert!(observed.iter().any(|s| s.state == TurnState::Processing));
    assert!(observed.iter().any(|s| s.state == TurnState::Speaking));

    let exchanges = harness.sink.exchanges.lock().unwrap().clone();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].input_text, "turn on the lights");
    assert_eq!(exchanges[0].reply_text, "The lights are on.");

    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_finals_are_dropped_not_queued() {
    let harness = harness_with(ScriptedBackend::replying("ack"));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("first question").await;
    wait_for(&mut status, "processing", |s| s.state == TurnState::Processing).await;

    // These arrive while the turn is in flight and must be dropped
    harness.recognizer.inject_final("second question").await;
    harness.recognizer.inject_final("third question").await;

    wait_for(&mut status, "back to listening", |s| s.state == TurnState::Listening).await;

    assert_eq!(harness.backend.inputs(), vec!["first question".to_string()]);
    assert_eq!(harness.synthesizer.utterances().len(), 1);

    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_transport_failure_speaks_connectivity_fallback() {
    let harness = harness_with(ScriptedBackend::failing(BackendError::Transport(
        "connection refused".to_string(),
    )));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("what time is it").await;
    wait_for(&mut status, "turn completion", |s| {
        s.state == TurnState::Listening && s.last_error.is_some()
    })
    .await;

    let config = Config::default();
    assert_eq!(harness.synthesizer.utterances(), vec![config.voice.fallback_connectivity]);

    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_server_failure_speaks_generic_fallback() {
    let harness = harness_with(ScriptedBackend::failing(BackendError::Api { status: 503 }));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("what time is it").await;
    wait_for(&mut status, "turn completion", |s| {
        s.state == TurnState::Listening && s.last_error.is_some()
    })
    .await;

    let config = Config::default();
    assert_eq!(harness.synthesizer.utterances(), vec![config.voice.fallback_generic]);

    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_call_screened_while_turn_in_flight() {
    let harness = harness_with(ScriptedBackend::replying("thinking..."));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("long question").await;
    wait_for(&mut status, "processing", |s| s.state == TurnState::Processing).await;

    // Screening runs independently of the voice turn
    let decision = harness
        .orchestrator
        .screen_call(CallEvent::new(Some("+14155551234".to_string())))
        .await;
    assert!(decision.allow);

    wait_for(&mut status, "back to listening", |s| s.state == TurnState::Listening).await;
    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_pause_cancels_recording_and_resume_recovers() {
    let harness = harness_with(ScriptedBackend::replying("ack"));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("hey jarvis").await;
    wait_for(&mut status, "recording open", |s| s.recording).await;

    harness.orchestrator.pause().await;
    wait_for(&mut status, "idle", |s| s.state == TurnState::Idle && !s.recording).await;

    // Pause released the recognizer; resume brings the machine back up
    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening again", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("still there").await;
    wait_for(&mut status, "turn completion", |s| s.state == TurnState::Listening).await;
    assert_eq!(harness.backend.inputs(), vec!["still there".to_string()]);

    harness.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_explicit_stop_closes_recording_window() {
    let harness = harness_with(ScriptedBackend::replying("ack"));
    let mut status = harness.orchestrator.status();

    harness.orchestrator.resume().await;
    wait_for(&mut status, "listening", |s| s.state == TurnState::Listening).await;

    harness.recognizer.inject_final("hey jarvis").await;
    wait_for(&mut status, "recording open", |s| s.recording).await;

    harness.orchestrator.stop_recording().await;
    wait_for(&mut status, "recording closed", |s| !s.recording).await;

    // A second stop with no window open is a no-op
    harness.orchestrator.stop_recording().await;
    assert_eq!(status.borrow().state, TurnState::Listening);

    harness.orchestrator.shutdown().await;
}
