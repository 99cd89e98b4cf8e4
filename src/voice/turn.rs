//! Voice turn state machine
//!
//! Owns the LISTEN→RECORD→PROCESS→SPEAK lifecycle for one conversational
//! turn. The transition table is a pure function of (current state, event)
//! on [`TurnMachine`], returning effects; [`spawn_voice_turn`] runs the
//! driver task that consumes the event channel, executes effects, and
//! publishes a status snapshot after every transition.
//!
//! ```text
//!  Idle ──resume──▶ Initializing ──both ready──▶ Listening
//!                        │                        │   ▲
//!                   init failure            final │   │ playback done
//!                        ▼                        ▼   │
//!                      Error                  Processing ──▶ Speaking
//! ```
//!
//! Serialization: a single turn-in-flight guard, owned by the machine task,
//! drops qualifying transcripts that arrive while a turn is running — a
//! user should not be answered twice for one utterance window.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::ConversationBackend;
use crate::config::VoiceConfig;
use crate::telemetry::ExchangeSink;
use crate::types::{ConversationExchange, StatusSnapshot, TurnState};
use crate::voice::capture::AudioCaptureSource;
use crate::voice::recognizer::{RecognizerEvent, SpeechRecognizer};
use crate::voice::recording::{RecordingClose, RecordingSession};
use crate::voice::synthesizer::SpeechSynthesizer;

/// Everything that can drive a transition
#[derive(Debug)]
pub enum TurnEvent {
    /// Start, or recover from Error/Idle
    Resume,
    /// Drop to Idle, cancelling in-flight recognition and recording
    Pause,
    /// Close the current recording window, if any
    StopRecording,
    /// Recognizer reported ready
    RecognizerReady,
    /// Synthesizer reported ready
    SynthesizerReady,
    /// A collaborator failed to initialize
    InitFailed(String),
    /// Streaming transcript
    Partial(String),
    /// Final transcript
    Final(String),
    /// Recognizer fault after initialization
    RecognizerFailed(String),
    /// Backend round trip finished; `error` is set when a fallback was used
    ExchangeCompleted {
        input: String,
        reply: String,
        error: Option<String>,
    },
    /// Synthesizer finished the utterance
    PlaybackDone,
    /// Synthesizer failed the utterance
    PlaybackFailed(String),
    /// The recording window closed
    RecordingClosed(RecordingClose),
    /// Tear down the machine task
    Shutdown,
}

/// Side effects the driver executes after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start recognizer and synthesizer
    StartCollaborators,
    /// Open one recording window
    OpenRecording,
    /// Request closure of the current recording window
    CloseRecording,
    /// Pause general-purpose recognition while recording
    PauseRecognizer,
    /// Resume recognition after the recording window closes
    ResumeRecognizer,
    /// Round-trip a transcript through the backend
    StartExchange(String),
    /// Speak a reply (flushing anything queued)
    Speak(String),
    /// Hand a completed exchange to the telemetry sink
    EmitExchange { input: String, reply: String },
    /// Stop and release all collaborator handles (idempotent)
    ReleaseAll,
}

/// Pure transition table plus the state it closes over. All mutation
/// happens on the driver task; external observers only see snapshots.
#[derive(Debug)]
pub struct TurnMachine {
    state: TurnState,
    last_error: Option<String>,
    turn_in_flight: bool,
    recording_open: bool,
    recognizer_ready: bool,
    synthesizer_ready: bool,
    wake_phrase: String,
}

impl TurnMachine {
    pub fn new(wake_phrase: &str) -> Self {
        Self {
            state: TurnState::Idle,
            last_error: None,
            turn_in_flight: false,
            recording_open: false,
            recognizer_ready: false,
            synthesizer_ready: false,
            wake_phrase: wake_phrase.trim().to_lowercase(),
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn recording_open(&self) -> bool {
        self.recording_open
    }

    pub fn turn_in_flight(&self) -> bool {
        self.turn_in_flight
    }

    /// Apply one event and return the effects to execute
    pub fn handle(&mut self, event: TurnEvent) -> Vec<Effect> {
        match event {
            TurnEvent::Resume => self.on_resume(),
            TurnEvent::Pause => self.on_pause(),
            TurnEvent::StopRecording => {
                if self.recording_open {
                    vec![Effect::CloseRecording]
                } else {
                    Vec::new()
                }
            }
            TurnEvent::RecognizerReady => {
                self.recognizer_ready = true;
                self.maybe_listening()
            }
            TurnEvent::SynthesizerReady => {
                self.synthesizer_ready = true;
                self.maybe_listening()
            }
            TurnEvent::InitFailed(msg) => self.on_fatal(msg),
            TurnEvent::Partial(text) => {
                if self.state == TurnState::Listening {
                    debug!("Partial transcript: {:?}", text);
                }
                Vec::new()
            }
            TurnEvent::Final(text) => self.on_final(text),
            TurnEvent::RecognizerFailed(msg) => {
                if self.state == TurnState::Initializing {
                    self.on_fatal(msg)
                } else {
                    warn!("Recognizer fault: {}", msg);
                    self.last_error = Some(msg);
                    Vec::new()
                }
            }
            TurnEvent::ExchangeCompleted { input, reply, error } => {
                if self.state != TurnState::Processing {
                    debug!("Dropping exchange result outside Processing");
                    return Vec::new();
                }
                self.state = TurnState::Speaking;
                self.last_error = error;
                vec![
                    Effect::EmitExchange { input, reply: reply.clone() },
                    Effect::Speak(reply),
                ]
            }
            TurnEvent::PlaybackDone => self.on_playback_finished(None),
            TurnEvent::PlaybackFailed(msg) => self.on_playback_finished(Some(msg)),
            TurnEvent::RecordingClosed(reason) => {
                self.recording_open = false;
                if let RecordingClose::Failed(msg) = &reason {
                    self.last_error = Some(msg.clone());
                }
                match self.state {
                    TurnState::Idle | TurnState::Error => Vec::new(),
                    _ => vec![Effect::ResumeRecognizer],
                }
            }
            // Shutdown is handled by the driver as Pause-then-exit
            TurnEvent::Shutdown => self.on_pause(),
        }
    }

    fn on_resume(&mut self) -> Vec<Effect> {
        match self.state {
            TurnState::Idle | TurnState::Error => {
                info!("Voice turn machine initializing");
                self.state = TurnState::Initializing;
                self.last_error = None;
                self.recognizer_ready = false;
                self.synthesizer_ready = false;
                vec![Effect::StartCollaborators]
            }
            _ => Vec::new(),
        }
    }

    fn on_pause(&mut self) -> Vec<Effect> {
        info!("Voice turn machine pausing");
        self.state = TurnState::Idle;
        self.turn_in_flight = false;
        self.recording_open = false;
        self.recognizer_ready = false;
        self.synthesizer_ready = false;
        vec![Effect::ReleaseAll]
    }

    fn on_fatal(&mut self, msg: String) -> Vec<Effect> {
        warn!("Unrecoverable initialization failure: {}", msg);
        self.state = TurnState::Error;
        self.last_error = Some(msg);
        self.turn_in_flight = false;
        self.recording_open = false;
        vec![Effect::ReleaseAll]
    }

    fn maybe_listening(&mut self) -> Vec<Effect> {
        if self.state == TurnState::Initializing && self.recognizer_ready && self.synthesizer_ready {
            info!("Collaborators ready, listening");
            self.state = TurnState::Listening;
        }
        Vec::new()
    }

    fn on_final(&mut self, text: String) -> Vec<Effect> {
        if self.state != TurnState::Listening {
            debug!("Dropping final transcript in state {}", self.state);
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        if !self.wake_phrase.is_empty() {
            if let Some(idx) = lowered.find(&self.wake_phrase) {
                return self.on_wake_phrase(&text, idx);
            }
        }

        if self.turn_in_flight {
            debug!("Turn in flight, dropping final transcript");
            return Vec::new();
        }

        self.begin_turn(text)
    }

    fn on_wake_phrase(&mut self, text: &str, idx: usize) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.recording_open {
            debug!("Wake phrase while recording window open, ignoring");
        } else {
            info!("Wake phrase detected, opening recording window");
            self.recording_open = true;
            effects.push(Effect::OpenRecording);
            effects.push(Effect::PauseRecognizer);
        }

        // The text after the wake phrase, if any, is the spoken command.
        // Lowercasing can shift byte offsets for non-ASCII text; fall back
        // to no command rather than slicing mid-character.
        let command = text
            .get(idx + self.wake_phrase.len()..)
            .map(str::trim)
            .unwrap_or("");

        if !command.is_empty() {
            if self.turn_in_flight {
                debug!("Turn in flight, dropping wake-phrase command");
            } else {
                effects.extend(self.begin_turn(command.to_string()));
            }
        }

        effects
    }

    fn begin_turn(&mut self, text: String) -> Vec<Effect> {
        info!("Final transcript accepted, processing");
        self.turn_in_flight = true;
        self.state = TurnState::Processing;
        vec![Effect::StartExchange(text)]
    }

    fn on_playback_finished(&mut self, error: Option<String>) -> Vec<Effect> {
        if self.state != TurnState::Speaking {
            return Vec::new();
        }
        if let Some(msg) = error {
            warn!("Playback failed: {}", msg);
            self.last_error = Some(msg);
        }
        self.state = TurnState::Listening;
        self.turn_in_flight = false;
        Vec::new()
    }

    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            last_error: self.last_error.clone(),
            listening: self.state == TurnState::Listening,
            recording: self.recording_open,
            last_activity: Utc::now(),
        }
    }
}

/// External collaborators the voice turn machine drives
#[derive(Clone)]
pub struct VoiceDeps {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub capture: Arc<dyn AudioCaptureSource>,
    pub backend: Arc<dyn ConversationBackend>,
    pub sink: Arc<dyn ExchangeSink>,
}

/// Cloneable handle for sending commands and observing status
#[derive(Clone)]
pub struct VoiceTurnHandle {
    tx: mpsc::Sender<TurnEvent>,
    status: watch::Receiver<StatusSnapshot>,
}

impl VoiceTurnHandle {
    pub async fn resume(&self) {
        let _ = self.tx.send(TurnEvent::Resume).await;
    }

    pub async fn pause(&self) {
        let _ = self.tx.send(TurnEvent::Pause).await;
    }

    pub async fn stop_recording(&self) {
        let _ = self.tx.send(TurnEvent::StopRecording).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(TurnEvent::Shutdown).await;
    }

    /// Subscribe to status snapshots, published after every transition
    pub fn status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }
}

/// Spawn the machine task and return its handle
pub fn spawn_voice_turn(
    config: &VoiceConfig,
    user_id: i64,
    deps: VoiceDeps,
) -> (VoiceTurnHandle, JoinHandle<()>) {
    let (events_tx, events_rx) = mpsc::channel(64);
    let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());

    let driver = TurnDriver {
        machine: TurnMachine::new(&config.wake_phrase),
        deps,
        user_id,
        window: Duration::from_secs(config.recording_window_secs),
        fallback_connectivity: config.fallback_connectivity.clone(),
        fallback_generic: config.fallback_generic.clone(),
        events_tx: events_tx.clone(),
        status_tx,
        session: None,
    };

    let handle = VoiceTurnHandle { tx: events_tx, status: status_rx };
    let task = tokio::spawn(driver.run(events_rx));
    (handle, task)
}

struct TurnDriver {
    machine: TurnMachine,
    deps: VoiceDeps,
    user_id: i64,
    window: Duration,
    fallback_connectivity: String,
    fallback_generic: String,
    events_tx: mpsc::Sender<TurnEvent>,
    status_tx: watch::Sender<StatusSnapshot>,
    session: Option<RecordingSession>,
}

impl TurnDriver {
    async fn run(mut self, mut events_rx: mpsc::Receiver<TurnEvent>) {
        while let Some(event) = events_rx.recv().await {
            let shutting_down = matches!(event, TurnEvent::Shutdown);

            if matches!(event, TurnEvent::RecordingClosed(_)) {
                self.session = None;
            }

            let effects = self.machine.handle(event);
            let _ = self.status_tx.send(self.machine.snapshot());

            for effect in effects {
                self.execute(effect).await;
            }

            if shutting_down {
                info!("Voice turn machine shut down");
                break;
            }
        }
    }

    async fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartCollaborators => self.start_collaborators(),
            Effect::OpenRecording => {
                self.session = Some(RecordingSession::open(
                    self.deps.capture.clone(),
                    self.window,
                    self.events_tx.clone(),
                ));
            }
            Effect::CloseRecording => {
                if let Some(session) = &self.session {
                    session.stop();
                }
            }
            Effect::PauseRecognizer => self.deps.recognizer.pause(),
            Effect::ResumeRecognizer => self.deps.recognizer.resume(),
            Effect::StartExchange(text) => self.start_exchange(text),
            Effect::Speak(text) => self.start_playback(text),
            Effect::EmitExchange { input, reply } => {
                let exchange = ConversationExchange::new(self.user_id, input, reply);
                self.deps.sink.record(exchange).await;
            }
            Effect::ReleaseAll => {
                if let Some(session) = self.session.take() {
                    session.stop();
                }
                self.deps.recognizer.stop();
                self.deps.synthesizer.release();
                self.deps.capture.release();
            }
        }
    }

    fn start_collaborators(&self) {
        let recognizer = self.deps.recognizer.clone();
        let synthesizer = self.deps.synthesizer.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let (started, prepared) =
                futures::future::join(recognizer.start(), synthesizer.prepare()).await;

            match started {
                Ok(mut stream) => {
                    let forward_tx = events_tx.clone();
                    tokio::spawn(async move {
                        while let Some(event) = stream.recv().await {
                            let mapped = match event {
                                RecognizerEvent::Ready => TurnEvent::RecognizerReady,
                                RecognizerEvent::Partial(t) => TurnEvent::Partial(t.text),
                                RecognizerEvent::Final(t) => TurnEvent::Final(t.text),
                                RecognizerEvent::Failed(msg) => TurnEvent::RecognizerFailed(msg),
                            };
                            if forward_tx.send(mapped).await.is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(e) => {
                    let _ = events_tx
                        .send(TurnEvent::InitFailed(format!("recognizer: {e:#}")))
                        .await;
                }
            }

            match prepared {
                Ok(()) => {
                    let _ = events_tx.send(TurnEvent::SynthesizerReady).await;
                }
                Err(e) => {
                    let _ = events_tx
                        .send(TurnEvent::InitFailed(format!("synthesizer: {e:#}")))
                        .await;
                }
            }
        });
    }

    fn start_exchange(&self, text: String) {
        let backend = self.deps.backend.clone();
        let events_tx = self.events_tx.clone();
        let user_id = self.user_id;
        let fallback_connectivity = self.fallback_connectivity.clone();
        let fallback_generic = self.fallback_generic.clone();

        tokio::spawn(async move {
            let (reply, error) = match backend.process_conversation(user_id, &text).await {
                Ok(reply) => (reply, None),
                Err(e) if e.is_transport() => {
                    warn!("Backend unreachable, using connectivity fallback: {e}");
                    (fallback_connectivity, Some(e.to_string()))
                }
                Err(e) => {
                    warn!("Backend failed, using generic fallback: {e}");
                    (fallback_generic, Some(e.to_string()))
                }
            };

            let _ = events_tx
                .send(TurnEvent::ExchangeCompleted { input: text, reply, error })
                .await;
        });
    }

    fn start_playback(&self, text: String) {
        let synthesizer = self.deps.synthesizer.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let event = match synthesizer.speak(&text, true).await {
                Ok(()) => TurnEvent::PlaybackDone,
                Err(e) => TurnEvent::PlaybackFailed(e.to_string()),
            };
            let _ = events_tx.send(event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> TurnMachine {
        let mut m = TurnMachine::new("hey jarvis");
        m.handle(TurnEvent::Resume);
        m.handle(TurnEvent::RecognizerReady);
        m.handle(TurnEvent::SynthesizerReady);
        assert_eq!(m.state(), TurnState::Listening);
        m
    }

    #[test]
    fn test_resume_initializes_then_both_ready_listens() {
        let mut m = TurnMachine::new("hey jarvis");
        assert_eq!(m.state(), TurnState::Idle);

        let effects = m.handle(TurnEvent::Resume);
        assert_eq!(m.state(), TurnState::Initializing);
        assert_eq!(effects, vec![Effect::StartCollaborators]);

        m.handle(TurnEvent::RecognizerReady);
        assert_eq!(m.state(), TurnState::Initializing);
        m.handle(TurnEvent::SynthesizerReady);
        assert_eq!(m.state(), TurnState::Listening);
    }

    #[test]
    fn test_init_failure_enters_error_and_resume_recovers() {
        let mut m = TurnMachine::new("hey jarvis");
        m.handle(TurnEvent::Resume);

        let effects = m.handle(TurnEvent::InitFailed("no microphone".to_string()));
        assert_eq!(m.state(), TurnState::Error);
        assert_eq!(m.last_error(), Some("no microphone"));
        assert!(effects.contains(&Effect::ReleaseAll));

        let effects = m.handle(TurnEvent::Resume);
        assert_eq!(m.state(), TurnState::Initializing);
        assert!(m.last_error().is_none());
        assert_eq!(effects, vec![Effect::StartCollaborators]);
    }

    #[test]
    fn test_plain_final_transcript_starts_exchange() {
        let mut m = machine();

        let effects = m.handle(TurnEvent::Final("what time is it".to_string()));
        assert_eq!(m.state(), TurnState::Processing);
        assert!(m.turn_in_flight());
        assert_eq!(effects, vec![Effect::StartExchange("what time is it".to_string())]);
    }

    #[test]
    fn test_wake_phrase_opens_recording_without_processing() {
        let mut m = machine();

        let effects = m.handle(TurnEvent::Final("Hey Jarvis".to_string()));
        assert_eq!(m.state(), TurnState::Listening);
        assert!(m.recording_open());
        assert!(!m.turn_in_flight());
        assert_eq!(effects, vec![Effect::OpenRecording, Effect::PauseRecognizer]);
    }

    #[test]
    fn test_wake_phrase_with_command_opens_recording_and_processes_remainder() {
        let mut m = machine();

        let effects = m.handle(TurnEvent::Final("hey jarvis turn on the lights".to_string()));
        assert_eq!(m.state(), TurnState::Processing);
        assert!(m.recording_open());
        assert_eq!(
            effects,
            vec![
                Effect::OpenRecording,
                Effect::PauseRecognizer,
                Effect::StartExchange("turn on the lights".to_string()),
            ]
        );
    }

    #[test]
    fn test_wake_phrase_match_is_case_insensitive_substring() {
        let mut m = machine();

        let effects = m.handle(TurnEvent::Final("um, HEY JARVIS, hello".to_string()));
        assert!(m.recording_open());
        // Remainder ", hello" trims to ", hello" — still a command
        assert!(effects.iter().any(|e| matches!(e, Effect::StartExchange(_))));
    }

    #[test]
    fn test_second_wake_phrase_while_recording_is_ignored() {
        let mut m = machine();

        m.handle(TurnEvent::Final("hey jarvis".to_string()));
        assert!(m.recording_open());

        let effects = m.handle(TurnEvent::Final("hey jarvis".to_string()));
        assert!(effects.is_empty());
        assert!(m.recording_open());
    }

    #[test]
    fn test_finals_dropped_while_turn_in_flight() {
        let mut m = machine();

        m.handle(TurnEvent::Final("first".to_string()));
        assert_eq!(m.state(), TurnState::Processing);

        // Finals in Processing and Speaking never start a second exchange
        assert!(m.handle(TurnEvent::Final("second".to_string())).is_empty());

        m.handle(TurnEvent::ExchangeCompleted {
            input: "first".to_string(),
            reply: "done".to_string(),
            error: None,
        });
        assert_eq!(m.state(), TurnState::Speaking);
        assert!(m.handle(TurnEvent::Final("third".to_string())).is_empty());
    }

    #[test]
    fn test_exchange_completion_speaks_and_emits_exchange() {
        let mut m = machine();
        m.handle(TurnEvent::Final("ping".to_string()));

        let effects = m.handle(TurnEvent::ExchangeCompleted {
            input: "ping".to_string(),
            reply: "pong".to_string(),
            error: None,
        });
        assert_eq!(m.state(), TurnState::Speaking);
        assert_eq!(
            effects,
            vec![
                Effect::EmitExchange { input: "ping".to_string(), reply: "pong".to_string() },
                Effect::Speak("pong".to_string()),
            ]
        );
    }

    #[test]
    fn test_fallback_exchange_records_error_but_still_speaks() {
        let mut m = machine();
        m.handle(TurnEvent::Final("ping".to_string()));

        let effects = m.handle(TurnEvent::ExchangeCompleted {
            input: "ping".to_string(),
            reply: "Sorry, I can't reach the network right now.".to_string(),
            error: Some("backend unreachable".to_string()),
        });
        assert_eq!(m.state(), TurnState::Speaking);
        assert_eq!(m.last_error(), Some("backend unreachable"));
        assert!(effects.iter().any(|e| matches!(e, Effect::Speak(_))));
    }

    #[test]
    fn test_playback_done_returns_to_listening_and_clears_guard() {
        let mut m = machine();
        m.handle(TurnEvent::Final("ping".to_string()));
        m.handle(TurnEvent::ExchangeCompleted {
            input: "ping".to_string(),
            reply: "pong".to_string(),
            error: None,
        });

        m.handle(TurnEvent::PlaybackDone);
        assert_eq!(m.state(), TurnState::Listening);
        assert!(!m.turn_in_flight());

        // The next final starts a fresh turn
        let effects = m.handle(TurnEvent::Final("again".to_string()));
        assert_eq!(effects, vec![Effect::StartExchange("again".to_string())]);
    }

    #[test]
    fn test_playback_failure_is_recoverable() {
        let mut m = machine();
        m.handle(TurnEvent::Final("ping".to_string()));
        m.handle(TurnEvent::ExchangeCompleted {
            input: "ping".to_string(),
            reply: "pong".to_string(),
            error: None,
        });

        m.handle(TurnEvent::PlaybackFailed("speaker busy".to_string()));
        assert_eq!(m.state(), TurnState::Listening);
        assert_eq!(m.last_error(), Some("speaker busy"));
        assert!(!m.turn_in_flight());
    }

    #[test]
    fn test_recording_close_resumes_recognizer() {
        let mut m = machine();
        m.handle(TurnEvent::Final("hey jarvis".to_string()));

        let effects = m.handle(TurnEvent::RecordingClosed(RecordingClose::WindowElapsed));
        assert!(!m.recording_open());
        assert_eq!(effects, vec![Effect::ResumeRecognizer]);

        // A new wake phrase can open a fresh window
        let effects = m.handle(TurnEvent::Final("hey jarvis".to_string()));
        assert!(effects.contains(&Effect::OpenRecording));
    }

    #[test]
    fn test_pause_from_any_state_releases_everything() {
        let mut m = machine();
        m.handle(TurnEvent::Final("hey jarvis turn on the lights".to_string()));
        assert!(m.recording_open());
        assert!(m.turn_in_flight());

        let effects = m.handle(TurnEvent::Pause);
        assert_eq!(m.state(), TurnState::Idle);
        assert!(!m.recording_open());
        assert!(!m.turn_in_flight());
        assert_eq!(effects, vec![Effect::ReleaseAll]);

        // A late exchange result for the cancelled turn is dropped
        let effects = m.handle(TurnEvent::ExchangeCompleted {
            input: "turn on the lights".to_string(),
            reply: "ok".to_string(),
            error: None,
        });
        assert!(effects.is_empty());
        assert_eq!(m.state(), TurnState::Idle);
    }

    #[test]
    fn test_recognizer_fault_after_init_is_informational() {
        let mut m = machine();

        m.handle(TurnEvent::RecognizerFailed("transient".to_string()));
        assert_eq!(m.state(), TurnState::Listening);
        assert_eq!(m.last_error(), Some("transient"));
    }

    #[test]
    fn test_stop_recording_without_session_is_noop() {
        let mut m = machine();
        assert!(m.handle(TurnEvent::StopRecording).is_empty());
    }

    #[test]
    fn test_empty_wake_phrase_never_matches() {
        let mut m = TurnMachine::new("");
        m.handle(TurnEvent::Resume);
        m.handle(TurnEvent::RecognizerReady);
        m.handle(TurnEvent::SynthesizerReady);

        let effects = m.handle(TurnEvent::Final("hello".to_string()));
        assert_eq!(effects, vec![Effect::StartExchange("hello".to_string())]);
        assert!(!m.recording_open());
    }
}
