//! Speech recognizer collaborator seam
//!
//! The recognizer delivers readiness, partial/final transcripts, and typed
//! errors over an event channel, so the turn machine's transition table
//! stays a pure function of (state, event) instead of scattered callback
//! bodies. `ChannelRecognizer` is the in-process implementation used by the
//! console `run` command and by tests: callers inject transcripts and the
//! pause/stop discipline is honored at the injection point.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::Transcript;

/// Events a recognizer emits over its stream
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// Recognizer is ready to transcribe
    Ready,
    /// Streaming transcript, may be overwritten
    Partial(Transcript),
    /// Final transcript, triggers downstream action
    Final(Transcript),
    /// Typed recognizer fault
    Failed(String),
}

/// Seam for the platform speech recognizer.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start recognition and return the event stream. Emits `Ready` once
    /// the engine can transcribe. Starting again replaces any previous
    /// stream.
    async fn start(&self) -> Result<mpsc::Receiver<RecognizerEvent>>;

    /// Pause general-purpose recognition (used while a recording window is
    /// open so audio is not double-consumed)
    fn pause(&self);

    /// Resume after a pause
    fn resume(&self);

    /// Stop and release the engine. Idempotent; safe when never started.
    fn stop(&self);
}

/// In-process recognizer fed by [`ChannelRecognizer::inject`].
pub struct ChannelRecognizer {
    tx: Mutex<mpsc::Sender<RecognizerEvent>>,
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl ChannelRecognizer {
    pub fn new() -> Arc<Self> {
        // Placeholder channel until start(); injects before start are dropped
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(Self {
            tx: Mutex::new(tx),
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(true),
        })
    }

    /// Inject an event as if the engine produced it. Events injected while
    /// paused or stopped are dropped, matching a real engine that is not
    /// consuming audio.
    pub async fn inject(&self, event: RecognizerEvent) {
        if self.stopped.load(Ordering::SeqCst) {
            debug!("Recognizer stopped, dropping injected event");
            return;
        }
        if self.paused.load(Ordering::SeqCst) {
            debug!("Recognizer paused, dropping injected event");
            return;
        }
        let tx = self.tx.lock().expect("recognizer channel lock poisoned").clone();
        let _ = tx.send(event).await;
    }

    /// Convenience: inject a final transcript
    pub async fn inject_final(&self, text: impl Into<String>) {
        self.inject(RecognizerEvent::Final(Transcript::finalized(text))).await;
    }

    /// Convenience: inject a partial transcript
    pub async fn inject_partial(&self, text: impl Into<String>) {
        self.inject(RecognizerEvent::Partial(Transcript::partial(text))).await;
    }
}

#[async_trait]
impl SpeechRecognizer for ChannelRecognizer {
    async fn start(&self) -> Result<mpsc::Receiver<RecognizerEvent>> {
        let (tx, rx) = mpsc::channel(64);
        *self.tx.lock().expect("recognizer channel lock poisoned") = tx.clone();

        self.stopped.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        let _ = tx.send(RecognizerEvent::Ready).await;
        Ok(rx)
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
