//! Recording session
//!
//! The bounded-lifetime resource representing one active audio-capture
//! window. A session owns two tasks: an audio pull loop and a window timer,
//! cancelled together when the session closes. Closure happens exactly once
//! — whichever of the timer, an explicit stop, or the source ending
//! resolves first is the sole closer, so a stop racing the timer can never
//! double-release the capture handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::voice::capture::AudioCaptureSource;
use crate::voice::turn::TurnEvent;

/// Why a recording session closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingClose {
    /// The window timer elapsed
    WindowElapsed,
    /// An explicit stop was issued
    Stopped,
    /// The capture source ended on its own
    SourceEnded,
    /// The capture stream could not be opened
    Failed(String),
}

/// Handle to one open recording window. Dropping the handle without calling
/// [`stop`](RecordingSession::stop) also closes the window.
pub struct RecordingSession {
    id: Uuid,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl RecordingSession {
    /// Open a recording window: start the pull loop and the window timer,
    /// and deliver a single `RecordingClosed` event when the window closes.
    pub fn open(
        capture: Arc<dyn AudioCaptureSource>,
        window: Duration,
        events: mpsc::Sender<TurnEvent>,
    ) -> Self {
        let id = Uuid::new_v4();
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(run_window(id, capture, window, stop_rx, events));

        debug!("Recording session {} opened ({:?} window)", id, window);
        Self { id, stop_tx: Mutex::new(Some(stop_tx)) }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Request closure of the window. Idempotent: a second stop, or a stop
    /// after the timer already fired, is a no-op.
    pub fn stop(&self) {
        let tx = self.stop_tx.lock().expect("recording stop lock poisoned").take();
        if let Some(tx) = tx {
            // Receiver gone means the window already closed on its own
            let _ = tx.send(());
        }
    }
}

async fn run_window(
    id: Uuid,
    capture: Arc<dyn AudioCaptureSource>,
    window: Duration,
    stop_rx: oneshot::Receiver<()>,
    events: mpsc::Sender<TurnEvent>,
) {
    let frames = match capture.open_stream().await {
        Ok(rx) => rx,
        Err(e) => {
            warn!("Recording session {} failed to open capture: {e:#}", id);
            capture.release();
            let _ = events
                .send(TurnEvent::RecordingClosed(RecordingClose::Failed(e.to_string())))
                .await;
            return;
        }
    };

    let frame_count = Arc::new(AtomicUsize::new(0));
    let pull_count = frame_count.clone();
    let mut pull = tokio::spawn(async move {
        let mut frames = frames;
        while frames.recv().await.is_some() {
            pull_count.fetch_add(1, Ordering::Relaxed);
        }
    });

    let reason = tokio::select! {
        _ = tokio::time::sleep(window) => RecordingClose::WindowElapsed,
        // A dropped sender counts as a stop: the owning machine went away
        _ = stop_rx => RecordingClose::Stopped,
        _ = &mut pull => RecordingClose::SourceEnded,
    };

    pull.abort();
    capture.release();

    debug!(
        "Recording session {} closed ({:?}, {} frames)",
        id,
        reason,
        frame_count.load(Ordering::Relaxed)
    );
    let _ = events.send(TurnEvent::RecordingClosed(reason)).await;
}
