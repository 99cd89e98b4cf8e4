//! Audio capture collaborator seam
//!
//! The capture source produces fixed-size frames over a channel while a
//! recording window is open. The orchestrator never touches the platform
//! audio stack directly; it only pulls frames and releases the handle.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One fixed-size chunk of captured audio
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
}

/// Seam for the platform audio capture source.
#[async_trait]
pub trait AudioCaptureSource: Send + Sync {
    /// Open a capture stream; frames stop when the receiver is dropped
    async fn open_stream(&self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Release the capture handle. Idempotent; safe when never acquired.
    fn release(&self);
}

/// Frame cadence for the silent source
const FRAME_INTERVAL_MS: u64 = 20;

/// Samples per frame at 16 kHz mono with 20 ms frames
const FRAME_SAMPLES: usize = 320;

/// Capture source that produces silence, for console mode and tests where
/// no microphone exists.
#[derive(Debug, Default)]
pub struct SilentCaptureSource {
    released: AtomicBool,
}

#[async_trait]
impl AudioCaptureSource for SilentCaptureSource {
    async fn open_stream(&self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(FRAME_INTERVAL_MS));
            loop {
                interval.tick().await;
                let frame = AudioFrame { samples: vec![0.0; FRAME_SAMPLES] };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

impl SilentCaptureSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
