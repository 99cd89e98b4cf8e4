//! Speech synthesizer collaborator seam
//!
//! `speak` resolves when playback completes, which is what drives the
//! Speaking→Listening transition. Synthesis faults are recoverable: the
//! turn machine logs them and returns to Listening.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Seam for the platform speech synthesizer.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Prepare the engine; resolves once it can accept utterances
    async fn prepare(&self) -> Result<()>;

    /// Speak an utterance, optionally flushing anything queued first.
    /// Resolves when playback completes.
    async fn speak(&self, text: &str, flush: bool) -> Result<()>;

    /// Release the engine. Idempotent; safe when never prepared.
    fn release(&self);
}

/// Synthesizer that prints utterances to stdout, for console mode.
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer {
    released: AtomicBool,
}

impl ConsoleSynthesizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn prepare(&self) -> Result<()> {
        self.released.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn speak(&self, text: &str, _flush: bool) -> Result<()> {
        println!("[assistant] {text}");
        Ok(())
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
