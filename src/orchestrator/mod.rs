//! Interaction orchestrator
//!
//! Hosts the voice turn machine and the two screening classifiers behind
//! one constructed-and-passed-by-handle instance: no process-wide
//! singletons. Platform events enter here, get dispatched to the relevant
//! pipeline, and status transitions flow out through a watch channel for
//! whatever presentation layer is observing.
//!
//! Concurrency model: the voice machine runs on its own task and owns all
//! voice-turn state; call screening and SMS triage are pure per-invocation
//! pipelines, so a call can be screened while a turn is Speaking without
//! any cross-classifier locking.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::screening::{CallScreener, ReputationLookup, SmsTriage};
use crate::types::{CallDecision, CallEvent, SmsAction, SmsEvent, StatusSnapshot};
use crate::voice::turn::{spawn_voice_turn, VoiceDeps, VoiceTurnHandle};

/// The assembled interaction pipeline.
pub struct Orchestrator {
    voice: VoiceTurnHandle,
    voice_task: JoinHandle<()>,
    screener: CallScreener,
    sms: SmsTriage,
}

impl Orchestrator {
    /// Assemble the orchestrator from configuration and collaborator
    /// handles. Nothing starts listening until [`resume`](Self::resume).
    pub fn new(config: &Config, reputation: Arc<dyn ReputationLookup>, deps: VoiceDeps) -> Self {
        let screener = CallScreener::new(&config.screening, reputation);
        let sms = SmsTriage::new(&config.sms, config.backend.user_id, deps.backend.clone());
        let (voice, voice_task) = spawn_voice_turn(&config.voice, config.backend.user_id, deps);

        info!("Orchestrator assembled (wake phrase {:?})", config.voice.wake_phrase);
        Self { voice, voice_task, screener, sms }
    }

    /// Screen one incoming call. Safe to invoke concurrently with anything.
    pub async fn screen_call(&self, event: CallEvent) -> CallDecision {
        debug!("Screening call from {:?}", event.caller_id);
        self.screener.classify(&event).await
    }

    /// Triage one incoming message. Safe to invoke concurrently with
    /// anything.
    pub async fn triage_sms(&self, event: SmsEvent) -> SmsAction {
        debug!("Triaging message from {:?}", event.sender);
        self.sms.triage(&event).await
    }

    /// Start (or recover) the voice turn machine
    pub async fn resume(&self) {
        self.voice.resume().await;
    }

    /// Drop the voice turn machine to Idle, cancelling in-flight work
    pub async fn pause(&self) {
        self.voice.pause().await;
    }

    /// Close the current recording window, if one is open
    pub async fn stop_recording(&self) {
        self.voice.stop_recording().await;
    }

    /// Handle for the voice turn machine (commands + status)
    pub fn voice(&self) -> &VoiceTurnHandle {
        &self.voice
    }

    /// Subscribe to voice turn status snapshots
    pub fn status(&self) -> watch::Receiver<StatusSnapshot> {
        self.voice.status()
    }

    /// Tear everything down and wait for the machine task to exit.
    /// Collaborator releases are idempotent, so shutdown is safe whether or
    /// not the machine ever started.
    pub async fn shutdown(self) {
        info!("Orchestrator shutting down");
        self.voice.shutdown().await;
        let _ = self.voice_task.await;
    }
}
