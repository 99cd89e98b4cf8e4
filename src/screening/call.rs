//! Call screening classifier
//!
//! Synchronous decision pipeline for one incoming call: blocklist check
//! first (short-circuit, no lookup), then reputation under a timeout. The
//! pipeline fails open: a screening fault must never block a legitimate
//! call, so any lookup error or timeout yields the fully-allowed decision.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScreeningConfig;
use crate::screening::reputation::ReputationLookup;
use crate::types::{CallDecision, CallEvent, ReputationLevel};

/// Per-call decision pipeline. No shared mutable state; safe to invoke
/// concurrently with voice turns and SMS triage.
pub struct CallScreener {
    blocked_terms: Vec<String>,
    reputation: Arc<dyn ReputationLookup>,
    timeout: Duration,
}

impl CallScreener {
    pub fn new(config: &ScreeningConfig, reputation: Arc<dyn ReputationLookup>) -> Self {
        let blocked_terms = config
            .blocked_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            blocked_terms,
            reputation,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Classify one incoming call into a screening decision
    pub async fn classify(&self, event: &CallEvent) -> CallDecision {
        let identifier = event.caller_id.as_deref().unwrap_or("").trim();
        let lowered = identifier.to_lowercase();

        if !lowered.is_empty() && self.blocked_terms.iter().any(|t| lowered.contains(t)) {
            info!("Caller {:?} matches blocklist, rejecting", identifier);
            return CallDecision::blocked();
        }

        match tokio::time::timeout(self.timeout, self.reputation.lookup(identifier)).await {
            Ok(Ok(level)) => {
                debug!("Caller {:?} classified as {}", identifier, level);
                match level {
                    ReputationLevel::Safe => CallDecision::allowed(),
                    ReputationLevel::Suspicious => CallDecision::ring_suppressed(),
                    ReputationLevel::Blocked => CallDecision::blocked(),
                }
            }
            Ok(Err(e)) => {
                warn!("Reputation lookup failed, allowing call: {e:#}");
                CallDecision::allowed()
            }
            Err(_) => {
                warn!("Reputation lookup exceeded {:?}, allowing call", self.timeout);
                CallDecision::allowed()
            }
        }
    }
}
