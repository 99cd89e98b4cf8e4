//! SMS triage classifier
//!
//! Forwards an incoming message to the backend decision endpoint and maps
//! the result to a reply or no action. Unlike the voice turn, the safe
//! default here is silence: an erroneous auto-reply to an unknown sender is
//! worse than no reply, so every failure path returns `NoAction`.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::ConversationBackend;
use crate::config::SmsConfig;
use crate::types::{SmsAction, SmsEvent};

/// Per-message decision pipeline. No shared mutable state.
pub struct SmsTriage {
    backend: Arc<dyn ConversationBackend>,
    user_id: i64,
    timeout: Duration,
}

impl SmsTriage {
    pub fn new(config: &SmsConfig, user_id: i64, backend: Arc<dyn ConversationBackend>) -> Self {
        Self {
            backend,
            user_id,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Triage one incoming message into a reply or no action
    pub async fn triage(&self, event: &SmsEvent) -> SmsAction {
        if event.body.trim().is_empty() {
            debug!("Ignoring empty message from {:?}", event.sender);
            return SmsAction::NoAction;
        }

        let decision = tokio::time::timeout(
            self.timeout,
            self.backend.make_sms_decision(self.user_id, &event.body),
        )
        .await;

        match decision {
            Ok(Ok(decision)) => match decision.reply {
                Some(reply) if !reply.trim().is_empty() => {
                    info!("Auto-reply decided for message from {:?}", event.sender);
                    SmsAction::Reply(reply)
                }
                _ => {
                    debug!("No reply decided for message from {:?}", event.sender);
                    SmsAction::NoAction
                }
            },
            Ok(Err(e)) => {
                warn!("SMS decision failed, taking no action: {e}");
                SmsAction::NoAction
            }
            Err(_) => {
                warn!("SMS decision exceeded {:?}, taking no action", self.timeout);
                SmsAction::NoAction
            }
        }
    }
}
