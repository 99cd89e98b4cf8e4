//! Conversation backend client
//!
//! HTTP client for the remote conversation service. Two endpoints matter to
//! the orchestrator: the conversation round trip that produces a spoken
//! reply, and the SMS decision endpoint that produces an auto-reply or
//! "no action". Any non-success response, timeout, or connect failure is a
//! [`BackendError`]; callers decide the safe default (fallback utterance for
//! voice turns, silence for SMS).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BackendConfig;

/// Failure modes of a backend round trip.
///
/// `Transport` covers connectivity-level faults (DNS, connect, timeout);
/// everything else reached the service but did not yield a usable reply.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend returned status {status}")]
    Api { status: u16 },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// True for connectivity-level faults, as opposed to service faults
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

/// SMS decision as seen by the triage classifier: reply text when the
/// backend said to respond, `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsDecision {
    pub reply: Option<String>,
}

/// Seam for the remote conversation service.
///
/// The production implementation is [`BackendClient`]; tests substitute
/// scripted fakes.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Round-trip a transcript and return the reply text
    async fn process_conversation(&self, user_id: i64, text: &str) -> Result<String, BackendError>;

    /// Ask the service whether to auto-reply to a message
    async fn make_sms_decision(&self, user_id: i64, text: &str) -> Result<SmsDecision, BackendError>;
}

#[derive(Debug, Serialize)]
struct ConversationRequest<'a> {
    user_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConversationResponse {
    gpt_response: String,
}

#[derive(Debug, Serialize)]
struct SmsDecisionRequest<'a> {
    user_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsDecisionResponse {
    decision: String,
    #[serde(default)]
    reply_text: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// HTTP client for the conversation backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client from backend configuration
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend {} returned status {}", path, status);
            return Err(BackendError::Api { status: status.as_u16() });
        }

        response.json().await.map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Probe the backend health endpoint
    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        let response = self.client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Api { status: status.as_u16() });
        }

        response.json().await.map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ConversationBackend for BackendClient {
    async fn process_conversation(&self, user_id: i64, text: &str) -> Result<String, BackendError> {
        debug!("Sending conversation request ({} chars)", text.len());
        let response: ConversationResponse = self
            .post_json("/conversation/", &ConversationRequest { user_id, text })
            .await?;
        Ok(response.gpt_response)
    }

    async fn make_sms_decision(&self, user_id: i64, text: &str) -> Result<SmsDecision, BackendError> {
        debug!("Sending SMS decision request ({} chars)", text.len());
        let response: SmsDecisionResponse = self
            .post_json("/sms/decision", &SmsDecisionRequest { user_id, text })
            .await?;

        let reply = if response.decision.eq_ignore_ascii_case("yes")
            && !response.reply_text.trim().is_empty()
        {
            Some(response.reply_text)
        } else {
            None
        };

        Ok(SmsDecision { reply })
    }
}
