//! Shared types used across modules
//!
//! This module contains the event and decision types that flow between the
//! orchestrator, the voice turn machine, and the screening classifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recognized piece of speech.
///
/// Partial transcripts are streaming and may be overwritten; only final
/// transcripts trigger downstream action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub is_final: bool,
}

impl Transcript {
    /// Create a streaming (partial) transcript
    pub fn partial(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: false }
    }

    /// Create a final transcript
    pub fn finalized(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: true }
    }
}

/// One completed voice turn: what the user said and what was spoken back.
///
/// Ownership transfers to the telemetry sink after creation; the
/// orchestrator keeps no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationExchange {
    pub id: Uuid,
    pub user_id: i64,
    pub input_text: String,
    pub reply_text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationExchange {
    pub fn new(user_id: i64, input_text: impl Into<String>, reply_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            input_text: input_text.into(),
            reply_text: reply_text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An incoming phone call, consumed synchronously by the call screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    /// Caller identifier as reported by the platform; may be withheld
    pub caller_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CallEvent {
    pub fn new(caller_id: Option<String>) -> Self {
        Self { caller_id, timestamp: Utc::now() }
    }
}

/// Screening decision for one incoming call.
///
/// Invariants: `reject` implies `!allow`; `allow` implies `!reject` and
/// `!silence`. The three constructors are the only way decisions are built,
/// so the invariants hold by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDecision {
    pub allow: bool,
    pub reject: bool,
    pub silence: bool,
    pub suppress_notification: bool,
}

impl CallDecision {
    /// Let the call through: ring and notify normally
    pub fn allowed() -> Self {
        Self { allow: true, reject: false, silence: false, suppress_notification: false }
    }

    /// Let the call through at the protocol layer but mute it for the user
    pub fn ring_suppressed() -> Self {
        Self { allow: true, reject: false, silence: true, suppress_notification: true }
    }

    /// Reject the call outright
    pub fn blocked() -> Self {
        Self { allow: false, reject: true, silence: true, suppress_notification: true }
    }
}

/// Trust classification for a caller or sender identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationLevel {
    Safe,
    Suspicious,
    Blocked,
}

impl std::fmt::Display for ReputationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReputationLevel::Safe => write!(f, "safe"),
            ReputationLevel::Suspicious => write!(f, "suspicious"),
            ReputationLevel::Blocked => write!(f, "blocked"),
        }
    }
}

/// An incoming text message, consumed synchronously by the SMS triage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsEvent {
    pub sender: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl SmsEvent {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self { sender: sender.into(), body: body.into(), timestamp: Utc::now() }
    }
}

/// Outcome of SMS triage: either send the given reply or do nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmsAction {
    Reply(String),
    NoAction,
}

/// Lifecycle state of the voice turn machine.
///
/// Exactly one is active per orchestrator at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    Idle,
    Initializing,
    Listening,
    Processing,
    Speaking,
    Error,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Idle => write!(f, "idle"),
            TurnState::Initializing => write!(f, "initializing"),
            TurnState::Listening => write!(f, "listening"),
            TurnState::Processing => write!(f, "processing"),
            TurnState::Speaking => write!(f, "speaking"),
            TurnState::Error => write!(f, "error"),
        }
    }
}

/// Point-in-time view of the voice turn machine, published to observers
/// after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: TurnState,
    pub last_error: Option<String>,
    pub listening: bool,
    pub recording: bool,
    pub last_activity: DateTime<Utc>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            state: TurnState::Idle,
            last_error: None,
            listening: false,
            recording: false,
            last_activity: Utc::now(),
        }
    }
}
