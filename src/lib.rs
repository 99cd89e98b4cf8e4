//! Pocket Agent - Personal Device Assistant Library
//!
//! The interaction orchestrator for a personal-device assistant:
//! - Voice turn state machine (wake phrase, recording window, backend
//!   exchange, spoken reply)
//! - Call screening with blocklist and reputation lookup (fail-open)
//! - SMS triage through the backend decision endpoint (fail-closed)
//! - Observable status surface for a presentation layer
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pocket_agent::backend::BackendClient;
//! use pocket_agent::config::Config;
//! use pocket_agent::orchestrator::Orchestrator;
//! use pocket_agent::screening::HeuristicReputation;
//! use pocket_agent::types::CallEvent;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let backend = Arc::new(BackendClient::new(&config.backend)?);
//!     # let deps = unimplemented!();
//!     let orchestrator = Orchestrator::new(&config, Arc::new(HeuristicReputation), deps);
//!     let decision = orchestrator.screen_call(CallEvent::new(Some("+14155551234".into()))).await;
//!     println!("{decision:?}");
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod config;
pub mod backend;
pub mod telemetry;
pub mod voice;
pub mod screening;
pub mod orchestrator;
pub mod cli;

// Re-export commonly used types for convenience
pub use backend::{BackendClient, BackendError, ConversationBackend};
pub use config::Config;
pub use orchestrator::Orchestrator;
pub use screening::{CallScreener, HeuristicReputation, ReputationLookup, SmsTriage};
pub use telemetry::{ExchangeSink, TracingExchangeSink};
pub use types::{
    CallDecision, CallEvent, ConversationExchange, ReputationLevel, SmsAction, SmsEvent,
    StatusSnapshot, Transcript, TurnState,
};
pub use voice::{VoiceDeps, VoiceTurnHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Personal Device Assistant Library", NAME, VERSION)
}
