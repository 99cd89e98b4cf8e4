//! Telemetry sink for completed voice turns
//!
//! The voice turn machine hands each completed exchange to a sink and keeps
//! no history of its own. The default sink logs through `tracing`; a real
//! deployment can swap in one that ships exchanges to the backend log.

use async_trait::async_trait;
use tracing::info;

use crate::types::ConversationExchange;

/// Seam for whoever owns conversation history.
#[async_trait]
pub trait ExchangeSink: Send + Sync {
    /// Take ownership of one completed exchange
    async fn record(&self, exchange: ConversationExchange);
}

/// Default sink: structured log line per exchange, nothing retained.
#[derive(Debug, Default, Clone)]
pub struct TracingExchangeSink;

#[async_trait]
impl ExchangeSink for TracingExchangeSink {
    async fn record(&self, exchange: ConversationExchange) {
        info!(
            exchange_id = %exchange.id,
            user_id = exchange.user_id,
            input_chars = exchange.input_text.len(),
            reply_chars = exchange.reply_text.len(),
            "Voice turn completed"
        );
    }
}
