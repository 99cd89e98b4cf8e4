//! Caller reputation lookup
//!
//! The lookup is a seam: the default implementation is a local heuristic
//! over the identifier shape, but a richer service (local database or
//! remote API) can be swapped in without touching the call screener's
//! control flow.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ReputationLevel;

/// Seam for caller/sender trust classification. Bounded latency is the
/// caller's responsibility (the screener wraps lookups in a timeout).
#[async_trait]
pub trait ReputationLookup: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Result<ReputationLevel>;
}

/// Toll-free prefixes that commonly carry solicitation traffic
const TOLL_FREE_PREFIXES: &[&str] = &["800", "888", "877", "866", "855", "844", "833"];

/// Minimum digits for an identifier to look like a dialable number
const MIN_PLAUSIBLE_DIGITS: usize = 7;

/// Placeholder reputation policy over the identifier shape.
///
/// Withheld or short identifiers are treated as suspicious, explicit
/// country-code numbers as safe, toll-free prefixes as suspicious,
/// everything else as safe. Never errors.
#[derive(Debug, Default, Clone)]
pub struct HeuristicReputation;

fn normalized_digits(identifier: &str) -> String {
    identifier.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl ReputationLookup for HeuristicReputation {
    async fn lookup(&self, identifier: &str) -> Result<ReputationLevel> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(ReputationLevel::Suspicious);
        }

        let digits = normalized_digits(identifier);
        if digits.len() < MIN_PLAUSIBLE_DIGITS {
            return Ok(ReputationLevel::Suspicious);
        }

        if identifier.starts_with('+') {
            return Ok(ReputationLevel::Safe);
        }

        if TOLL_FREE_PREFIXES.iter().any(|p| digits.starts_with(p)) {
            return Ok(ReputationLevel::Suspicious);
        }

        Ok(ReputationLevel::Safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn level(identifier: &str) -> ReputationLevel {
        HeuristicReputation.lookup(identifier).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_identifier_is_suspicious() {
        assert_eq!(level("").await, ReputationLevel::Suspicious);
        assert_eq!(level("   ").await, ReputationLevel::Suspicious);
    }

    #[tokio::test]
    async fn test_short_identifier_is_suspicious() {
        assert_eq!(level("411").await, ReputationLevel::Suspicious);
        assert_eq!(level("555-12").await, ReputationLevel::Suspicious);
    }

    #[tokio::test]
    async fn test_country_code_is_safe() {
        assert_eq!(level("+14155551234").await, ReputationLevel::Safe);
        assert_eq!(level("+442071838750").await, ReputationLevel::Safe);
    }

    #[tokio::test]
    async fn test_toll_free_is_suspicious() {
        assert_eq!(level("8005551234").await, ReputationLevel::Suspicious);
        assert_eq!(level("8885551234").await, ReputationLevel::Suspicious);
    }

    #[tokio::test]
    async fn test_plain_ten_digit_number_is_safe() {
        assert_eq!(level("4155551234").await, ReputationLevel::Safe);
    }

    #[test]
    fn test_normalized_digits() {
        assert_eq!(normalized_digits("+1 (415) 555-1234"), "14155551234");
        assert_eq!(normalized_digits("no digits"), "");
    }
}
