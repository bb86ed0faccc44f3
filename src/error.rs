//! Crate error taxonomy.
//!
//! Two classes matter to callers: fatal errors (bad configuration, malformed
//! addresses, a transaction that reverted on chain) propagate immediately and
//! abort the run; transient errors (transport failures, non-success API
//! statuses, indexer lag) are absorbed inside the polling and reconciliation
//! loops and degrade to a fallback value instead of surfacing.

use crate::address::AddressParseError;

pub type Result<T> = std::result::Result<T, OnboardError>;

#[derive(Debug, thiserror::Error)]
pub enum OnboardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressParseError),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed API response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("market not found: {0}")]
    MarketNotFound(String),

    #[error("invalid market spec: {0}")]
    InvalidMarketSpec(String),

    #[error("transaction service error: {0}")]
    Transaction(String),

    #[error("transaction {0} failed on chain")]
    TransactionFailed(String),

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OnboardError {
    /// Whether a bounded-retry loop may swallow this error and try again.
    /// Fatal classes must propagate; retrying them cannot help and risks
    /// masking a misconfiguration.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OnboardError::Transport(_)
                | OnboardError::Api { .. }
                | OnboardError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(
            OnboardError::Api {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!OnboardError::MissingSetting("SUBACCOUNT_ADDRESS").is_transient());
        assert!(!OnboardError::InvalidAddress(AddressParseError::Empty).is_transient());
        assert!(!OnboardError::TransactionFailed("0xabc".to_string()).is_transient());
    }
}
