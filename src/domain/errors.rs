//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. The classifier never fails.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Chat gateway error: {0}")]
    Gateway(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Asset error: {0}")]
    Asset(String),

    /// Transport failure, 5xx or busy file: the same request may succeed later.
    #[error("Temporarily unavailable: {0}")]
    Unavailable(String),

    /// Telegram answered 429: caller should retry after `seconds` seconds.
    #[error("Rate limited: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },
}

impl DomainError {
    /// Transient failures worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::RateLimited { .. } | DomainError::Unavailable(_)
        )
    }
}
