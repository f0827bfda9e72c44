//! Inbound port. The polling loop (driving adapter) calls into the application.

use crate::domain::{DomainError, IncomingUpdate};

/// Handles one update received from the chat.
#[async_trait::async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle_update(&self, update: IncomingUpdate) -> Result<(), DomainError>;
}
