//! Long-polling loop. Fetches updates with an advancing offset and hands each
//! one to the `UpdateHandler` on its own task, bounded by a semaphore.
//!
//! Handler errors are logged and never stop the loop; gateway errors back off.

use crate::domain::{DomainError, UpdateEnvelope};
use crate::ports::{ChatGateway, UpdateHandler};
use crate::shared::retry::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub struct PollingService {
    gateway: Arc<dyn ChatGateway>,
    handler: Arc<dyn UpdateHandler>,
    timeout_secs: u64,
    permits: Arc<Semaphore>,
    backoff: RetryPolicy,
}

impl PollingService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        handler: Arc<dyn UpdateHandler>,
        timeout_secs: u64,
        max_concurrent: usize,
    ) -> Self {
        Self {
            gateway,
            handler,
            timeout_secs,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            backoff: RetryPolicy::default(),
        }
    }

    /// Offset that acknowledges every update in `batch`.
    pub fn next_offset(current: i64, batch: &[UpdateEnvelope]) -> i64 {
        batch
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .map_or(current, |next| next.max(current))
    }

    /// Poll until the process stops.
    pub async fn run(&self) {
        info!(timeout_secs = self.timeout_secs, "polling started");
        let mut offset = 0i64;
        let mut failures = 0u32;
        loop {
            let batch = match self.gateway.get_updates(offset, self.timeout_secs).await {
                Ok(batch) => {
                    failures = 0;
                    batch
                }
                Err(e) => {
                    let wait = match &e {
                        DomainError::RateLimited { seconds } => Duration::from_secs(*seconds),
                        _ => self.backoff.backoff(failures),
                    };
                    failures = failures.saturating_add(1);
                    warn!(error = %e, wait_ms = wait.as_millis() as u64, "getUpdates failed");
                    tokio::time::sleep(wait).await;
                    continue;
                }
            };

            offset = Self::next_offset(offset, &batch);
            for envelope in batch {
                let Some(update) = envelope.update else {
                    continue;
                };
                let permit = match Arc::clone(&self.permits).acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => {
                        error!("update semaphore closed, stopping");
                        return;
                    }
                };
                let handler = Arc::clone(&self.handler);
                let update_id = envelope.update_id;
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = handler.handle_update(update).await {
                        error!(update_id, error = %e, "update handling failed");
                    }
                });
            }
        }
    }
}
