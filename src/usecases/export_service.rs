//! End of day: post the ledger snapshot to the group, then start a fresh day.

use crate::domain::{DomainError, LedgerColumn, MealSlot};
use crate::ports::{ChatGateway, Clock, Ledger, StateStore};
use crate::shared::texts;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ExportService {
    gateway: Arc<dyn ChatGateway>,
    ledger: Arc<dyn Ledger>,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    chat_id: i64,
    reset_after_export: bool,
}

impl ExportService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        ledger: Arc<dyn Ledger>,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        chat_id: i64,
        reset_after_export: bool,
    ) -> Self {
        Self {
            gateway,
            ledger,
            state,
            clock,
            chat_id,
            reset_after_export,
        }
    }

    /// Snapshot the ledger, send it with a dated caption, then roll the day
    /// over when configured. A failed send skips the rollover so no marks are lost.
    pub async fn export_daily(&self) -> Result<PathBuf, DomainError> {
        let path = self.ledger.export_visual_snapshot().await?;
        let caption = format!(
            "{} {}",
            texts::SUMMARY_CAPTION_PREFIX,
            self.clock.today().format("%d.%m.%Y")
        );
        self.gateway
            .send_photo(self.chat_id, &path, Some(&caption))
            .await?;
        info!(path = %path.display(), "daily summary sent");

        if self.reset_after_export {
            self.rollover().await?;
        }
        Ok(path)
    }

    /// Clear every meal cell and all colors; drop expired excuses.
    /// Weight columns stay: tomorrow's delta is computed against them.
    pub async fn rollover(&self) -> Result<(), DomainError> {
        let rows = self.ledger.list_rows().await?;
        let mut cleared = 0usize;
        for row in &rows {
            for slot in MealSlot::ALL {
                if row.meal(slot).is_empty() {
                    continue;
                }
                self.ledger
                    .write_cell(row.row, LedgerColumn::Meal(slot), "")
                    .await?;
                cleared += 1;
            }
        }
        self.ledger.clear_paint().await?;
        if let Err(e) = self.state.cleanup_expired(self.clock.today()).await {
            warn!(error = %e, "excuse cleanup failed during rollover");
        }
        info!(rows = rows.len(), cleared, "day rolled over");
        Ok(())
    }
}
