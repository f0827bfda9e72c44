//! Reminders: mention everyone who has not reported a meal slot yet.

use crate::domain::{DomainError, MealSlot, user_link};
use crate::ports::{ChatGateway, Clock, Ledger, StateStore};
use crate::shared::texts;
use std::sync::Arc;
use tracing::info;

pub struct ReminderService {
    gateway: Arc<dyn ChatGateway>,
    ledger: Arc<dyn Ledger>,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    chat_id: i64,
}

impl ReminderService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        ledger: Arc<dyn Ledger>,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        chat_id: i64,
    ) -> Self {
        Self {
            gateway,
            ledger,
            state,
            clock,
            chat_id,
        }
    }

    /// Ping linked participants with an empty `slot` cell who are not excused
    /// today. Sends nothing when everyone reported. Returns how many were pinged.
    pub async fn ping_missing(&self, slot: MealSlot) -> Result<usize, DomainError> {
        let today = self.clock.today();
        self.state.cleanup_expired(today).await?;

        let mentions = self.state.mentions().await?;
        let mut lines = Vec::new();
        for row in self.ledger.list_rows().await? {
            let Some(sender_id) = row.sender_id else {
                continue;
            };
            if row.has_meal_report(slot) || self.state.is_excused_today(sender_id, today).await? {
                continue;
            }
            lines.push(
                mentions
                    .get(&sender_id)
                    .cloned()
                    .unwrap_or_else(|| user_link(sender_id, "")),
            );
        }

        if lines.is_empty() {
            info!(slot = %slot, "everyone reported, no reminder");
            return Ok(0);
        }

        let text = format!(
            "{}\n\n{}",
            texts::missing_report_header(slot.title()),
            lines.join("\n")
        );
        self.gateway.send_message(self.chat_id, &text, None).await?;
        info!(slot = %slot, missing = lines.len(), "reminder sent");
        Ok(lines.len())
    }
}
