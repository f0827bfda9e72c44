//! Routes each update: callbacks and commands to `CommandService`, anything
//! else to `ReportService`. Lateness warnings are posted back to the chat.

use crate::domain::{ChatMessage, DomainError, IncomingUpdate};
use crate::ports::{ChatGateway, UpdateHandler};
use crate::usecases::command_service::{Command, CommandService};
use crate::usecases::report_service::{ReportOutcome, ReportService};
use std::sync::Arc;
use tracing::debug;

pub struct Dispatcher {
    gateway: Arc<dyn ChatGateway>,
    commands: Arc<CommandService>,
    reports: Arc<ReportService>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        commands: Arc<CommandService>,
        reports: Arc<ReportService>,
    ) -> Self {
        Self {
            gateway,
            commands,
            reports,
        }
    }

    async fn handle_message(&self, msg: ChatMessage) -> Result<(), DomainError> {
        if let Some(cmd) = Command::parse(&msg.text) {
            debug!(sender_id = msg.sender.id, command = ?cmd, "command");
            return self.commands.execute(cmd, &msg).await;
        }
        if let ReportOutcome::Applied(applied) = self.reports.handle_message(&msg).await? {
            if let Some(warning) = applied.late_warning {
                self.gateway.send_message(msg.chat_id, warning, None).await?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UpdateHandler for Dispatcher {
    async fn handle_update(&self, update: IncomingUpdate) -> Result<(), DomainError> {
        match update {
            IncomingUpdate::Callback(cb) => self.commands.handle_callback(&cb).await,
            IncomingUpdate::Message(msg) => self.handle_message(msg).await,
        }
    }
}
