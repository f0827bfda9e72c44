//! Commands, keyboard buttons and menu callbacks.
//!
//! `/start` and the reply-keyboard buttons are open to everyone; `/ping`,
//! `/export` and `/reset` only to configured admins.

use crate::adapters::assets::MenuCatalog;
use crate::adapters::assets::menu_catalog::CALLBACK_PREFIX;
use crate::domain::{CallbackQuery, ChatMessage, DomainError, Keyboard, MealSlot, escape_html};
use crate::ports::ChatGateway;
use crate::shared::texts;
use crate::usecases::export_service::ExportService;
use crate::usecases::reminder_service::ReminderService;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// A parsed command or button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Rules,
    Menu,
    ReportFormat,
    /// Remind now. `None` runs every configured reminder slot.
    Ping(Option<MealSlot>),
    Export,
    Reset,
}

impl Command {
    /// Recognize `/command[@bot] [arg]` or an exact button label.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            texts::BUTTON_RULES => return Some(Command::Rules),
            texts::BUTTON_MENU => return Some(Command::Menu),
            texts::BUTTON_REPORT_FORMAT => return Some(Command::ReportFormat),
            _ => {}
        }

        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let arg = parts.next();
        match name.as_str() {
            "start" => Some(Command::Start),
            "menu" => Some(Command::Menu),
            "rules" => Some(Command::Rules),
            "ping" => Some(Command::Ping(arg.and_then(MealSlot::parse))),
            "export" => Some(Command::Export),
            "reset" => Some(Command::Reset),
            _ => None,
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Command::Ping(_) | Command::Export | Command::Reset)
    }
}

pub fn main_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![
        texts::BUTTON_RULES.to_string(),
        texts::BUTTON_MENU.to_string(),
        texts::BUTTON_REPORT_FORMAT.to_string(),
    ]])
}

pub struct CommandService {
    gateway: Arc<dyn ChatGateway>,
    catalog: Arc<MenuCatalog>,
    reminders: Arc<ReminderService>,
    export: Arc<ExportService>,
    admin_ids: HashSet<i64>,
    reminder_slots: Vec<MealSlot>,
}

impl CommandService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        catalog: Arc<MenuCatalog>,
        reminders: Arc<ReminderService>,
        export: Arc<ExportService>,
        admin_ids: HashSet<i64>,
        reminder_slots: Vec<MealSlot>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            reminders,
            export,
            admin_ids,
            reminder_slots,
        }
    }

    /// Run `cmd` on behalf of the sender of `msg`.
    pub async fn execute(&self, cmd: Command, msg: &ChatMessage) -> Result<(), DomainError> {
        let chat_id = msg.chat_id;
        if cmd.requires_admin() && !self.admin_ids.contains(&msg.sender.id) {
            warn!(sender_id = msg.sender.id, command = ?cmd, "privileged command refused");
            return self
                .gateway
                .send_message(chat_id, texts::NOT_ALLOWED, None)
                .await;
        }

        let keyboard = main_keyboard();
        match cmd {
            Command::Start => {
                self.gateway
                    .send_message(chat_id, texts::GREETING, Some(&keyboard))
                    .await
            }
            Command::Rules => {
                self.gateway
                    .send_message(chat_id, texts::NUTRITION_RULES, Some(&keyboard))
                    .await
            }
            Command::ReportFormat => {
                self.gateway
                    .send_message(chat_id, texts::REPORT_FORMAT, Some(&keyboard))
                    .await
            }
            Command::Menu => {
                self.gateway
                    .send_message(chat_id, texts::PICK_MENU, Some(&self.catalog.keyboard()))
                    .await
            }
            Command::Ping(slot) => {
                let slots = slot.map_or_else(|| self.reminder_slots.clone(), |s| vec![s]);
                let mut pinged = 0;
                for slot in slots {
                    pinged += self.reminders.ping_missing(slot).await?;
                }
                info!(sender_id = msg.sender.id, pinged, "manual reminder run");
                self.gateway.send_message(chat_id, texts::PING_DONE, None).await
            }
            Command::Export => {
                self.export.export_daily().await?;
                self.gateway.send_message(chat_id, texts::EXPORT_DONE, None).await
            }
            Command::Reset => {
                self.export.rollover().await?;
                self.gateway.send_message(chat_id, texts::RESET_DONE, None).await
            }
        }
    }

    /// Inline button press. Only `menu:<key>` callbacks are known.
    pub async fn handle_callback(&self, cb: &CallbackQuery) -> Result<(), DomainError> {
        let Some(key) = cb.data.strip_prefix(CALLBACK_PREFIX) else {
            return self.gateway.answer_callback(&cb.id, None, false).await;
        };
        let Some(assets) = self.catalog.lookup(key) else {
            return self
                .gateway
                .answer_callback(&cb.id, Some(texts::MENU_NOT_FOUND), true)
                .await;
        };
        let Some(chat_id) = cb.chat_id else {
            return self.gateway.answer_callback(&cb.id, None, false).await;
        };

        let caption = format!("📋 Меню: {}", escape_html(key));
        for asset in assets {
            match &asset.path {
                Some(path) => {
                    self.gateway
                        .send_photo(chat_id, path, Some(&caption))
                        .await?
                }
                None => {
                    warn!(file = asset.file_name, "menu file missing");
                    self.gateway
                        .send_message(
                            chat_id,
                            &format!("Файл не найден: {}", escape_html(asset.file_name)),
                            None,
                        )
                        .await?
                }
            }
        }
        self.gateway.answer_callback(&cb.id, None, false).await
    }
}
