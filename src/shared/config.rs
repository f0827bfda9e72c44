//! Application configuration. Bot credentials, paths, schedule.

use crate::domain::{DomainError, MealSlot};
use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use serde::Deserialize;
use std::collections::HashSet;

/// Telegram Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Group timezone offset in hours (Europe/Moscow, no DST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

/// Default reminder schedule: ping missing lunch reports at 12:30.
pub const DEFAULT_REMINDERS: &str = "lunch@12:30";

pub const DEFAULT_EXPORT_AT: &str = "21:00";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bot token from @BotFather. Read from NUTRITION_BOT_TOKEN or BOT_TOKEN.
    pub bot_token: Option<String>,

    /// Group chat receiving reminders and the daily summary. Read from NUTRITION_CHAT_ID or TELEGRAM_CHAT_ID.
    #[serde(default)]
    pub chat_id: Option<i64>,

    #[serde(default)]
    pub api_url: Option<String>,

    /// Directory for ledger.csv, state.json and exported snapshots.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Directory with menu images.
    #[serde(default)]
    pub assets_dir: Option<String>,

    #[serde(default)]
    pub utc_offset_hours: Option<i32>,

    /// Comma-separated user ids allowed to run privileged commands.
    #[serde(default)]
    pub admin_ids: Option<String>,

    /// Comma-separated `slot@HH:MM` reminder times, e.g. "lunch@12:30,snack2@15:30".
    #[serde(default)]
    pub reminders: Option<String>,

    /// Local time of the daily summary export, "HH:MM".
    #[serde(default)]
    pub export_at: Option<String>,

    /// Clear meal marks and colors after the daily export.
    #[serde(default)]
    pub reset_after_export: Option<bool>,

    /// Append a ledger row for senders whose surname is not found.
    #[serde(default)]
    pub auto_register: Option<bool>,

    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Updates handled concurrently by the polling loop.
    #[serde(default)]
    pub max_concurrent_updates: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("NUTRITION"));
        if let Ok(path) = std::env::var("NUTRITION_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // BOT_TOKEN / TELEGRAM_CHAT_ID are read directly (no prefix) so an existing .env keeps working
        if cfg.bot_token.is_none() {
            cfg.bot_token = std::env::var("BOT_TOKEN").ok().filter(|s| !s.is_empty());
        }
        if cfg.chat_id.is_none() {
            if let Ok(s) = std::env::var("TELEGRAM_CHAT_ID") {
                if let Ok(id) = s.trim().parse::<i64>() {
                    cfg.chat_id = Some(id);
                }
            }
        }
        Ok(cfg)
    }

    pub fn bot_token(&self) -> Result<String, DomainError> {
        self.bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DomainError::Config("set NUTRITION_BOT_TOKEN (or BOT_TOKEN)".into()))
    }

    pub fn chat_id(&self) -> Result<i64, DomainError> {
        self.chat_id.ok_or_else(|| {
            DomainError::Config("set NUTRITION_CHAT_ID (or TELEGRAM_CHAT_ID)".into())
        })
    }

    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn assets_dir_or_default(&self) -> String {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| "./assets/menus".to_string())
    }

    /// Returns the group's fixed UTC offset. Falls back to UTC if out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        let hours = self.utc_offset_hours.unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Parsed admin allow-list. Entries that are not integers are ignored.
    pub fn admin_ids(&self) -> HashSet<i64> {
        self.admin_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect()
    }

    pub fn reminders(&self) -> Result<Vec<(MealSlot, NaiveTime)>, DomainError> {
        parse_reminders(self.reminders.as_deref().unwrap_or(DEFAULT_REMINDERS))
    }

    pub fn export_at(&self) -> Result<NaiveTime, DomainError> {
        parse_hh_mm(self.export_at.as_deref().unwrap_or(DEFAULT_EXPORT_AT))
    }

    pub fn reset_after_export_or_default(&self) -> bool {
        self.reset_after_export.unwrap_or(true)
    }

    pub fn auto_register_or_default(&self) -> bool {
        self.auto_register.unwrap_or(false)
    }

    /// Long-poll timeout in seconds. Defaults to 30.
    pub fn poll_timeout_secs_or_default(&self) -> u64 {
        self.poll_timeout_secs.unwrap_or(30)
    }

    pub fn max_concurrent_updates_or_default(&self) -> usize {
        self.max_concurrent_updates.unwrap_or(4).max(1)
    }
}

pub fn parse_hh_mm(s: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| DomainError::Config(format!("bad time '{}': {}", s, e)))
}

/// Parse "lunch@12:30,snack2@15:30". Empty entries are skipped.
pub fn parse_reminders(s: &str) -> Result<Vec<(MealSlot, NaiveTime)>, DomainError> {
    let mut out = Vec::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (slot, time) = entry
            .split_once('@')
            .ok_or_else(|| DomainError::Config(format!("reminder '{}' is not slot@HH:MM", entry)))?;
        let slot = MealSlot::parse(slot)
            .ok_or_else(|| DomainError::Config(format!("unknown meal slot '{}'", slot)))?;
        out.push((slot, parse_hh_mm(time)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reminders() {
        let r = parse_reminders("lunch@12:30, snack2@15:45").unwrap();
        assert_eq!(
            r,
            vec![
                (MealSlot::Lunch, NaiveTime::from_hms_opt(12, 30, 0).unwrap()),
                (MealSlot::Snack2, NaiveTime::from_hms_opt(15, 45, 0).unwrap()),
            ]
        );
        assert!(parse_reminders("").unwrap().is_empty());
        assert!(parse_reminders("brunch@11:00").is_err());
        assert!(parse_reminders("lunch").is_err());
        assert!(parse_reminders("lunch@25:00").is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_url_or_default(), DEFAULT_API_URL);
        assert_eq!(cfg.utc_offset().local_minus_utc(), 3 * 3600);
        assert_eq!(
            cfg.export_at().unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap()
        );
        assert_eq!(cfg.reminders().unwrap().len(), 1);
        assert!(cfg.reset_after_export_or_default());
        assert!(!cfg.auto_register_or_default());
        assert!(cfg.bot_token().is_err());
    }

    #[test]
    fn test_admin_ids() {
        let cfg = AppConfig {
            admin_ids: Some("830570573, 12,abc".into()),
            ..Default::default()
        };
        let ids = cfg.admin_ids();
        assert!(ids.contains(&830570573));
        assert!(ids.contains(&12));
        assert_eq!(ids.len(), 2);
    }
}
