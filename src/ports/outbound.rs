//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    CellColor, DomainError, Keyboard, LedgerColumn, LedgerRow, RowHandle, UpdateEnvelope,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Chat transport. Receive updates, send replies, photos and keyboards.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Long-poll for updates with `update_id >= offset`. Waits up to `timeout_secs`.
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<UpdateEnvelope>, DomainError>;

    /// Send an HTML-formatted message, optionally with a keyboard.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DomainError>;

    /// Send a local image file with an optional caption.
    async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), DomainError>;

    /// Acknowledge an inline button press. `alert` shows a modal instead of a toast.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), DomainError>;
}

/// Tabular ledger: one row per participant, fixed column layout (see `LedgerColumn`).
///
/// Writes to one row must be serialized by the caller; the ledger itself only
/// guarantees that each single write is atomic.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn find_row_for_user(&self, sender_id: i64) -> Result<Option<RowHandle>, DomainError>;

    /// Rows whose surname cell equals `surname`, or starts with it followed by a given name.
    async fn find_rows_by_surname(&self, surname: &str) -> Result<Vec<RowHandle>, DomainError>;

    /// Append a participant row. Returns its handle.
    async fn append_row(&self, surname: &str, sender_id: i64) -> Result<RowHandle, DomainError>;

    async fn read_cell(&self, row: RowHandle, column: LedgerColumn) -> Result<String, DomainError>;

    async fn write_cell(
        &self,
        row: RowHandle,
        column: LedgerColumn,
        value: &str,
    ) -> Result<(), DomainError>;

    async fn paint_row(&self, row: RowHandle, color: CellColor) -> Result<(), DomainError>;

    async fn paint_cell(
        &self,
        row: RowHandle,
        column: LedgerColumn,
        color: CellColor,
    ) -> Result<(), DomainError>;

    /// Remove every row and cell color.
    async fn clear_paint(&self) -> Result<(), DomainError>;

    async fn list_rows(&self) -> Result<Vec<LedgerRow>, DomainError>;

    /// Render the current ledger (values and colors) to an image file.
    async fn export_visual_snapshot(&self) -> Result<PathBuf, DomainError>;
}

/// Small per-user flags, persisted as one document read and written wholesale.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// True if excused on `today` or an "excused until" date on file is not past.
    async fn is_excused_today(&self, sender_id: i64, today: NaiveDate) -> Result<bool, DomainError>;

    /// Excuse for `today` only.
    async fn mark_excused(&self, sender_id: i64, today: NaiveDate) -> Result<(), DomainError>;

    async fn set_excused_until(&self, sender_id: i64, until: NaiveDate) -> Result<(), DomainError>;

    /// Remember how to mention the user in reminders.
    async fn record_mention(&self, sender_id: i64, tag: &str) -> Result<(), DomainError>;

    async fn mentions(&self) -> Result<HashMap<i64, String>, DomainError>;

    /// Drop "excused until" dates before `today` and one-day excuses for other days.
    async fn cleanup_expired(&self, today: NaiveDate) -> Result<(), DomainError>;
}

/// Wall clock in the group's local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
