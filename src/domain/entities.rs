//! Domain entities. Pure data structures for the core business.
//!
//! No wire formats here; adapters map Bot API payloads into these types.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Classification values
// ─────────────────────────────────────────────────────────────────────────────

/// A chat message as the classifier sees it: text, sender and local send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub text: String,
    pub sender_id: i64,
    /// Wall-clock time in the group's configured timezone.
    pub sent_at: NaiveDateTime,
}

impl RawMessage {
    pub fn new(text: impl Into<String>, sender_id: i64, sent_at: NaiveDateTime) -> Self {
        Self {
            text: text.into(),
            sender_id,
            sent_at,
        }
    }

    pub fn hour(&self) -> u32 {
        self.sent_at.hour()
    }

    pub fn minute(&self) -> u32 {
        self.sent_at.minute()
    }

    pub fn date(&self) -> NaiveDate {
        self.sent_at.date()
    }
}

/// One of the five daily meal slots, in ledger column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Snack1,
    Lunch,
    Snack2,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::Snack1,
        MealSlot::Lunch,
        MealSlot::Snack2,
        MealSlot::Dinner,
    ];

    /// Position of the slot among the meal columns (0-based).
    pub fn index(self) -> usize {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::Snack1 => 1,
            MealSlot::Lunch => 2,
            MealSlot::Snack2 => 3,
            MealSlot::Dinner => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Snack1 => "snack1",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack2 => "snack2",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Human-readable (Russian) title used in chat messages and the snapshot header.
    pub fn title(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Завтрак",
            MealSlot::Snack1 => "Перекус 1",
            MealSlot::Lunch => "Обед",
            MealSlot::Snack2 => "Перекус 2",
            MealSlot::Dinner => "Ужин",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight evidence found in a message. Values are kilograms rounded to 3 places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightReading {
    /// Body weight, within [30, 200] kg.
    Absolute(f64),
    /// Signed change since the last recorded weight, |value| <= 5 kg.
    Delta(f64),
}

/// An absence excuse. `until_date == None` means "today only".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcuseInfo {
    pub until_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealReport {
    pub slot: MealSlot,
    /// false when the participant skipped (or will skip) the meal.
    pub completed: bool,
}

/// Result of classifying one message.
///
/// Meal and weight detection are independent, so a single message may carry
/// both; that case is `MealAndWeight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedReport {
    Excuse(ExcuseInfo),
    MealReport(MealReport),
    WeightReport(WeightReading),
    MealAndWeight(MealReport, WeightReading),
    NotAReport,
}

impl ClassifiedReport {
    pub fn meal(&self) -> Option<MealReport> {
        match self {
            ClassifiedReport::MealReport(m) | ClassifiedReport::MealAndWeight(m, _) => Some(*m),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<WeightReading> {
        match self {
            ClassifiedReport::WeightReport(w) | ClassifiedReport::MealAndWeight(_, w) => Some(*w),
            _ => None,
        }
    }

    pub fn is_report(&self) -> bool {
        !matches!(self, ClassifiedReport::NotAReport)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger values
// ─────────────────────────────────────────────────────────────────────────────

/// 1-based data row number in the ledger (the header row is not addressable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowHandle(pub usize);

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed ledger column layout: surname, weight, delta, one column per meal slot, sender id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerColumn {
    Surname,
    Weight,
    Delta,
    Meal(MealSlot),
    SenderId,
}

impl LedgerColumn {
    pub const COUNT: usize = 9;

    pub const ALL: [LedgerColumn; LedgerColumn::COUNT] = [
        LedgerColumn::Surname,
        LedgerColumn::Weight,
        LedgerColumn::Delta,
        LedgerColumn::Meal(MealSlot::Breakfast),
        LedgerColumn::Meal(MealSlot::Snack1),
        LedgerColumn::Meal(MealSlot::Lunch),
        LedgerColumn::Meal(MealSlot::Snack2),
        LedgerColumn::Meal(MealSlot::Dinner),
        LedgerColumn::SenderId,
    ];

    pub fn index(self) -> usize {
        match self {
            LedgerColumn::Surname => 0,
            LedgerColumn::Weight => 1,
            LedgerColumn::Delta => 2,
            LedgerColumn::Meal(slot) => 3 + slot.index(),
            LedgerColumn::SenderId => 8,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            LedgerColumn::Surname => "Фамилия",
            LedgerColumn::Weight => "Вес",
            LedgerColumn::Delta => "Разница",
            LedgerColumn::Meal(slot) => slot.title(),
            LedgerColumn::SenderId => "ID",
        }
    }
}

/// Mark written into a meal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealMark {
    Eaten,
    Skipped,
}

impl MealMark {
    pub fn from_report(report: MealReport) -> Self {
        if report.completed {
            MealMark::Eaten
        } else {
            MealMark::Skipped
        }
    }

    pub fn as_cell(self) -> &'static str {
        match self {
            MealMark::Eaten => "+",
            MealMark::Skipped => "-",
        }
    }
}

/// Background colors the bot paints onto the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    /// Excused for the day.
    Green,
    /// Late meal report.
    Red,
}

impl CellColor {
    pub fn hex(self) -> &'static str {
        match self {
            CellColor::Green => "#ccf2cc",
            CellColor::Red => "#f2cccc",
        }
    }
}

/// Snapshot of one ledger row, validated at the ledger boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub row: RowHandle,
    pub surname: String,
    pub weight: Option<f64>,
    pub delta: Option<f64>,
    /// Raw meal cells in slot order ("", "+" or "-" in practice).
    pub meals: [String; 5],
    pub sender_id: Option<i64>,
}

impl LedgerRow {
    pub fn meal(&self, slot: MealSlot) -> &str {
        &self.meals[slot.index()]
    }

    pub fn has_meal_report(&self, slot: MealSlot) -> bool {
        !self.meal(slot).trim().is_empty()
    }
}

/// Parse a numeric ledger cell. Accepts a comma decimal separator.
pub fn parse_number_cell(cell: &str) -> Option<f64> {
    let t = cell.trim().replace(',', ".");
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a kilogram value for a ledger cell.
pub fn format_kg(value: f64) -> String {
    format!("{}", value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat transport values
// ─────────────────────────────────────────────────────────────────────────────

/// Who sent a message or pressed a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    /// Tag used to mention the sender in reminders: `@username`, else an HTML user link.
    pub fn mention_tag(&self) -> String {
        match &self.username {
            Some(u) if !u.is_empty() => format!("@{}", u),
            _ => user_link(self.id, &self.first_name),
        }
    }
}

/// HTML link that mentions a user without a username.
pub fn user_link(user_id: i64, label: &str) -> String {
    let label = if label.trim().is_empty() {
        "участник"
    } else {
        label
    };
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user_id,
        escape_html(label)
    )
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A text (or captioned media) message received from the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender: Sender,
    /// Message text, or the caption when the message is a photo.
    pub text: String,
    /// Unix timestamp (seconds).
    pub date: i64,
    pub has_photo: bool,
}

/// Inline keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub chat_id: Option<i64>,
    pub sender: Sender,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingUpdate {
    Message(ChatMessage),
    Callback(CallbackQuery),
}

/// Incoming update with the Bot API offset it was delivered under.
///
/// `update` is `None` for kinds the bot does not handle; the id still has to
/// be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEnvelope {
    pub update_id: i64,
    pub update: Option<IncomingUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; each inner vec is one row of button labels.
    Reply(Vec<Vec<String>>),
    Inline(Vec<Vec<InlineButton>>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout_follows_slot_order() {
        for (i, col) in LedgerColumn::ALL.iter().enumerate() {
            assert_eq!(col.index(), i);
        }
        assert_eq!(LedgerColumn::Meal(MealSlot::Lunch).index(), 5);
    }

    #[test]
    fn test_parse_number_cell() {
        assert_eq!(parse_number_cell("49,5"), Some(49.5));
        assert_eq!(parse_number_cell(" 80 "), Some(80.0));
        assert_eq!(parse_number_cell(""), None);
        assert_eq!(parse_number_cell("abc"), None);
        assert_eq!(parse_number_cell("NaN"), None);
    }

    #[test]
    fn test_mention_tag() {
        let with_username = Sender {
            id: 1,
            username: Some("sunko".into()),
            first_name: "Anna".into(),
        };
        assert_eq!(with_username.mention_tag(), "@sunko");

        let without = Sender {
            id: 42,
            username: None,
            first_name: "<Anna>".into(),
        };
        assert_eq!(
            without.mention_tag(),
            "<a href=\"tg://user?id=42\">&lt;Anna&gt;</a>"
        );
    }

    #[test]
    fn test_classified_report_accessors() {
        let meal = MealReport {
            slot: MealSlot::Dinner,
            completed: false,
        };
        let both = ClassifiedReport::MealAndWeight(meal, WeightReading::Delta(-0.3));
        assert_eq!(both.meal(), Some(meal));
        assert_eq!(both.weight(), Some(WeightReading::Delta(-0.3)));
        assert!(!ClassifiedReport::NotAReport.is_report());
    }
}
