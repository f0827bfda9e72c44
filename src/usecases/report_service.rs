//! Report workflow: classify a chat message, find the sender's ledger row
//! (linking it on first contact) and write the report into it.
//!
//! Updates for one sender are serialized with a per-sender lock, so two quick
//! messages cannot interleave their read-modify-write on the weight cells.
//! Linking a new sender to a row runs under one service-wide lock, so two
//! senders never claim the same unlinked row.

use crate::domain::classifier::{self, late_warning, name_hint, weight};
use crate::domain::{
    CellColor, ChatMessage, ClassifiedReport, DomainError, ExcuseInfo, LedgerColumn, MealMark,
    MealReport, MealSlot, RawMessage, RowHandle, WeightReading, format_kg, parse_number_cell,
};
use crate::ports::{Clock, Ledger, StateStore};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What happened to a weight reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightUpdate {
    /// Weight written; `delta` is `None` when the delta cell was cleared.
    Written { weight: f64, delta: Option<f64> },
    /// A delta arrived but there is no previous weight to apply it to.
    NoPreviousWeight,
    /// Applying the delta would leave the plausible body-weight range.
    Implausible { weight: f64 },
}

/// Changes applied for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedReport {
    pub row: RowHandle,
    pub excuse: Option<ExcuseInfo>,
    pub weight: Option<WeightUpdate>,
    pub meal: Option<(MealSlot, MealMark)>,
    /// Reply for a meal reported after its cutoff.
    pub late_warning: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Not a report; nothing touched.
    Ignored,
    /// A report from a sender with no ledger row that could not be linked.
    Unlinked,
    Applied(AppliedReport),
}

pub struct ReportService {
    ledger: Arc<dyn Ledger>,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    auto_register: bool,
    sender_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
    link_lock: Mutex<()>,
}

impl ReportService {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        auto_register: bool,
    ) -> Self {
        Self {
            ledger,
            state,
            clock,
            auto_register,
            sender_locks: Mutex::new(HashMap::new()),
            link_lock: Mutex::new(()),
        }
    }

    /// Lock for one sender. Entries nobody holds or waits on are pruned.
    async fn lock_for(&self, sender_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.sender_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(sender_id).or_default())
    }

    /// Handle one chat message end to end.
    pub async fn handle_message(&self, msg: &ChatMessage) -> Result<ReportOutcome, DomainError> {
        let raw = RawMessage::new(msg.text.clone(), msg.sender.id, self.clock.now());
        let report = classifier::classify(&raw);
        if !report.is_report() {
            return Ok(ReportOutcome::Ignored);
        }
        debug!(sender_id = msg.sender.id, report = ?report, "report classified");

        let lock = self.lock_for(msg.sender.id).await;
        let _guard = lock.lock().await;

        let row = match self.resolve_row(msg).await? {
            Some(row) => row,
            None => {
                info!(sender_id = msg.sender.id, "report from unlinked sender");
                return Ok(ReportOutcome::Unlinked);
            }
        };

        self.state
            .record_mention(msg.sender.id, &msg.sender.mention_tag())
            .await?;

        let applied = self.apply(row, &raw, report).await?;
        info!(
            sender_id = msg.sender.id,
            row = row.0,
            excused = applied.excuse.is_some(),
            weight = ?applied.weight,
            meal = ?applied.meal,
            late = applied.late_warning.is_some(),
            "report applied"
        );
        Ok(ReportOutcome::Applied(applied))
    }

    /// Row by sender id; otherwise try to link by the leading surname.
    async fn resolve_row(&self, msg: &ChatMessage) -> Result<Option<RowHandle>, DomainError> {
        if let Some(row) = self.ledger.find_row_for_user(msg.sender.id).await? {
            return Ok(Some(row));
        }
        let Some(hint) = name_hint(&msg.text) else {
            return Ok(None);
        };

        let _link = self.link_lock.lock().await;
        let by_surname = self.ledger.find_rows_by_surname(&hint.surname).await?;
        let rows = self.ledger.list_rows().await?;
        let candidates: Vec<RowHandle> = rows
            .iter()
            .filter(|r| by_surname.contains(&r.row) && r.sender_id.is_none())
            .filter(|r| match (&hint.name, r.surname.split_whitespace().nth(1)) {
                (Some(name), Some(cell_name)) => cell_name.to_lowercase() == *name,
                _ => true,
            })
            .map(|r| r.row)
            .collect();

        match candidates.as_slice() {
            [row] => {
                self.ledger
                    .write_cell(*row, LedgerColumn::SenderId, &msg.sender.id.to_string())
                    .await?;
                info!(sender_id = msg.sender.id, row = row.0, surname = %hint.surname, "sender linked to ledger row");
                Ok(Some(*row))
            }
            [] if by_surname.is_empty() && self.auto_register => {
                let label = leading_words(&msg.text, if hint.name.is_some() { 2 } else { 1 });
                let row = self.ledger.append_row(&label, msg.sender.id).await?;
                info!(sender_id = msg.sender.id, row = row.0, "new participant registered");
                Ok(Some(row))
            }
            [] => Ok(None),
            many => {
                warn!(
                    sender_id = msg.sender.id,
                    surname = %hint.surname,
                    matches = many.len(),
                    "ambiguous surname, not linking"
                );
                Ok(None)
            }
        }
    }

    async fn apply(
        &self,
        row: RowHandle,
        raw: &RawMessage,
        report: ClassifiedReport,
    ) -> Result<AppliedReport, DomainError> {
        let mut applied = AppliedReport {
            row,
            excuse: None,
            weight: None,
            meal: None,
            late_warning: None,
        };

        if let ClassifiedReport::Excuse(info) = report {
            self.apply_excuse(row, raw.sender_id, raw.date(), info).await?;
            applied.excuse = Some(info);
            return Ok(applied);
        }
        if let Some(reading) = report.weight() {
            applied.weight = Some(self.apply_weight(row, reading).await?);
        }
        if let Some(meal) = report.meal() {
            let (mark, warning) = self.apply_meal(row, raw, meal).await?;
            applied.meal = Some((meal.slot, mark));
            applied.late_warning = warning;
        }
        Ok(applied)
    }

    async fn apply_excuse(
        &self,
        row: RowHandle,
        sender_id: i64,
        today: NaiveDate,
        info: ExcuseInfo,
    ) -> Result<(), DomainError> {
        match info.until_date {
            Some(until) => self.state.set_excused_until(sender_id, until).await?,
            None => self.state.mark_excused(sender_id, today).await?,
        }
        self.ledger.paint_row(row, CellColor::Green).await
    }

    async fn apply_weight(
        &self,
        row: RowHandle,
        reading: WeightReading,
    ) -> Result<WeightUpdate, DomainError> {
        let previous =
            parse_number_cell(&self.ledger.read_cell(row, LedgerColumn::Weight).await?);

        let (new_weight, delta) = match reading {
            WeightReading::Absolute(w) => {
                let delta = previous
                    .map(|p| weight::round3(w - p))
                    .filter(|d| d.abs() <= weight::MAX_DELTA_KG);
                (w, delta)
            }
            WeightReading::Delta(d) => {
                let Some(prev) = previous else {
                    return Ok(WeightUpdate::NoPreviousWeight);
                };
                let w = weight::round3(prev + d);
                if !weight::is_plausible_weight(w) {
                    return Ok(WeightUpdate::Implausible { weight: w });
                }
                (w, Some(d))
            }
        };

        self.ledger
            .write_cell(row, LedgerColumn::Weight, &format_kg(new_weight))
            .await?;
        let delta_cell = delta.map(format_kg).unwrap_or_default();
        self.ledger
            .write_cell(row, LedgerColumn::Delta, &delta_cell)
            .await?;
        Ok(WeightUpdate::Written {
            weight: new_weight,
            delta,
        })
    }

    async fn apply_meal(
        &self,
        row: RowHandle,
        raw: &RawMessage,
        meal: MealReport,
    ) -> Result<(MealMark, Option<&'static str>), DomainError> {
        let mark = MealMark::from_report(meal);
        let column = LedgerColumn::Meal(meal.slot);
        self.ledger.write_cell(row, column, mark.as_cell()).await?;

        let warning = if meal.completed {
            late_warning(meal.slot, raw.hour(), raw.minute())
        } else {
            None
        };
        if warning.is_some() {
            self.ledger.paint_cell(row, column, CellColor::Red).await?;
        }
        Ok((mark, warning))
    }
}

/// First `n` words of `text` as written, for a new ledger row's name cell.
fn leading_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}
