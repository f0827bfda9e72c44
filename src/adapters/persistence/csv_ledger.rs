//! Implements Ledger with a CSV file (cell values) plus a JSON sidecar (colors).
//!
//! The CSV keeps the fixed column layout of `LedgerColumn` under a header row,
//! so it can be opened and edited in any spreadsheet tool while the bot is
//! stopped. Both files are rewritten atomically on every change; a busy file
//! (e.g. locked by a spreadsheet app) is retried with backoff. A change whose
//! save still fails is rolled back in memory.

use crate::adapters::export::{SnapshotCell, SnapshotRow, render_table};
use crate::domain::{
    CellColor, DomainError, LedgerColumn, LedgerRow, RowHandle, parse_number_cell,
};
use crate::ports::Ledger;
use crate::shared::retry::{RetryPolicy, retry_with_backoff};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

type Cells = [String; LedgerColumn::COUNT];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct PaintedCell {
    row: usize,
    column: usize,
    color: CellColor,
}

/// Colors, keyed by 1-based row number.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Paint {
    #[serde(default)]
    rows: Vec<(usize, CellColor)>,
    #[serde(default)]
    cells: Vec<PaintedCell>,
}

impl Paint {
    fn row_color(&self, row: usize) -> Option<CellColor> {
        self.rows.iter().find(|(r, _)| *r == row).map(|(_, c)| *c)
    }

    fn cell_color(&self, row: usize, column: usize) -> Option<CellColor> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
            .map(|c| c.color)
    }

    fn set_row(&mut self, row: usize, color: CellColor) {
        self.rows.retain(|(r, _)| *r != row);
        self.rows.push((row, color));
    }

    fn set_cell(&mut self, row: usize, column: usize, color: CellColor) {
        self.cells.retain(|c| !(c.row == row && c.column == column));
        self.cells.push(PaintedCell { row, column, color });
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Cells>,
    paint: Paint,
}

impl Table {
    fn cells(&self, row: RowHandle) -> Result<&Cells, DomainError> {
        row.0
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .ok_or_else(|| DomainError::Ledger(format!("row {} does not exist", row)))
    }

    fn cells_mut(&mut self, row: RowHandle) -> Result<&mut Cells, DomainError> {
        row.0
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
            .ok_or_else(|| DomainError::Ledger(format!("row {} does not exist", row)))
    }

    fn snapshot(&self, index: usize) -> LedgerRow {
        let cells = &self.rows[index];
        let row = RowHandle(index + 1);
        let sender_cell = cells[LedgerColumn::SenderId.index()].trim();
        let sender_id = if sender_cell.is_empty() {
            None
        } else {
            match sender_cell.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(row = row.0, value = sender_cell, "ledger sender id is not an integer");
                    None
                }
            }
        };
        LedgerRow {
            row,
            surname: cells[LedgerColumn::Surname.index()].trim().to_string(),
            weight: parse_number_cell(&cells[LedgerColumn::Weight.index()]),
            delta: parse_number_cell(&cells[LedgerColumn::Delta.index()]),
            meals: std::array::from_fn(|i| cells[3 + i].trim().to_string()),
            sender_id,
        }
    }
}

fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// CSV-file ledger. One data row per participant.
pub struct CsvLedger {
    path: PathBuf,
    paint_path: PathBuf,
    export_dir: PathBuf,
    table: RwLock<Table>,
    retry: RetryPolicy,
}

impl CsvLedger {
    /// Ledger stored at `<data_dir>/ledger.csv`, colors in `ledger.paint.json`,
    /// snapshots under `<data_dir>/out`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            path: data_dir.join("ledger.csv"),
            paint_path: data_dir.join("ledger.paint.json"),
            export_dir: data_dir.join("out"),
            table: RwLock::new(Table::default()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Load both files. A missing CSV starts an empty ledger and writes the header.
    pub async fn load(&self) -> Result<(), DomainError> {
        let rows = match fs::read(&self.path).await {
            Ok(bytes) => parse_csv(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DomainError::Ledger(format!("read ledger: {}", e))),
        };
        let paint = match fs::read_to_string(&self.paint_path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %self.paint_path.display(), error = %e, "paint file unreadable, ignoring");
                Paint::default()
            }),
            Err(_) => Paint::default(),
        };
        info!(path = %self.path.display(), rows = rows.len(), "ledger loaded");
        let mut table = self.table.write().await;
        *table = Table { rows, paint };
        self.save_cells(&table).await
    }

    async fn save_cells(&self, table: &Table) -> Result<(), DomainError> {
        let bytes = render_csv(&table.rows)?;
        retry_with_backoff(&self.retry, "ledger save", || {
            write_atomic(&self.path, bytes.as_slice())
        })
        .await
    }

    async fn save_paint(&self, table: &Table) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(&table.paint)
            .map_err(|e| DomainError::Ledger(e.to_string()))?;
        retry_with_backoff(&self.retry, "ledger paint save", || {
            write_atomic(&self.paint_path, json.as_bytes())
        })
        .await
    }

    /// Save the paint, restoring `previous` if the save gives up.
    async fn save_paint_or_restore(
        &self,
        table: &mut Table,
        previous: Paint,
    ) -> Result<(), DomainError> {
        let result = self.save_paint(table).await;
        if result.is_err() {
            table.paint = previous;
        }
        result
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Cells>, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DomainError::Ledger(format!("parse ledger: {}", e)))?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let cells: Cells = std::array::from_fn(|i| record.get(i).unwrap_or("").to_string());
        rows.push(cells);
    }
    Ok(rows)
}

fn render_csv(rows: &[Cells]) -> Result<Vec<u8>, DomainError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(LedgerColumn::ALL.iter().map(|c| c.header()))
        .map_err(|e| DomainError::Ledger(e.to_string()))?;
    for row in rows {
        wtr.write_record(row.iter())
            .map_err(|e| DomainError::Ledger(e.to_string()))?;
    }
    wtr.into_inner()
        .map_err(|e| DomainError::Ledger(e.to_string()))
}

/// Write to a temp file, fsync, rename over `path`. IO failures are reported
/// as `Unavailable` so the caller's retry kicks in.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Unavailable(format!("create dir: {}", e)))?;
    }
    let temp_path = path.with_extension("tmp");
    let mut f = fs::File::create(&temp_path)
        .await
        .map_err(|e| DomainError::Unavailable(format!("create temp file: {}", e)))?;
    f.write_all(bytes)
        .await
        .map_err(|e| DomainError::Unavailable(format!("write temp file: {}", e)))?;
    f.sync_all()
        .await
        .map_err(|e| DomainError::Unavailable(format!("sync temp file: {}", e)))?;
    drop(f);
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| DomainError::Unavailable(format!("atomic rename failed: {}", e)))
}

#[async_trait::async_trait]
impl Ledger for CsvLedger {
    async fn find_row_for_user(&self, sender_id: i64) -> Result<Option<RowHandle>, DomainError> {
        let id = sender_id.to_string();
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .position(|cells| cells[LedgerColumn::SenderId.index()].trim() == id)
            .map(|i| RowHandle(i + 1)))
    }

    async fn find_rows_by_surname(&self, surname: &str) -> Result<Vec<RowHandle>, DomainError> {
        let wanted = normalize_name(surname);
        if wanted.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| {
                let cell = normalize_name(&cells[LedgerColumn::Surname.index()]);
                cell == wanted || cell.split(' ').next() == Some(wanted.as_str())
            })
            .map(|(i, _)| RowHandle(i + 1))
            .collect())
    }

    async fn append_row(&self, surname: &str, sender_id: i64) -> Result<RowHandle, DomainError> {
        let mut table = self.table.write().await;
        let mut cells: Cells = Default::default();
        cells[LedgerColumn::Surname.index()] = surname.trim().to_string();
        cells[LedgerColumn::SenderId.index()] = sender_id.to_string();
        table.rows.push(cells);
        let handle = RowHandle(table.rows.len());
        if let Err(e) = self.save_cells(&table).await {
            table.rows.pop();
            return Err(e);
        }
        info!(row = handle.0, sender_id, "ledger row appended");
        Ok(handle)
    }

    async fn read_cell(&self, row: RowHandle, column: LedgerColumn) -> Result<String, DomainError> {
        let table = self.table.read().await;
        Ok(table.cells(row)?[column.index()].clone())
    }

    async fn write_cell(
        &self,
        row: RowHandle,
        column: LedgerColumn,
        value: &str,
    ) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        let previous = std::mem::replace(
            &mut table.cells_mut(row)?[column.index()],
            value.to_string(),
        );
        if let Err(e) = self.save_cells(&table).await {
            table.cells_mut(row)?[column.index()] = previous;
            return Err(e);
        }
        debug!(row = row.0, column = ?column, value, "ledger cell written");
        Ok(())
    }

    async fn paint_row(&self, row: RowHandle, color: CellColor) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        table.cells(row)?;
        let previous = table.paint.clone();
        table.paint.set_row(row.0, color);
        self.save_paint_or_restore(&mut table, previous).await
    }

    async fn paint_cell(
        &self,
        row: RowHandle,
        column: LedgerColumn,
        color: CellColor,
    ) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        table.cells(row)?;
        let previous = table.paint.clone();
        table.paint.set_cell(row.0, column.index(), color);
        self.save_paint_or_restore(&mut table, previous).await
    }

    async fn clear_paint(&self) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        let previous = std::mem::take(&mut table.paint);
        self.save_paint_or_restore(&mut table, previous).await
    }

    async fn list_rows(&self) -> Result<Vec<LedgerRow>, DomainError> {
        let table = self.table.read().await;
        Ok((0..table.rows.len()).map(|i| table.snapshot(i)).collect())
    }

    async fn export_visual_snapshot(&self) -> Result<PathBuf, DomainError> {
        // Sender ids stay out of the picture posted to the group.
        let columns: Vec<LedgerColumn> = LedgerColumn::ALL
            .into_iter()
            .filter(|c| *c != LedgerColumn::SenderId)
            .collect();
        let header: Vec<&str> = columns.iter().map(|c| c.header()).collect();

        let rows: Vec<SnapshotRow> = {
            let table = self.table.read().await;
            table
                .rows
                .iter()
                .enumerate()
                .map(|(i, cells)| SnapshotRow {
                    fill: table.paint.row_color(i + 1),
                    cells: columns
                        .iter()
                        .map(|c| SnapshotCell {
                            text: cells[c.index()].trim().to_string(),
                            fill: table.paint.cell_color(i + 1, c.index()),
                        })
                        .collect(),
                })
                .collect()
        };

        let svg = render_table("Отчёты за день", &header, &rows);
        let path = self.export_dir.join(format!(
            "summary_{}.svg",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        retry_with_backoff(&self.retry, "snapshot write", || {
            write_atomic(&path, svg.as_bytes())
        })
        .await
        .map_err(|e| DomainError::Export(e.to_string()))?;

        info!(path = %path.display(), rows = rows.len(), "ledger snapshot exported");
        Ok(path)
    }
}
