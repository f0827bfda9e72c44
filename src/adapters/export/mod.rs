//! Visual export of the ledger.

pub mod svg_snapshot;

pub use svg_snapshot::{SnapshotCell, SnapshotRow, render_table};
