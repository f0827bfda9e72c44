//! File-backed ledger and state storage.

pub mod csv_ledger;
pub mod state_json;

pub use csv_ledger::CsvLedger;
pub use state_json::StateJson;
