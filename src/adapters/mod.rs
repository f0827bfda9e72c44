//! Infrastructure adapters. Implement outbound ports.
//!
//! Bot API over HTTP, CSV ledger, JSON state, menu assets, console banner.
//! Infrastructure failures are mapped to DomainError.

pub mod assets;
pub mod clock;
pub mod export;
pub mod persistence;
pub mod telegram;
pub mod ui;
