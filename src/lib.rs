//! nutrition-bot: Telegram group bot for a nutrition marathon, hexagonal architecture.
//!
//! Parses free-text meal, weight and excuse reports into a shared ledger,
//! reminds missing reporters and posts a daily summary.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
