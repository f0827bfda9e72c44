//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the polling loop into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::UpdateHandler;
pub use outbound::{ChatGateway, Clock, Ledger, StateStore};
