//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod classifier;
pub mod entities;
pub mod errors;

pub use entities::{
    CallbackQuery, CellColor, ChatMessage, ClassifiedReport, ExcuseInfo, IncomingUpdate,
    InlineButton, Keyboard, LedgerColumn, LedgerRow, MealMark, MealReport, MealSlot, RawMessage,
    RowHandle, Sender, UpdateEnvelope, WeightReading, escape_html, format_kg, parse_number_cell,
    user_link,
};
pub use errors::DomainError;
