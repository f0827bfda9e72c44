//! Cross-cutting helpers: configuration, retry policy, bot texts.

pub mod config;
pub mod retry;
pub mod texts;
