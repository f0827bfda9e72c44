//! Telegram Bot API transport.

pub mod client;
pub mod mapper;

pub use client::BotApiGateway;
