//! Static menu pictures shipped next to the bot.

pub mod menu_catalog;

pub use menu_catalog::{MenuAsset, MenuCatalog};
