//! Menu catalog: callback key -> picture files under the assets directory.

use crate::domain::{InlineButton, Keyboard};
use std::path::{Path, PathBuf};

/// Callback data prefix of menu buttons.
pub const CALLBACK_PREFIX: &str = "menu:";

/// Numbered day menus.
const NUMBERED: [(&str, &str); 7] = [
    ("1", "menu_1.jpg"),
    ("2", "menu_2.jpg"),
    ("3", "menu_3.jpg"),
    ("4", "menu_4.jpg"),
    ("5", "menu_5.jpg"),
    ("6", "menu_6.jpg"),
    ("7", "menu_7.jpg"),
];

/// Named dishes: (key, button label, file).
const DISHES: [(&str, &str, &str); 6] = [
    ("сырники", "🥞 сырники", "сырники.jpg"),
    ("лаваш", "🫓 лаваш", "Лаваш.jpg"),
    ("печенье", "🍪 печенье", "Печенье.jpg"),
    ("виноград", "🍇 виноград", "vinograd.jpeg"),
    ("банан", "🍌 банан", "banana.jpeg"),
    ("свекла", "🥬 свекла", "svekla.jpeg"),
];

/// One file of a menu. `path` is `None` when the file is missing on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAsset {
    pub file_name: &'static str,
    pub path: Option<PathBuf>,
}

pub struct MenuCatalog {
    assets_dir: PathBuf,
}

impl MenuCatalog {
    pub fn new(assets_dir: impl AsRef<Path>) -> Self {
        Self {
            assets_dir: assets_dir.as_ref().to_path_buf(),
        }
    }

    fn files_for(key: &str) -> Option<&'static str> {
        NUMBERED
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, f)| *f)
            .or_else(|| DISHES.iter().find(|(k, _, _)| *k == key).map(|(_, _, f)| *f))
    }

    /// Files of the menu `key`, or `None` for an unknown key.
    pub fn lookup(&self, key: &str) -> Option<Vec<MenuAsset>> {
        let file_name = Self::files_for(key.trim())?;
        let path = self.assets_dir.join(file_name);
        Some(vec![MenuAsset {
            file_name,
            path: path.is_file().then_some(path),
        }])
    }

    /// Inline picker: numbered menus on the first row, dishes on the second.
    pub fn keyboard(&self) -> Keyboard {
        let numbered = NUMBERED
            .iter()
            .map(|(k, _)| InlineButton {
                text: k.to_string(),
                callback_data: format!("{}{}", CALLBACK_PREFIX, k),
            })
            .collect();
        let dishes = DISHES
            .iter()
            .map(|(k, label, _)| InlineButton {
                text: label.to_string(),
                callback_data: format!("{}{}", CALLBACK_PREFIX, k),
            })
            .collect();
        Keyboard::Inline(vec![numbered, dishes])
    }
}
