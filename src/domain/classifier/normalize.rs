//! Text normalization shared by every detector.

use std::fmt;

/// Lower-cased, trimmed text with whitespace runs collapsed to single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Copy with comma decimal separators turned into dots, for number parsing.
    pub fn with_dot_decimals(&self) -> String {
        self.0.replace(',', ".")
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(text: &str) -> NormalizedText {
    let lower = text.to_lowercase();
    NormalizedText(lower.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a   b ").as_str(), "a b");
        assert_eq!(normalize("Сунко\t\nЗАВТРАК").as_str(), "сунко завтрак");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \n\t ").is_empty());
    }

    #[test]
    fn test_idempotent() {
        for s in ["  Обед   НЕ будет ", "Иванова -0,3", "", "ПЕРЕКУС\u{a0}2"] {
            let once = normalize(s);
            assert_eq!(normalize(once.as_str()), once);
        }
    }

    #[test]
    fn test_dot_decimals() {
        assert_eq!(normalize("Вес 49,5").with_dot_decimals(), "вес 49.5");
    }
}
