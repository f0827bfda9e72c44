//! Word lists the classifier matches against. All entries are lower-case.
//!
//! Substring matching is used throughout, so stems ("пропущ", "январ")
//! cover grammatical endings.

/// Phrases declaring that the participant will not report today.
pub const EXCUSE_PHRASES: &[&str] = &[
    "без отчетов",
    "без отчётов",
    "без фото",
    "фото не будет",
    "уехал",
    "уехала",
    "заболел",
    "заболела",
    "болею",
];

/// Phrases marking a meal report as skipped. "без " keeps its trailing space
/// so that it only matches as a standalone preposition.
pub const SKIP_PHRASES: &[&str] = &["не будет", "без ", "пропуск", "пропущ", "пропускаю"];

pub const BREAKFAST: &str = "завтрак";
pub const LUNCH: &str = "обед";
pub const DINNER: &str = "ужин";
pub const SNACK: &str = "перекус";

/// Explicit meal keywords in precedence order.
pub const EXPLICIT_MEALS: &[&str] = &[BREAKFAST, LUNCH, DINNER];

/// Every meal keyword, used to keep meal messages out of absolute-weight parsing.
pub const MEAL_WORDS: &[&str] = &[BREAKFAST, LUNCH, DINNER, SNACK];

pub const SECOND_ORDINAL: &str = "втор";
pub const FIRST_ORDINAL: &str = "перв";

/// Month-name stems in calendar order. Order matters: "март" must be tried
/// before "ма" (май, мая).
pub const MONTH_PREFIXES: &[(&str, u32)] = &[
    ("январ", 1),
    ("феврал", 2),
    ("март", 3),
    ("апрел", 4),
    ("ма", 5),
    ("июн", 6),
    ("июл", 7),
    ("август", 8),
    ("сентябр", 9),
    ("октябр", 10),
    ("ноябр", 11),
    ("декабр", 12),
];

/// Words that can open a report but are never a surname or given name.
pub const NOT_A_NAME: &[&str] = &[
    "вес", "первый", "второй", "минус", "плюс", "без", "не", "сегодня", "завтра", "фото",
    "пропуск", "пропускаю", "болею",
];

/// Prefix that marks a bot command; such messages are never reports.
pub const COMMAND_PREFIX: char = '/';

pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

pub fn month_from_word(word: &str) -> Option<u32> {
    MONTH_PREFIXES
        .iter()
        .find(|(prefix, _)| word.starts_with(prefix))
        .map(|(_, month)| *month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_from_word_handles_case_endings() {
        assert_eq!(month_from_word("января"), Some(1));
        assert_eq!(month_from_word("марта"), Some(3));
        assert_eq!(month_from_word("мая"), Some(5));
        assert_eq!(month_from_word("августа"), Some(8));
        assert_eq!(month_from_word("числа"), None);
    }
}
