//! Meal slot detection and skip detection.

use super::lexicon::{self, EXPLICIT_MEALS, SKIP_PHRASES};
use super::normalize::NormalizedText;
use crate::domain::MealSlot;

/// Local hour from which an unnumbered snack counts as the second one.
const SECOND_SNACK_FROM_HOUR: u32 = 13;

/// Detects the meal slot a message refers to.
///
/// Explicit meal words win in the order breakfast, lunch, dinner. A generic
/// snack is disambiguated by "1"/"2" or ordinal words, then by `hour`; with
/// no hour it defaults to the first snack.
pub fn detect_meal(text: &NormalizedText, hour: Option<u32>) -> Option<MealSlot> {
    let t = text.as_str();

    for keyword in EXPLICIT_MEALS {
        if t.contains(keyword) {
            return Some(explicit_slot(keyword));
        }
    }

    if !t.contains(lexicon::SNACK) {
        return None;
    }
    if t.contains('2') || t.contains(lexicon::SECOND_ORDINAL) {
        return Some(MealSlot::Snack2);
    }
    if t.contains('1') || t.contains(lexicon::FIRST_ORDINAL) {
        return Some(MealSlot::Snack1);
    }
    match hour {
        Some(h) if h >= SECOND_SNACK_FROM_HOUR => Some(MealSlot::Snack2),
        _ => Some(MealSlot::Snack1),
    }
}

fn explicit_slot(keyword: &str) -> MealSlot {
    match keyword {
        lexicon::BREAKFAST => MealSlot::Breakfast,
        lexicon::LUNCH => MealSlot::Lunch,
        _ => MealSlot::Dinner,
    }
}

/// True when the message says the meal was (or will be) skipped.
pub fn is_skip(text: &NormalizedText) -> bool {
    lexicon::contains_any(text.as_str(), SKIP_PHRASES)
}
