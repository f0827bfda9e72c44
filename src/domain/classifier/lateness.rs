//! Per-slot reporting cutoffs.

use crate::domain::MealSlot;

/// Cutoff as minutes since local midnight; `None` for slots without one.
pub fn cutoff_minutes(slot: MealSlot) -> Option<u32> {
    match slot {
        MealSlot::Snack1 => Some(11 * 60),
        MealSlot::Lunch => Some(14 * 60),
        MealSlot::Snack2 => Some(16 * 60),
        MealSlot::Breakfast | MealSlot::Dinner => None,
    }
}

/// Warning for a completed meal reported after its cutoff. Never call this
/// for skipped meals.
pub fn late_warning(slot: MealSlot, hour: u32, minute: u32) -> Option<&'static str> {
    let cutoff = cutoff_minutes(slot)?;
    if hour * 60 + minute <= cutoff {
        return None;
    }
    Some(match slot {
        MealSlot::Snack1 => "⚠️ Первый перекус — до 11:00.",
        MealSlot::Lunch => "⚠️ Обед — до 14:00.",
        _ => "⚠️ Второй перекус — до 16:00.",
    })
}
