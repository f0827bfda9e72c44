//! Report classification. Turns free chat text into a `ClassifiedReport`.
//!
//! Pure functions only: no I/O, no shared state, safe to call from any task.
//! Precedence: excuse first (short-circuits), then meal and weight detection
//! run independently. Lateness is evaluated by the caller, which owns the
//! message timestamp.

pub mod excuse;
pub mod lateness;
pub mod lexicon;
pub mod meal;
pub mod name;
pub mod normalize;
pub mod weight;

pub use excuse::{detect_excuse, parse_until_date};
pub use lateness::late_warning;
pub use meal::{detect_meal, is_skip};
pub use name::{NameHint, name_hint};
pub use normalize::{NormalizedText, normalize};
pub use weight::{parse_absolute_weight, parse_weight_delta};

use crate::domain::{ClassifiedReport, MealReport, RawMessage, WeightReading};
use chrono::NaiveDate;

pub fn classify(message: &RawMessage) -> ClassifiedReport {
    classify_text(&message.text, Some(message.hour()), message.date())
}

/// Classifies `text`. `hour` disambiguates unnumbered snacks; `today` fills
/// in partial excuse dates.
pub fn classify_text(text: &str, hour: Option<u32>, today: NaiveDate) -> ClassifiedReport {
    let trimmed = text.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(lexicon::COMMAND_PREFIX) {
        return ClassifiedReport::NotAReport;
    }

    let t = normalize(text);

    if let Some(info) = detect_excuse(&t, today) {
        return ClassifiedReport::Excuse(info);
    }

    let meal = detect_meal(&t, hour).map(|slot| MealReport {
        slot,
        completed: !is_skip(&t),
    });

    let absolute = parse_absolute_weight(&t).map(WeightReading::Absolute);
    let delta = parse_weight_delta(&t).map(WeightReading::Delta);
    let weight = absolute.or(delta);

    match (meal, weight) {
        (Some(m), Some(w)) => ClassifiedReport::MealAndWeight(m, w),
        (Some(m), None) => ClassifiedReport::MealReport(m),
        (None, Some(w)) => ClassifiedReport::WeightReport(w),
        (None, None) => ClassifiedReport::NotAReport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExcuseInfo, MealSlot};
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        today().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn classify_at(text: &str, hour: u32) -> ClassifiedReport {
        classify(&RawMessage::new(text, 7, at(hour, 0)))
    }

    #[test]
    fn test_not_a_report() {
        for text in ["", "   ", "Всем привет!", "/start", "  /export", "спасибо за меню"] {
            assert_eq!(classify_at(text, 10), ClassifiedReport::NotAReport, "{text}");
        }
    }

    #[test]
    fn test_excuse_takes_precedence() {
        assert_eq!(
            classify_at("Уехала, без отчётов, обед тоже", 10),
            ClassifiedReport::Excuse(ExcuseInfo { until_date: None })
        );
        assert_eq!(
            classify_at("заболела до 14.01, завтрак -300", 10),
            ClassifiedReport::Excuse(ExcuseInfo {
                until_date: NaiveDate::from_ymd_opt(2026, 1, 14)
            })
        );
    }

    #[test]
    fn test_meal_reports() {
        assert_eq!(
            classify_at("Сунко завтрак и обед", 9),
            ClassifiedReport::MealReport(MealReport {
                slot: MealSlot::Breakfast,
                completed: true
            })
        );
        assert_eq!(
            classify_at("Сунко ужин, пропускаю", 19),
            ClassifiedReport::MealReport(MealReport {
                slot: MealSlot::Dinner,
                completed: false
            })
        );
        assert_eq!(
            classify_at("Сунко перекус", 15),
            ClassifiedReport::MealReport(MealReport {
                slot: MealSlot::Snack2,
                completed: true
            })
        );
    }

    #[test]
    fn test_weight_reports() {
        assert_eq!(
            classify_at("Сунко 49,7", 8),
            ClassifiedReport::WeightReport(WeightReading::Absolute(49.7))
        );
        assert_eq!(
            classify_at("Сунко минус 300", 8),
            ClassifiedReport::WeightReport(WeightReading::Delta(-0.3))
        );
        assert_eq!(classify_at("Сунко 250", 8), ClassifiedReport::NotAReport);
        assert_eq!(
            classify_at("Римская-Корсакова 80", 8),
            ClassifiedReport::WeightReport(WeightReading::Absolute(80.0))
        );
        assert_eq!(
            classify_at("Григорьева -0.3", 8),
            ClassifiedReport::WeightReport(WeightReading::Delta(-0.3))
        );
    }

    #[test]
    fn test_meal_and_weight_together() {
        let report = classify_at("Сунко -0.4, обед не будет", 12);
        assert_eq!(
            report,
            ClassifiedReport::MealAndWeight(
                MealReport {
                    slot: MealSlot::Lunch,
                    completed: false
                },
                WeightReading::Delta(-0.4)
            )
        );
    }

    #[test]
    fn test_repeatable() {
        let msg = RawMessage::new("Сунко перекус 2 +0.2", 7, at(15, 30));
        assert_eq!(classify(&msg), classify(&msg));
    }

    #[test]
    fn test_classify_text_without_hour() {
        assert_eq!(
            classify_text("перекус", None, today()),
            ClassifiedReport::MealReport(MealReport {
                slot: MealSlot::Snack1,
                completed: true
            })
        );
    }
}
