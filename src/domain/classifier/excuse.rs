//! Absence excuses and their optional "до <дата>" validity date.

use super::lexicon::{self, EXCUSE_PHRASES};
use super::normalize::NormalizedText;
use crate::domain::ExcuseInfo;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

// "до 14.01", "до 14-01-26", "до 14/01/2026"
static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bдо\s+(\d{1,2})[./-](\d{1,2})(?:[./-](\d{2,4}))?").unwrap()
});

// "до 14 января"
static WORD_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bдо\s+(\d{1,2})\s+([а-яё]+)").unwrap());

// "до 14"
static DAY_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bдо\s+(\d{1,2})\b").unwrap());

/// Returns `Some` when the text is an excuse. `today` supplies the default
/// month and year for partial dates.
pub fn detect_excuse(text: &NormalizedText, today: NaiveDate) -> Option<ExcuseInfo> {
    if !lexicon::contains_any(text.as_str(), EXCUSE_PHRASES) {
        return None;
    }
    Some(ExcuseInfo {
        until_date: parse_until_date(text.as_str(), today),
    })
}

/// Extracts the date following "до". The first sub-format that matches
/// decides; an impossible calendar date yields `None`.
pub fn parse_until_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = NUMERIC_DATE.captures(text) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let year = match caps.get(3) {
            Some(y) => {
                let y = y.as_str().parse::<i32>().ok()?;
                if y < 100 { y + 2000 } else { y }
            }
            None => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = WORD_DATE.captures(text) {
        if let Some(month) = lexicon::month_from_word(&caps[2]) {
            let day = caps[1].parse::<u32>().ok()?;
            return NaiveDate::from_ymd_opt(today.year(), month, day);
        }
    }

    if let Some(caps) = DAY_ONLY.captures(text) {
        let day = caps[1].parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(today.year(), today.month(), day);
    }

    None
}
