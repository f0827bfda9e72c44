//! Weight parsing: absolute body weight and signed weight change.

use super::lexicon::{self, MEAL_WORDS};
use super::normalize::NormalizedText;
use regex::Regex;
use std::sync::LazyLock;

/// Largest believable day-to-day change, in kg.
pub const MAX_DELTA_KG: f64 = 5.0;
pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 200.0;

/// Magnitudes at or above this are read as grams.
const GRAMS_THRESHOLD: f64 = 10.0;

static SIGNED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\bплюс|\bминус|\+|-)\s*(\d+(?:\.\d+)?)").unwrap());

/// A gram unit as a whole word: "гр", "гр.", "грамм", "граммов".
static GRAM_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bгр(?:ам+(?:а|ов)?)?\b").unwrap());

/// Anything that makes a number a weight change: a sign directly before a
/// digit, a sign word, or a gram unit. A hyphen inside a double-barrelled
/// surname is not a sign.
static DELTA_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]\s*\d|\b(?:плюс|минус)(?:\b|\s*\d)|\bгр(?:ам+(?:а|ов)?)?\b").unwrap()
});

static BODY_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,3}(?:\.\d{1,3})?)\b").unwrap());

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn is_plausible_weight(kg: f64) -> bool {
    (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&kg)
}

/// Signed weight change in kg: "+0.5", "-0.3", "плюс 300 гр", "минус 50".
pub fn parse_weight_delta(text: &NormalizedText) -> Option<f64> {
    let t = text.with_dot_decimals();
    let caps = SIGNED_NUMBER.captures(&t)?;

    let sign = match &caps[1] {
        "-" | "минус" => -1.0,
        _ => 1.0,
    };
    let mut magnitude = caps[2].parse::<f64>().ok()?;
    if GRAM_UNIT.is_match(&t) || magnitude >= GRAMS_THRESHOLD {
        magnitude /= 1000.0;
    }

    let delta = round3(sign * magnitude);
    if delta.abs() > MAX_DELTA_KG {
        return None;
    }
    Some(delta)
}

/// Absolute body weight in kg: "49", "49.5", "вес 49,2".
///
/// Not attempted when the text carries any delta marker or meal word.
pub fn parse_absolute_weight(text: &NormalizedText) -> Option<f64> {
    let t = text.with_dot_decimals();
    if DELTA_MARKER.is_match(&t) || lexicon::contains_any(&t, MEAL_WORDS) {
        return None;
    }

    let caps = BODY_WEIGHT.captures(&t)?;
    let value = caps[1].parse::<f64>().ok()?;
    is_plausible_weight(value).then(|| round3(value))
}
