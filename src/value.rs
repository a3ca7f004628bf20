//! Post-inference scale repair for predicted analyte values.
//!
//! The rules below are plausibility heuristics tuned on scanned French
//! hematology reports, where the decimal point is routinely lost. They pick
//! a likely scale; they do not guarantee a clinically correct value.

use serde::{Deserialize, Serialize};

use crate::normalize::fold;

/// Analytes whose predictions are systematically ten times too large
const DIVIDE_BY_10: &[&str] = &["hemoglobine", "hematocrite", "ccmh", "tcmh"];

/// Analytes whose predictions are systematically a hundred times too large
const DIVIDE_BY_100: &[&str] = &["globules rouges"];

/// Divided by ten only above this size
const DIVIDE_IF_ABOVE: &[(&str, f64)] = &[("vgm", 100.0)];

/// Usual percentage ranges; values above the upper bound are divided by ten
/// until they fall under it.
const PERCENT_RANGES: &[(&str, (f64, f64))] = &[
    ("neutrophiles", (40.0, 90.0)),
    ("lymphocytes", (20.0, 45.0)),
    ("monocytes", (2.0, 10.0)),
    ("eosinophiles", (1.0, 6.0)),
    ("basophiles", (0.0, 1.0)),
];

/// Result of [`correct_value`]: a repaired number, or the input untouched
/// when it did not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectedValue {
    Number(f64),
    Raw(String),
}

impl CorrectedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CorrectedValue::Number(v) => Some(*v),
            CorrectedValue::Raw(_) => None,
        }
    }
}

/// Parse a predicted value, accepting `,` as decimal separator. Non-finite
/// results count as unparseable.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Apply the scale rules for `analyte` to `raw`.
pub fn correct_value(analyte: &str, raw: &str) -> CorrectedValue {
    let Some(mut v) = parse_value(raw) else {
        return CorrectedValue::Raw(raw.to_string());
    };
    let key = fold(analyte.trim());

    if DIVIDE_BY_10.contains(&key.as_str()) {
        v /= 10.0;
    } else if DIVIDE_BY_100.contains(&key.as_str()) {
        v /= 100.0;
    } else if let Some((_, limit)) = DIVIDE_IF_ABOVE.iter().find(|(k, _)| *k == key) {
        if v > *limit {
            v /= 10.0;
        }
    }

    if let Some((_, (_, max))) = PERCENT_RANGES.iter().find(|(k, _)| *k == key) {
        while v > *max {
            v /= 10.0;
        }
    }

    CorrectedValue::Number(v)
}
