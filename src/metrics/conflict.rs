// src/metrics/conflict.rs
// Conflict pressure, 0-100: indicator-word density plus capitalization and
// exclamation bonuses. The bonus thresholds and multipliers carry over from
// the original tuning unchanged; they are configuration, not derived values.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{MetricDetail, MetricResult};
use crate::lexicon::Lexicon;

/// Knobs for the two shouting signals. Defaults preserve the original
/// constants: capital ratio above 0.40 adds up to 50 points, exclamation
/// density above 0.20 adds up to 100 (the sum is clamped to 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictTuning {
    pub capital_ratio_threshold: f64,
    pub capital_bonus_factor: f64,
    pub exclamation_ratio_threshold: f64,
    pub exclamation_bonus_factor: f64,
}

impl Default for ConflictTuning {
    fn default() -> Self {
        Self {
            capital_ratio_threshold: 0.4,
            capital_bonus_factor: 50.0,
            exclamation_ratio_threshold: 0.2,
            exclamation_bonus_factor: 100.0,
        }
    }
}

pub fn score(
    body: &str,
    tokens: &[String],
    lexicon: &Arc<Lexicon>,
    tuning: &ConflictTuning,
) -> MetricResult {
    let word_count = tokens.len();
    let indicator_hits = tokens
        .iter()
        .filter(|t| lexicon.conflict_indicators.contains(t.as_str()))
        .count();
    let capital_ratio = capital_letter_ratio(body);
    let exclamation_count = body.chars().filter(|&c| c == '!').count();

    let score = if word_count == 0 {
        0.0
    } else {
        let indicator_ratio = indicator_hits as f64 / word_count as f64;
        let capital_bonus =
            (capital_ratio - tuning.capital_ratio_threshold).max(0.0) * tuning.capital_bonus_factor;
        let exclamation_bonus = (exclamation_count as f64 / word_count as f64
            - tuning.exclamation_ratio_threshold)
            .max(0.0)
            * tuning.exclamation_bonus_factor;
        (indicator_ratio * 100.0 + capital_bonus + exclamation_bonus).min(100.0)
    };

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::Conflict {
            indicator_hits,
            word_count,
            capital_ratio: (capital_ratio * 1000.0).round() / 1000.0,
            exclamation_count,
        },
    }
}

/// Uppercase share of alphabetic characters only, so punctuation-heavy text
/// does not skew the denominator.
fn capital_letter_ratio(text: &str) -> f64 {
    let mut letters = 0usize;
    let mut uppercase = 0usize;
    for c in text.chars() {
        if c.is_alphabetic() {
            letters += 1;
            if c.is_uppercase() {
                uppercase += 1;
            }
        }
    }
    if letters == 0 {
        0.0
    } else {
        uppercase as f64 / letters as f64
    }
}

fn label(score: f64) -> &'static str {
    if score >= 70.0 {
        "very high"
    } else if score >= 50.0 {
        "high"
    } else if score >= 30.0 {
        "moderate"
    } else if score >= 10.0 {
        "low"
    } else {
        "very low"
    }
}
