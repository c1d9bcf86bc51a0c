// src/metrics/mod.rs
// Five independent, deterministic metric scorers.
//
// Each scorer is a pure function over the conversation body: no shared state,
// no network, no learned parameters. Scores are bounded to [0, 100] and every
// degenerate input resolves to a documented neutral value, never an error.

pub mod balance;
pub mod conflict;
pub mod empathy;
pub mod sentiment;
pub mod we_language;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::parser::ConversationStats;

pub use conflict::ConflictTuning;

/// One scored dimension: bounded score, categorical label, and the raw counts
/// that explain how the score came about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricResult {
    pub score: f64,
    pub label: String,
    #[serde(flatten)]
    pub detail: MetricDetail,
}

/// Metric-specific diagnostic counts, flattened into the serialized metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricDetail {
    Sentiment {
        positive_hits: usize,
        negative_hits: usize,
    },
    Empathy {
        phrase_hits: usize,
        emoji_hits: usize,
        word_count: usize,
    },
    Conflict {
        indicator_hits: usize,
        word_count: usize,
        capital_ratio: f64,
        exclamation_count: usize,
    },
    WeLanguage {
        collective_hits: usize,
        singular_hits: usize,
    },
    Balance {
        participant_count: usize,
        message_ratio: Option<f64>,
        word_ratio: Option<f64>,
    },
}

/// The five fixed report dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub sentiment: MetricResult,
    pub empathy: MetricResult,
    pub conflict: MetricResult,
    pub we_language: MetricResult,
    pub communication_balance: MetricResult,
}

impl Metrics {
    /// Scores in fixed key order, for cache-key projection and bounds checks.
    pub fn scores(&self) -> [(&'static str, f64); 5] {
        [
            ("sentiment", self.sentiment.score),
            ("empathy", self.empathy.score),
            ("conflict", self.conflict.score),
            ("we_language", self.we_language.score),
            ("communication_balance", self.communication_balance.score),
        ]
    }
}

/// Lowercase whitespace tokens with leading/trailing punctuation stripped,
/// so `"aşkım,"` and `"nasılsın?"` match lexicon entries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run all five scorers over the conversation body. `body` is the message
/// contents joined with newlines, original case preserved (the conflict
/// scorer reads capitalization from it).
pub fn score_all(
    body: &str,
    stats: &ConversationStats,
    lexicon: &Arc<Lexicon>,
    tuning: &ConflictTuning,
) -> Metrics {
    let tokens = tokenize(body);
    let body_lower = body.to_lowercase();

    Metrics {
        sentiment: sentiment::score(&tokens, lexicon),
        empathy: empathy::score(&body_lower, body, &tokens, lexicon),
        conflict: conflict::score(body, &tokens, lexicon, tuning),
        we_language: we_language::score(&tokens, lexicon),
        communication_balance: balance::score(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = tokenize("Merhaba aşkım, nasılsın?");
        assert_eq!(tokens, vec!["merhaba", "aşkım", "nasılsın"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ?! ... ").is_empty());
    }

    #[test]
    fn test_all_scores_bounded_on_arbitrary_text() {
        let lexicon = Arc::new(Lexicon::builtin());
        let tuning = ConflictTuning::default();
        let long = "spam ".repeat(5000);
        let samples = [
            "",
            "!!!",
            "I LOVE YOU BUT YOU ALWAYS IGNORE ME!!!",
            "we should plan our trip together, us two",
            "Merhaba canım, seni çok özledim",
            long.as_str(),
        ];
        for sample in samples {
            let stats = crate::parser::compute_stats(&[]);
            let metrics = score_all(sample, &stats, &lexicon, &tuning);
            for (name, score) in metrics.scores() {
                assert!(
                    (0.0..=100.0).contains(&score),
                    "{name} out of bounds on {sample:?}: {score}"
                );
                assert!(score.is_finite(), "{name} not finite on {sample:?}");
            }
        }
    }
}
