// src/metrics/sentiment.rs
// Positive/negative lexicon ratio, 0-100. No hits either way reads as
// neutral 50, not as an error.

use std::sync::Arc;

use super::{MetricDetail, MetricResult};
use crate::lexicon::Lexicon;

pub fn score(tokens: &[String], lexicon: &Arc<Lexicon>) -> MetricResult {
    let positive_hits = tokens
        .iter()
        .filter(|t| lexicon.positive_words.contains(t.as_str()))
        .count();
    let negative_hits = tokens
        .iter()
        .filter(|t| lexicon.negative_words.contains(t.as_str()))
        .count();

    let total = positive_hits + negative_hits;
    let score = if total == 0 {
        50.0
    } else {
        positive_hits as f64 / total as f64 * 100.0
    };

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::Sentiment {
            positive_hits,
            negative_hits,
        },
    }
}

fn label(score: f64) -> &'static str {
    if score >= 70.0 {
        "very positive"
    } else if score >= 55.0 {
        "positive"
    } else if score >= 45.0 {
        "neutral"
    } else if score >= 30.0 {
        "negative"
    } else {
        "very negative"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tokenize;

    fn lexicon() -> Arc<Lexicon> {
        Arc::new(Lexicon::builtin())
    }

    #[test]
    fn test_no_hits_is_neutral_50() {
        let result = score(&tokenize("the quick brown fox"), &lexicon());
        assert_eq!(result.score, 50.0);
        assert_eq!(result.label, "neutral");
        assert_eq!(
            result.detail,
            MetricDetail::Sentiment {
                positive_hits: 0,
                negative_hits: 0
            }
        );
    }

    #[test]
    fn test_all_positive_is_100() {
        let result = score(&tokenize("love you, this is wonderful and amazing"), &lexicon());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.label, "very positive");
    }

    #[test]
    fn test_all_negative_is_0() {
        let result = score(&tokenize("i hate this, it is terrible and awful"), &lexicon());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.label, "very negative");
    }

    #[test]
    fn test_mixed_ratio() {
        // 1 positive (love) vs 1 negative (hate) -> 50
        let result = score(&tokenize("love hate"), &lexicon());
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_turkish_endearments_are_positive() {
        let result = score(&tokenize("Merhaba canım, merhaba aşkım"), &lexicon());
        assert!(result.score > 50.0, "Endearments should score positive");
    }

    #[test]
    fn test_empty_tokens_neutral() {
        let result = score(&[], &lexicon());
        assert_eq!(result.score, 50.0);
    }
}
