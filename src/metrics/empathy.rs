// src/metrics/empathy.rs
// Empathy-phrase and emoji density per word, scaled to 0-100.
// Formula: min((phrase_hits + emoji_hits) / word_count * 10 * 100, 100);
// an empty conversation scores 0.

use std::sync::Arc;

use super::{MetricDetail, MetricResult};
use crate::lexicon::Lexicon;

pub fn score(
    body_lower: &str,
    body: &str,
    tokens: &[String],
    lexicon: &Arc<Lexicon>,
) -> MetricResult {
    let word_count = tokens.len();

    // Phrases span token boundaries ("i hear you"), so they are counted as
    // substring occurrences over the lowercased body.
    let phrase_hits: usize = lexicon
        .empathy_phrases
        .iter()
        .map(|phrase| count_occurrences(body_lower, phrase))
        .sum();
    let emoji_hits: usize = lexicon
        .empathy_emoji
        .iter()
        .map(|glyph| count_occurrences(body, glyph))
        .sum();

    let score = if word_count == 0 {
        0.0
    } else {
        let density = (phrase_hits + emoji_hits) as f64 / word_count as f64;
        (density * 10.0 * 100.0).min(100.0)
    };

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::Empathy {
            phrase_hits,
            emoji_hits,
            word_count,
        },
    }
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn label(score: f64) -> &'static str {
    if score >= 70.0 {
        "high"
    } else if score >= 40.0 {
        "medium"
    } else if score >= 10.0 {
        "low"
    } else {
        "very low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tokenize;

    fn run(body: &str) -> MetricResult {
        let lexicon = Arc::new(Lexicon::builtin());
        score(&body.to_lowercase(), body, &tokenize(body), &lexicon)
    }

    #[test]
    fn test_empty_input_is_zero() {
        let result = run("");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.label, "very low");
    }

    #[test]
    fn test_no_empathy_markers_is_zero() {
        let result = run("the meeting starts at nine tomorrow");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_phrase_hit_raises_score() {
        let result = run("I understand how you feel about it");
        match result.detail {
            MetricDetail::Empathy { phrase_hits, .. } => {
                assert!(phrase_hits >= 1, "Expected phrase hit")
            }
            ref other => panic!("Wrong detail variant: {other:?}"),
        }
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_emoji_counted_from_original_text() {
        let result = run("good morning ❤️ see you tonight ❤️");
        match result.detail {
            MetricDetail::Empathy { emoji_hits, .. } => assert_eq!(emoji_hits, 2),
            ref other => panic!("Wrong detail variant: {other:?}"),
        }
    }

    #[test]
    fn test_score_capped_at_100() {
        let result = run("i understand ❤️ 🙏");
        assert_eq!(result.score, 100.0);
        assert_eq!(result.label, "high");
    }
}
