// src/metrics/we_language.rs
// Collective vs singular pronoun share as a proxy for relational framing.
// No pronouns at all reads as neutral 50.

use std::sync::Arc;

use super::{MetricDetail, MetricResult};
use crate::lexicon::Lexicon;

pub fn score(tokens: &[String], lexicon: &Arc<Lexicon>) -> MetricResult {
    let collective_hits = tokens
        .iter()
        .filter(|t| lexicon.collective_pronouns.contains(t.as_str()))
        .count();
    let singular_hits = tokens
        .iter()
        .filter(|t| lexicon.singular_pronouns.contains(t.as_str()))
        .count();

    let total = collective_hits + singular_hits;
    let score = if total == 0 {
        50.0
    } else {
        collective_hits as f64 / total as f64 * 100.0
    };

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::WeLanguage {
            collective_hits,
            singular_hits,
        },
    }
}

fn label(score: f64) -> &'static str {
    if score >= 70.0 {
        "strong"
    } else if score >= 40.0 {
        "moderate"
    } else {
        "weak"
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
    fn test_no_pronouns_is_neutral_50() {
        let result = score(&tokenize("dinner tonight at nine"), &lexicon());
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_pure_we_language_is_100() {
        let result = score(&tokenize("we should plan our trip together"), &lexicon());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.label, "strong");
    }

    #[test]
    fn test_pure_singular_is_0() {
        let result = score(&tokenize("i told you, you never ask me"), &lexicon());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.label, "weak");
    }

    #[test]
    fn test_mixed_pronouns() {
        // "we" + "us" vs "i" + "you" -> 50
        let result = score(&tokenize("we could go, us both, but i need you"), &lexicon());
        assert_eq!(result.score, 50.0);
        assert_eq!(result.label, "moderate");
    }
}
