// src/llm/prompt.rs
// Prompt construction for the three augmentation operations, plus the
// deterministic cache-key projection. Identical inputs under the same prompt
// version always hash identically; bumping the version changes every key and
// implicitly invalidates prior cache entries.

use sha2::{Digest, Sha256};

use crate::metrics::Metrics;
use crate::parser::ConversationStats;

/// Bump when any prompt template below changes.
pub const PROMPT_VERSION: &str = "v3";

/// Free-text context contributes at most this many characters to the key.
const CONTEXT_KEY_PREFIX_CHARS: usize = 240;

/// Deterministic cache key: operation name, each metric score rounded to one
/// decimal, a bounded context prefix, and the prompt-version tag.
pub fn cache_key(operation: &str, metrics: &Metrics, context: &str, version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b"|");
    for (name, score) in metrics.scores() {
        hasher.update(name.as_bytes());
        hasher.update(format!("={:.1};", score).as_bytes());
    }
    hasher.update(b"|");
    let prefix: String = context.chars().take(CONTEXT_KEY_PREFIX_CHARS).collect();
    hasher.update(prefix.as_bytes());
    hasher.update(b"|");
    hasher.update(version.as_bytes());
    format!("rapport:{operation}:{:x}", hasher.finalize())
}

fn metric_lines(metrics: &Metrics) -> String {
    let labels = [
        metrics.sentiment.label.as_str(),
        metrics.empathy.label.as_str(),
        metrics.conflict.label.as_str(),
        metrics.we_language.label.as_str(),
        metrics.communication_balance.label.as_str(),
    ];
    metrics
        .scores()
        .iter()
        .zip(labels)
        .map(|((name, score), label)| format!("- {name}: {score:.0}/100 ({label})"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stats_line(stats: &ConversationStats) -> String {
    format!(
        "{} messages between {} participant(s): {}",
        stats.total_messages,
        stats.participant_count,
        stats.participants.join(", ")
    )
}

pub fn insights_prompt(metrics: &Metrics, stats: &ConversationStats) -> String {
    format!(
        r#"You are a relationship communication coach reviewing heuristic metrics
computed from a chat conversation (no raw messages are available to you).

Conversation: {}
Metrics:
{}

Write 3 to 5 insights about the communication patterns these metrics reveal.
Respond with a JSON array only, no prose around it, each element shaped as:
{{"category": "sentiment|empathy|conflict|we_language|communication_balance|overall", "title": "...", "description": "..."}}"#,
        stats_line(stats),
        metric_lines(metrics)
    )
}

/// Shorter, more constrained variant used for the single retry after a
/// parse failure.
pub fn insights_retry_prompt(metrics: &Metrics) -> String {
    format!(
        "Metrics:\n{}\n\nReturn ONLY a JSON array of 3 objects with keys \
         \"category\", \"title\", \"description\". No other text.",
        metric_lines(metrics)
    )
}

pub fn recommendations_prompt(metrics: &Metrics, stats: &ConversationStats) -> String {
    format!(
        r#"You are a relationship communication coach. Based on these heuristic
metrics from a chat conversation:

Conversation: {}
Metrics:
{}

Write 3 to 5 practical, specific recommendations to improve the communication.
Respond with a JSON array only, each element shaped as:
{{"category": "sentiment|empathy|conflict|we_language|communication_balance|overall", "title": "...", "description": "..."}}"#,
        stats_line(stats),
        metric_lines(metrics)
    )
}

pub fn recommendations_retry_prompt(metrics: &Metrics) -> String {
    format!(
        "Metrics:\n{}\n\nReturn ONLY a JSON array of 3 objects with keys \
         \"category\", \"title\", \"description\". No other text.",
        metric_lines(metrics)
    )
}

pub fn summary_prompt(metrics: &Metrics, baseline_summary: &str) -> String {
    format!(
        r#"Rewrite this mechanical summary of a chat conversation's communication
health into two or three warm, natural sentences. Keep every factual claim.

Metrics:
{}

Draft summary: "{}"

Respond with a JSON object only: {{"summary": "..."}}"#,
        metric_lines(metrics),
        baseline_summary
    )
}

pub fn summary_retry_prompt(baseline_summary: &str) -> String {
    format!(
        "Rephrase into natural language: \"{baseline_summary}\"\n\n\
         Return ONLY the JSON object {{\"summary\": \"...\"}}. No other text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::metrics::{score_all, ConflictTuning};
    use crate::parser::compute_stats;
    use std::sync::Arc;

    fn metrics() -> Metrics {
        let lexicon = Arc::new(Lexicon::builtin());
        score_all(
            "we love our chats",
            &compute_stats(&[]),
            &lexicon,
            &ConflictTuning::default(),
        )
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let m = metrics();
        let a = cache_key("insights", &m, "ctx", PROMPT_VERSION);
        let b = cache_key("insights", &m, "ctx", PROMPT_VERSION);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_varies_by_operation_and_context() {
        let m = metrics();
        let base = cache_key("insights", &m, "ctx", PROMPT_VERSION);
        assert_ne!(base, cache_key("recommendations", &m, "ctx", PROMPT_VERSION));
        assert_ne!(base, cache_key("insights", &m, "other", PROMPT_VERSION));
    }

    #[test]
    fn test_prompt_version_invalidates_key() {
        let m = metrics();
        assert_ne!(
            cache_key("insights", &m, "ctx", "v3"),
            cache_key("insights", &m, "ctx", "v4")
        );
    }

    #[test]
    fn test_long_context_is_bounded() {
        let m = metrics();
        let long_a = format!("{}{}", "x".repeat(CONTEXT_KEY_PREFIX_CHARS), "tail-a");
        let long_b = format!("{}{}", "x".repeat(CONTEXT_KEY_PREFIX_CHARS), "tail-b");
        // Differences past the bounded prefix do not change the key
        assert_eq!(
            cache_key("summary", &m, &long_a, PROMPT_VERSION),
            cache_key("summary", &m, &long_b, PROMPT_VERSION)
        );
    }

    #[test]
    fn test_prompts_ask_for_json() {
        let m = metrics();
        let stats = compute_stats(&[]);
        assert!(insights_prompt(&m, &stats).contains("JSON array"));
        assert!(recommendations_prompt(&m, &stats).contains("JSON array"));
        assert!(summary_prompt(&m, "draft").contains("JSON object"));
        assert!(insights_retry_prompt(&m).contains("ONLY"));
    }
}
