// src/llm/orchestrator.rs
// Cache-aside augmentation over the provider abstraction.
//
// Every operation follows the same ladder: cache check, availability
// precondition, bounded provider call, strict JSON-span decode, exactly one
// simplified retry on a parse failure, then the rule-based fallback. Provider
// errors are caught here and logged; they never reach the Report caller.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::metrics::Metrics;
use crate::parser::ConversationStats;
use crate::report::Insight;

use super::prompt;
use super::provider::LlmProvider;

/// Injected orchestration knobs; none of this is hard-coded in call sites.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// TTL for confident (provider-produced) results.
    pub long_ttl: Duration,
    /// TTL for degraded (fallback) results, so transient outages self-heal
    /// without hammering the provider every request.
    pub short_ttl: Duration,
    /// Upper bound on a single provider call.
    pub call_timeout: Duration,
    pub max_tokens: usize,
    pub prompt_version: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            long_ttl: Duration::from_secs(3600),
            short_ttl: Duration::from_secs(1800),
            call_timeout: Duration::from_secs(20),
            max_tokens: 700,
            prompt_version: prompt::PROMPT_VERSION.to_string(),
        }
    }
}

/// How a payload was obtained, which decides its cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Confident,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryPayload {
    summary: String,
}

pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    cache: Arc<dyn CacheStore>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        cache: Arc<dyn CacheStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    /// Replace the rule-based insights with provider-generated ones when
    /// possible; the baseline is always a valid result.
    pub async fn insights(
        &self,
        metrics: &Metrics,
        stats: &ConversationStats,
        baseline: Vec<Insight>,
    ) -> Vec<Insight> {
        let context = conversation_context(stats);
        let generated: Vec<Insight> = self
            .augment(
                "insights",
                &prompt::insights_prompt(metrics, stats),
                &prompt::insights_retry_prompt(metrics),
                metrics,
                &context,
                baseline.clone(),
            )
            .await;
        if generated.is_empty() {
            baseline
        } else {
            generated
        }
    }

    pub async fn recommendations(
        &self,
        metrics: &Metrics,
        stats: &ConversationStats,
        baseline: Vec<Insight>,
    ) -> Vec<Insight> {
        let context = conversation_context(stats);
        let generated: Vec<Insight> = self
            .augment(
                "recommendations",
                &prompt::recommendations_prompt(metrics, stats),
                &prompt::recommendations_retry_prompt(metrics),
                metrics,
                &context,
                baseline.clone(),
            )
            .await;
        if generated.is_empty() {
            baseline
        } else {
            generated
        }
    }

    /// Rephrase the deterministic summary; degrades to the baseline text.
    pub async fn enhance_summary(&self, metrics: &Metrics, baseline: String) -> String {
        let payload: SummaryPayload = self
            .augment(
                "summary",
                &prompt::summary_prompt(metrics, &baseline),
                &prompt::summary_retry_prompt(&baseline),
                metrics,
                &baseline,
                SummaryPayload {
                    summary: baseline.clone(),
                },
            )
            .await;
        if payload.summary.trim().is_empty() {
            baseline
        } else {
            payload.summary
        }
    }

    /// The shared ladder. `fallback` is returned (and cached with the short
    /// TTL) whenever the provider is unavailable, errors, times out, or both
    /// decode attempts fail.
    async fn augment<T>(
        &self,
        operation: &'static str,
        full_prompt: &str,
        retry_prompt: &str,
        metrics: &Metrics,
        context: &str,
        fallback: T,
    ) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let key = prompt::cache_key(operation, metrics, context, &self.settings.prompt_version);

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(value) = serde_json::from_value::<T>(cached) {
                debug!("{operation}: cache hit ({})", self.cache.backend());
                return value;
            }
            // Stale shape under a live key (e.g. after a deploy); drop it.
            self.cache.delete(&key).await;
        }

        if !self.provider.is_available() {
            debug!(
                "{operation}: provider {} unavailable, using rule-based fallback",
                self.provider.name()
            );
            return fallback;
        }

        match self.call_and_parse::<T>(full_prompt, self.settings.max_tokens).await {
            Ok(value) => {
                self.store(&key, &value, Outcome::Confident).await;
                info!("{operation}: provider result cached");
                return value;
            }
            Err(CallError::Parse(e)) => {
                warn!(
                    "{operation}: unparseable response from {} ({e}), retrying with constrained prompt",
                    self.provider.name()
                );
            }
            Err(CallError::Provider(e)) => {
                warn!(
                    "{operation}: provider {} failed ({e}), using rule-based fallback",
                    self.provider.name()
                );
                self.store(&key, &fallback, Outcome::Degraded).await;
                return fallback;
            }
        }

        // Exactly one retry, with a shorter prompt and a tighter budget.
        let jitter = Duration::from_millis(50 + rand::random::<u64>() % 100);
        sleep(jitter).await;
        let retry_tokens = (self.settings.max_tokens / 2).max(256);
        match self.call_and_parse::<T>(retry_prompt, retry_tokens).await {
            Ok(value) => {
                self.store(&key, &value, Outcome::Confident).await;
                info!("{operation}: retry succeeded");
                value
            }
            Err(e) => {
                warn!(
                    "{operation}: retry failed ({}), using rule-based fallback",
                    e
                );
                self.store(&key, &fallback, Outcome::Degraded).await;
                fallback
            }
        }
    }

    async fn call_and_parse<T: DeserializeOwned>(
        &self,
        prompt_text: &str,
        max_tokens: usize,
    ) -> std::result::Result<T, CallError> {
        let call = self.provider.generate(prompt_text, max_tokens);
        let response = match timeout(self.settings.call_timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(CallError::Provider(e)),
            Err(_) => {
                return Err(CallError::Provider(anyhow!(
                    "call timed out after {:?}",
                    self.settings.call_timeout
                )))
            }
        };
        parse_payload(&response).map_err(CallError::Parse)
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, outcome: Outcome) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize cache payload for {key}: {e}");
                return;
            }
        };
        let ttl = match outcome {
            Outcome::Confident => self.settings.long_ttl,
            Outcome::Degraded => self.settings.short_ttl,
        };
        self.cache.set(key, payload, ttl).await;
    }
}

enum CallError {
    Provider(anyhow::Error),
    Parse(anyhow::Error),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Provider(e) => write!(f, "provider error: {e}"),
            CallError::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

fn conversation_context(stats: &ConversationStats) -> String {
    format!(
        "{}:{}:{}",
        stats.total_messages,
        stats.participant_count,
        stats.participants.join(",")
    )
}

/// Locate the first `[`/`{` and the last matching `]`/`}` and decode that
/// span strictly; anything around it (prose, markdown fences) is ignored.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let open_idx = text.find(['[', '{'])?;
    let close = if text.as_bytes()[open_idx] == b'[' {
        ']'
    } else {
        '}'
    };
    let close_idx = text.rfind(close)?;
    if close_idx <= open_idx {
        return None;
    }
    Some(&text[open_idx..=close_idx])
}

fn parse_payload<T: DeserializeOwned>(response: &str) -> Result<T> {
    let span = extract_json_span(response)
        .ok_or_else(|| anyhow!("no JSON span in response ({} chars)", response.len()))?;
    let value: Value = serde_json::from_str(span).context("JSON span does not decode")?;
    serde_json::from_value(value).context("JSON span has the wrong shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_span_from_prose() {
        let text = "Sure! Here are your insights:\n[{\"a\": 1}]\nHope that helps.";
        assert_eq!(extract_json_span(text), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn test_extract_span_from_markdown_fence() {
        let text = "```json\n{\"summary\": \"fine\"}\n```";
        assert_eq!(extract_json_span(text), Some("{\"summary\": \"fine\"}"));
    }

    #[test]
    fn test_extract_span_prefers_first_opener() {
        let text = "note {\"k\": [1, 2]} end";
        // First opener is '{', so the span runs to the last '}'
        assert_eq!(extract_json_span(text), Some("{\"k\": [1, 2]}"));
    }

    #[test]
    fn test_no_span_in_plain_prose() {
        assert_eq!(extract_json_span("no json here at all"), None);
        assert_eq!(extract_json_span("} backwards ["), None);
    }

    #[test]
    fn test_parse_payload_strict() {
        let ok: Vec<Insight> = parse_payload(
            r#"Here you go: [{"category": "overall", "title": "t", "description": "d"}]"#,
        )
        .unwrap();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].category, "overall");

        let bad: Result<Vec<Insight>> = parse_payload("[{\"category\": 7}]");
        assert!(bad.is_err(), "Wrong shape must not decode");

        let none: Result<Vec<Insight>> = parse_payload("sorry, I cannot do that");
        assert!(none.is_err());
    }
}
