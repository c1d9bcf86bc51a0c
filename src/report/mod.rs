// src/report/mod.rs
// Combines the five metric scores into the final Report: weighted overall
// score, deterministic summary, and the rule-based insights/recommendations
// that double as the LLM fallback. Everything here works with zero external
// dependencies.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use crate::parser::{ConversationStats, DetectedFormat};

// Fixed aggregation weights, summed over 100 then divided by 10.
const WEIGHT_SENTIMENT: f64 = 0.30;
const WEIGHT_EMPATHY: f64 = 0.25;
const WEIGHT_LOW_CONFLICT: f64 = 0.20;
const WEIGHT_WE_LANGUAGE: f64 = 0.15;
const WEIGHT_BALANCE: f64 = 0.10;

/// One narrative item, used for both insights and recommendations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub category: String,
    pub title: String,
    pub description: String,
}

impl Insight {
    pub fn new(category: &str, title: &str, description: &str) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub text_length: usize,
    pub detected_format: DetectedFormat,
    pub privacy_mode: bool,
    pub generated_at: String,
}

impl ReportMetadata {
    pub fn new(text_length: usize, detected_format: DetectedFormat, privacy_mode: bool) -> Self {
        Self {
            text_length,
            detected_format,
            privacy_mode,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    Error,
}

/// The pipeline's output. Constructed once per analysis request and never
/// mutated by the pipeline afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: Option<Metrics>,
    pub overall_score: f64,
    pub summary: String,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Insight>,
    pub conversation_stats: ConversationStats,
    pub metadata: ReportMetadata,
}

impl Report {
    /// The only caller-visible failure: non-empty input from which no
    /// messages could be extracted. Carries a diagnostic so the caller can
    /// retry with a different format hint.
    pub fn parse_error(diagnostic: String, metadata: ReportMetadata) -> Self {
        Self {
            status: ReportStatus::Error,
            error: Some(diagnostic),
            metrics: None,
            overall_score: 0.0,
            summary: String::new(),
            insights: Vec::new(),
            recommendations: Vec::new(),
            conversation_stats: ConversationStats::default(),
            metadata,
        }
    }
}

/// Build the baseline report from the metric map. A scorer returning a value
/// outside [0, 100] is a contract breach, not a runtime condition; it fails
/// loudly in debug builds.
pub fn aggregate(metrics: Metrics, stats: ConversationStats, metadata: ReportMetadata) -> Report {
    for (name, score) in metrics.scores() {
        debug_assert!(
            (0.0..=100.0).contains(&score),
            "scorer contract breach: {name} = {score}"
        );
    }

    let overall_score = overall_score(&metrics);
    debug_assert!((0.0..=10.0).contains(&overall_score));

    let summary = build_summary(&metrics);
    let insights = baseline_insights(&metrics, &stats);
    let recommendations = baseline_recommendations(&metrics);

    Report {
        status: ReportStatus::Success,
        error: None,
        metrics: Some(metrics),
        overall_score,
        summary,
        insights,
        recommendations,
        conversation_stats: stats,
        metadata,
    }
}

/// Weighted 0-10 aggregate. Conflict contributes inverted: less conflict,
/// higher score.
pub fn overall_score(metrics: &Metrics) -> f64 {
    let weighted = metrics.sentiment.score * WEIGHT_SENTIMENT
        + metrics.empathy.score * WEIGHT_EMPATHY
        + (100.0 - metrics.conflict.score) * WEIGHT_LOW_CONFLICT
        + metrics.we_language.score * WEIGHT_WE_LANGUAGE
        + metrics.communication_balance.score * WEIGHT_BALANCE;
    ((weighted / 10.0) * 10.0).round() / 10.0
}

/// Deterministic one-clause-per-signal summary. Always yields at least one
/// sentence, even on a fully neutral conversation.
pub fn build_summary(metrics: &Metrics) -> String {
    let mut clauses: Vec<&str> = Vec::new();

    if metrics.sentiment.score >= 60.0 {
        clauses.push("communication carries a positive tone");
    } else if metrics.sentiment.score < 40.0 {
        clauses.push("communication carries a tense, negative tone");
    }
    if metrics.empathy.score >= 40.0 {
        clauses.push("both sides acknowledge each other's feelings");
    }
    if metrics.conflict.score >= 50.0 {
        clauses.push("conflict markers are elevated");
    }
    if metrics.we_language.score >= 60.0 {
        clauses.push("the framing leans on collective we-language");
    } else if metrics.we_language.score < 30.0 {
        clauses.push("the framing is mostly individual rather than collective");
    }
    if metrics.communication_balance.score >= 80.0 {
        clauses.push("participation is evenly shared");
    } else if metrics.communication_balance.score < 40.0 {
        clauses.push("one side carries most of the conversation");
    }

    if clauses.is_empty() {
        return "Communication shows a broadly neutral pattern with no dominant signal."
            .to_string();
    }

    let mut summary = String::from("Overall, ");
    summary.push_str(&clauses.join("; "));
    summary.push('.');
    summary
}

/// Rule-based insights from per-metric threshold checks. This is the
/// fallback target for LLM augmentation and must never fail.
pub fn baseline_insights(metrics: &Metrics, stats: &ConversationStats) -> Vec<Insight> {
    let mut insights = Vec::new();

    if metrics.sentiment.score >= 70.0 {
        insights.push(Insight::new(
            "sentiment",
            "Warm emotional tone",
            "Positive language clearly outweighs negative language across the conversation.",
        ));
    } else if metrics.sentiment.score < 30.0 {
        insights.push(Insight::new(
            "sentiment",
            "Negative emotional tone",
            "Negative language dominates; the conversation reads as strained.",
        ));
    }

    if metrics.empathy.score >= 40.0 {
        insights.push(Insight::new(
            "empathy",
            "Active emotional acknowledgment",
            "Empathy phrases and supportive reactions appear regularly.",
        ));
    } else if metrics.empathy.score < 10.0 {
        insights.push(Insight::new(
            "empathy",
            "Little explicit empathy",
            "Messages rarely acknowledge the other person's feelings in words.",
        ));
    }

    if metrics.conflict.score >= 50.0 {
        insights.push(Insight::new(
            "conflict",
            "Elevated conflict signals",
            "Generalizing words, shouting, and exclamation-heavy messages suggest friction.",
        ));
    }

    if metrics.we_language.score >= 70.0 {
        insights.push(Insight::new(
            "we_language",
            "Strong collective framing",
            "Plural pronouns dominate, which points at a shared, team-like perspective.",
        ));
    } else if metrics.we_language.score < 30.0 {
        insights.push(Insight::new(
            "we_language",
            "Individual framing",
            "Singular pronouns dominate; topics are framed as yours-versus-mine.",
        ));
    }

    if metrics.communication_balance.score >= 80.0 && stats.participant_count >= 2 {
        insights.push(Insight::new(
            "communication_balance",
            "Balanced participation",
            "Message and word counts are close to even between participants.",
        ));
    } else if metrics.communication_balance.score < 40.0 {
        insights.push(Insight::new(
            "communication_balance",
            "One-sided participation",
            "One participant contributes far more than the other(s).",
        ));
    }

    if insights.is_empty() {
        insights.push(Insight::new(
            "overall",
            "Neutral communication pattern",
            "No metric stands out strongly in either direction.",
        ));
    }
    insights
}

/// Rule-based recommendations, triggered by low extremes.
pub fn baseline_recommendations(metrics: &Metrics) -> Vec<Insight> {
    let mut recommendations = Vec::new();

    if metrics.sentiment.score < 45.0 {
        recommendations.push(Insight::new(
            "sentiment",
            "Lead with appreciation",
            "Open difficult topics by naming one thing you value about the other person.",
        ));
    }
    if metrics.empathy.score < 40.0 {
        recommendations.push(Insight::new(
            "empathy",
            "Reflect feelings back",
            "Before answering, restate what the other person seems to feel in your own words.",
        ));
    }
    if metrics.conflict.score >= 50.0 {
        recommendations.push(Insight::new(
            "conflict",
            "Drop the generalizations",
            "Replace 'always' and 'never' with one concrete, recent example.",
        ));
    }
    if metrics.we_language.score < 40.0 {
        recommendations.push(Insight::new(
            "we_language",
            "Frame problems as shared",
            "Try 'how do we solve this' instead of 'you need to fix this'.",
        ));
    }
    if metrics.communication_balance.score < 40.0 {
        recommendations.push(Insight::new(
            "communication_balance",
            "Make room for the quieter side",
            "Ask open questions and leave space for longer replies.",
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(Insight::new(
            "overall",
            "Keep doing what works",
            "The measured signals are healthy; maintain the current communication habits.",
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::metrics::{score_all, ConflictTuning};
    use crate::parser::compute_stats;
    use std::sync::Arc;

    fn metrics_for(body: &str) -> Metrics {
        let lexicon = Arc::new(Lexicon::builtin());
        score_all(body, &compute_stats(&[]), &lexicon, &ConflictTuning::default())
    }

    #[test]
    fn test_overall_score_neutral_input() {
        // Neutral sentiment 50, we 50, empathy 0, conflict 0, balance 0:
        // (15 + 0 + 20 + 7.5 + 0) / 10 = 4.25 -> 4.3 after rounding
        let metrics = metrics_for("");
        let overall = overall_score(&metrics);
        assert!((overall - 4.3).abs() < 0.11, "Got {overall}");
    }

    #[test]
    fn test_overall_score_bounded() {
        for body in ["", "love love love we us our", "HATE HATE ALWAYS NEVER!!!"] {
            let overall = overall_score(&metrics_for(body));
            assert!((0.0..=10.0).contains(&overall), "{body:?} -> {overall}");
        }
    }

    #[test]
    fn test_summary_never_empty() {
        let summary = build_summary(&metrics_for(""));
        assert!(!summary.is_empty());
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_summary_mentions_positive_tone() {
        let summary = build_summary(&metrics_for("love this, wonderful, amazing day"));
        assert!(summary.contains("positive tone"), "Got: {summary}");
    }

    #[test]
    fn test_baseline_insights_never_empty() {
        let metrics = metrics_for("the weather report said rain at nine");
        let insights = baseline_insights(&metrics, &compute_stats(&[]));
        assert!(!insights.is_empty());
    }

    #[test]
    fn test_conflict_triggers_recommendation() {
        let metrics = metrics_for("YOU ALWAYS DO THIS!!! YOU NEVER LISTEN!!!");
        let recommendations = baseline_recommendations(&metrics);
        assert!(
            recommendations.iter().any(|r| r.category == "conflict"),
            "Expected a conflict recommendation, got {recommendations:?}"
        );
    }

    #[test]
    fn test_aggregate_produces_success_report() {
        let metrics = metrics_for("we love our evenings together");
        let metadata = ReportMetadata::new(29, DetectedFormat::Simple, false);
        let report = aggregate(metrics, compute_stats(&[]), metadata);
        assert_eq!(report.status, ReportStatus::Success);
        assert!(report.error.is_none());
        assert!(report.metrics.is_some());
        assert!(!report.summary.is_empty());
        assert!(!report.insights.is_empty());
        assert!(!report.recommendations.is_empty());
    }
}
