// src/metrics/balance.rs
// How evenly the conversation is shared. Two participants compare message
// and word counts directly; larger groups use the spread of message shares.
// A single participant is one-sided by definition and scores 0.

use crate::parser::ConversationStats;

use super::{MetricDetail, MetricResult};

pub fn score(stats: &ConversationStats) -> MetricResult {
    match stats.participant_count {
        0 | 1 => MetricResult {
            score: 0.0,
            label: "one-sided".to_string(),
            detail: MetricDetail::Balance {
                participant_count: stats.participant_count,
                message_ratio: None,
                word_ratio: None,
            },
        },
        2 => score_pair(stats),
        _ => score_group(stats),
    }
}

fn score_pair(stats: &ConversationStats) -> MetricResult {
    let mut counts = stats
        .message_distribution
        .values()
        .map(|p| (p.message_count as f64, p.total_words as f64));
    // participant_count == 2 guarantees both entries exist
    let (msgs_a, words_a) = counts.next().unwrap_or((0.0, 0.0));
    let (msgs_b, words_b) = counts.next().unwrap_or((0.0, 0.0));

    let message_ratio = min_max_ratio(msgs_a, msgs_b);
    let word_ratio = min_max_ratio(words_a, words_b);
    let score = (message_ratio + word_ratio) / 2.0 * 100.0;

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::Balance {
            participant_count: 2,
            message_ratio: Some(round3(message_ratio)),
            word_ratio: Some(round3(word_ratio)),
        },
    }
}

fn score_group(stats: &ConversationStats) -> MetricResult {
    let shares: Vec<f64> = stats
        .message_distribution
        .values()
        .map(|p| p.percentage)
        .collect();
    let score = (100.0 - stdev(&shares) * 5.0).max(0.0);

    MetricResult {
        score,
        label: label(score).to_string(),
        detail: MetricDetail::Balance {
            participant_count: stats.participant_count,
            message_ratio: None,
            word_ratio: None,
        },
    }
}

fn min_max_ratio(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == 0.0 {
        0.0
    } else {
        a.min(b) / max
    }
}

/// Population standard deviation of participant shares.
fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn label(score: f64) -> &'static str {
    if score >= 80.0 {
        "excellent"
    } else if score >= 60.0 {
        "good"
    } else if score >= 40.0 {
        "fair"
    } else {
        "poor"
    }
}
