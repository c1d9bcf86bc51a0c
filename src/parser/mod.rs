// src/parser/mod.rs
// Conversation parsing: raw chat export text -> ordered messages + stats.
//
// Two structural families are supported: timestamped exports (Android
// `date, time - sender: content` and bracketed iOS `[date, time] sender:
// content`) and the plain `sender: content` format with continuation lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::lexicon::Lexicon;

/// One utterance, in conversation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Per-participant slice of the conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParticipantStats {
    pub message_count: usize,
    /// Share of total messages, percent, one decimal.
    pub percentage: f64,
    /// Average message length in characters.
    pub avg_message_length: f64,
    pub total_words: usize,
}

/// Derived, read-only aggregate over the parsed messages. Always recomputed
/// from the message list, never cached between calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationStats {
    pub total_messages: usize,
    pub participants: Vec<String>,
    pub participant_count: usize,
    pub message_distribution: BTreeMap<String, ParticipantStats>,
}

/// Which structural family the parser ultimately used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedFormat {
    Timestamped,
    Simple,
    Empty,
}

impl DetectedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedFormat::Timestamped => "timestamped",
            DetectedFormat::Simple => "simple",
            DetectedFormat::Empty => "empty",
        }
    }
}

/// Caller-supplied format hint. `Auto` tries the timestamped patterns first
/// and falls back to simple when no line matches anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    #[default]
    Auto,
    Timestamped,
    Simple,
}

#[derive(Debug, Clone)]
pub struct ParsedConversation {
    pub messages: Vec<Message>,
    pub stats: ConversationStats,
    pub detected_format: DetectedFormat,
}

pub struct ConversationParser {
    android_re: Regex,
    ios_re: Regex,
    simple_re: Regex,
    lexicon: Arc<Lexicon>,
}

impl ConversationParser {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        // Android: `21.06.2024, 22:14 - Ayşe: Merhaba`
        let android_re = Regex::new(
            r"^(\d{1,2}[./-]\d{1,2}[./-]\d{2,4}),?\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s?[APap][Mm])?)\s+-\s+([^:]+):\s?(.*)$",
        )
        .expect("android export pattern is valid");
        // iOS: `[21.06.2024, 22:14:03] Ayşe: Merhaba`
        let ios_re = Regex::new(
            r"^\[(\d{1,2}[./-]\d{1,2}[./-]\d{2,4}),?\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s?[APap][Mm])?)\]\s+([^:]+):\s?(.*)$",
        )
        .expect("ios export pattern is valid");
        // Simple: `Ayşe: Merhaba` with a bounded sender so prose with a late
        // colon is treated as continuation, not a new speaker.
        let simple_re =
            Regex::new(r"^([^:]{1,64}?):\s?(.*)$").expect("simple pattern is valid");

        Self {
            android_re,
            ios_re,
            simple_re,
            lexicon,
        }
    }

    /// Parse raw export text. Pure function of its input: empty input is a
    /// valid conversation of length zero, never an error.
    pub fn parse(&self, text: &str, hint: FormatHint) -> ParsedConversation {
        if text.trim().is_empty() {
            return ParsedConversation {
                messages: Vec::new(),
                stats: ConversationStats::default(),
                detected_format: DetectedFormat::Empty,
            };
        }

        let format = match hint {
            FormatHint::Timestamped => DetectedFormat::Timestamped,
            FormatHint::Simple => DetectedFormat::Simple,
            FormatHint::Auto => {
                let timestamped = text
                    .lines()
                    .any(|line| self.android_re.is_match(line) || self.ios_re.is_match(line));
                if timestamped {
                    DetectedFormat::Timestamped
                } else {
                    DetectedFormat::Simple
                }
            }
        };

        let messages = match format {
            DetectedFormat::Timestamped => self.parse_timestamped(text),
            DetectedFormat::Simple => self.parse_simple(text),
            DetectedFormat::Empty => Vec::new(),
        };

        let stats = compute_stats(&messages);
        ParsedConversation {
            messages,
            stats,
            detected_format: format,
        }
    }

    fn parse_timestamped(&self, text: &str) -> Vec<Message> {
        let mut messages: Vec<Message> = Vec::new();
        for line in text.lines() {
            if self.is_system_line(line) {
                continue;
            }
            let captures = self
                .android_re
                .captures(line)
                .or_else(|| self.ios_re.captures(line));
            match captures {
                Some(caps) => {
                    let content = caps[4].trim().to_string();
                    if content.is_empty() {
                        continue;
                    }
                    messages.push(Message {
                        sender: caps[3].trim().to_string(),
                        content,
                        timestamp: Some(format!("{}, {}", &caps[1], &caps[2])),
                    });
                }
                // Multi-line message body: append to the previous utterance.
                None => {
                    if let Some(last) = messages.last_mut() {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            last.content.push('\n');
                            last.content.push_str(trimmed);
                        }
                    }
                }
            }
        }
        messages
    }

    fn parse_simple(&self, text: &str) -> Vec<Message> {
        let mut messages: Vec<Message> = Vec::new();
        for line in text.lines() {
            if self.is_system_line(line) {
                continue;
            }
            match self.simple_re.captures(line) {
                Some(caps) => {
                    let sender = caps[1].trim();
                    let content = caps[2].trim();
                    if sender.is_empty() || content.is_empty() {
                        continue;
                    }
                    messages.push(Message {
                        sender: sender.to_string(),
                        content: content.to_string(),
                        timestamp: None,
                    });
                }
                None => {
                    if let Some(last) = messages.last_mut() {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            last.content.push('\n');
                            last.content.push_str(trimmed);
                        }
                    }
                }
            }
        }
        messages
    }

    /// Export artifacts (media placeholders, encryption notices) are dropped
    /// before anything is counted.
    fn is_system_line(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.lexicon
            .system_markers
            .iter()
            .any(|marker| lower.contains(marker.as_str()))
    }
}

/// Recompute aggregate stats from scratch. Percentages sum to 100 across
/// participants up to rounding; an empty message list yields all-zero stats.
pub fn compute_stats(messages: &[Message]) -> ConversationStats {
    let total = messages.len();
    if total == 0 {
        return ConversationStats::default();
    }

    let mut participants: Vec<String> = Vec::new();
    let mut distribution: BTreeMap<String, ParticipantStats> = BTreeMap::new();
    let mut char_totals: BTreeMap<String, usize> = BTreeMap::new();

    for message in messages {
        if !participants.contains(&message.sender) {
            participants.push(message.sender.clone());
        }
        let entry = distribution.entry(message.sender.clone()).or_default();
        entry.message_count += 1;
        entry.total_words += message.content.split_whitespace().count();
        *char_totals.entry(message.sender.clone()).or_default() +=
            message.content.chars().count();
    }

    for (sender, entry) in distribution.iter_mut() {
        let chars = char_totals.get(sender).copied().unwrap_or(0);
        entry.percentage = round1(entry.message_count as f64 / total as f64 * 100.0);
        entry.avg_message_length = round1(chars as f64 / entry.message_count as f64);
    }

    ConversationStats {
        total_messages: total,
        participant_count: participants.len(),
        participants,
        message_distribution: distribution,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ConversationParser {
        ConversationParser::new(Arc::new(Lexicon::builtin()))
    }

    #[test]
    fn test_empty_input_is_a_zero_length_conversation() {
        let parsed = parser().parse("", FormatHint::Auto);
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.stats.total_messages, 0);
        assert_eq!(parsed.stats.participant_count, 0);
        assert_eq!(parsed.detected_format, DetectedFormat::Empty);

        let parsed = parser().parse("   \n\n  ", FormatHint::Simple);
        assert!(parsed.messages.is_empty());
    }

    #[test]
    fn test_simple_format_with_continuation() {
        let text = "Alice: hey there\nhow was your day?\nBob: pretty good";
        let parsed = parser().parse(text, FormatHint::Simple);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[0].sender, "Alice");
        assert_eq!(parsed.messages[0].content, "hey there\nhow was your day?");
        assert_eq!(parsed.messages[1].sender, "Bob");
        assert!(parsed.messages[0].timestamp.is_none());
    }

    #[test]
    fn test_android_export_format() {
        let text = "21.06.2024, 22:14 - Ayşe: Merhaba\n21.06.2024, 22:15 - Ahmet: Selam!";
        let parsed = parser().parse(text, FormatHint::Auto);
        assert_eq!(parsed.detected_format, DetectedFormat::Timestamped);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[0].sender, "Ayşe");
        assert_eq!(
            parsed.messages[0].timestamp.as_deref(),
            Some("21.06.2024, 22:14")
        );
    }

    #[test]
    fn test_ios_export_format() {
        let text = "[21.06.2024, 22:14:03] Ayşe: Merhaba\n[21.06.2024, 22:15:47] Ahmet: Selam";
        let parsed = parser().parse(text, FormatHint::Auto);
        assert_eq!(parsed.detected_format, DetectedFormat::Timestamped);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[1].sender, "Ahmet");
    }

    #[test]
    fn test_auto_falls_back_to_simple() {
        let text = "Alice: no timestamps here\nBob: indeed";
        let parsed = parser().parse(text, FormatHint::Auto);
        assert_eq!(parsed.detected_format, DetectedFormat::Simple);
        assert_eq!(parsed.messages.len(), 2);
    }

    #[test]
    fn test_system_lines_are_dropped() {
        let text = "21.06.2024, 22:14 - Ayşe: <Media omitted>\n\
                    21.06.2024, 22:15 - Ahmet: gördün mü?\n\
                    Messages and calls are end-to-end encrypted. No one outside of this chat can read them.";
        let parsed = parser().parse(text, FormatHint::Auto);
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.messages[0].sender, "Ahmet");
    }

    #[test]
    fn test_stats_distribution() {
        let text = "Alice: one two three\nBob: four\nAlice: five six";
        let parsed = parser().parse(text, FormatHint::Simple);
        let stats = &parsed.stats;
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.participant_count, 2);
        // First-seen order is preserved
        assert_eq!(stats.participants, vec!["Alice", "Bob"]);

        let alice = &stats.message_distribution["Alice"];
        assert_eq!(alice.message_count, 2);
        assert_eq!(alice.total_words, 5);
        let bob = &stats.message_distribution["Bob"];
        assert_eq!(bob.message_count, 1);
        assert_eq!(bob.total_words, 1);

        let pct_sum: f64 = stats
            .message_distribution
            .values()
            .map(|p| p.percentage)
            .sum();
        assert!((pct_sum - 100.0).abs() < 0.5, "Percentages should sum to ~100, got {pct_sum}");
    }

    #[test]
    fn test_stats_recomputed_not_cached() {
        let p = parser();
        let first = p.parse("Alice: hello\nBob: hi", FormatHint::Simple);
        let second = p.parse("Alice: hello", FormatHint::Simple);
        assert_eq!(first.stats.total_messages, 2);
        assert_eq!(second.stats.total_messages, 1);
    }

    #[test]
    fn test_prose_with_late_colon_is_continuation() {
        // The colon sits past the 64-char sender bound, so the line is prose.
        let text = "Alice: reminder\nthe meeting is at the place we talked about last week near the old station: nine sharp";
        let parsed = parser().parse(text, FormatHint::Simple);
        assert_eq!(parsed.messages.len(), 1, "Long pre-colon text is not a sender");
    }
}
