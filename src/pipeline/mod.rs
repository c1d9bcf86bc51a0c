// src/pipeline/mod.rs
// The analysis entry point: raw export text in, complete Report out.
//
// All collaborators are injected at construction; requests are independent
// synchronous units of work with the provider call as the only suspension
// point. A caller always receives a schema-valid Report within the provider
// timeout bound, degraded to rule-based content when augmentation fails.

use std::sync::Arc;
use tracing::{debug, info};

use crate::lexicon::Lexicon;
use crate::llm::Orchestrator;
use crate::metrics::{score_all, ConflictTuning};
use crate::parser::{ConversationParser, FormatHint};
use crate::report::{aggregate, Report, ReportMetadata};

pub struct Analyzer {
    lexicon: Arc<Lexicon>,
    parser: ConversationParser,
    tuning: ConflictTuning,
    orchestrator: Option<Arc<Orchestrator>>,
}

impl Analyzer {
    pub fn new(lexicon: Arc<Lexicon>, orchestrator: Option<Arc<Orchestrator>>) -> Self {
        Self {
            parser: ConversationParser::new(lexicon.clone()),
            lexicon,
            tuning: ConflictTuning::default(),
            orchestrator,
        }
    }

    pub fn with_tuning(mut self, tuning: ConflictTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Analyze one conversation. `privacy_mode` records that the caller
    /// already masked PII; the pipeline does not transform the text itself.
    pub async fn analyze(&self, text: &str, hint: FormatHint, privacy_mode: bool) -> Report {
        let parsed = self.parser.parse(text, hint);
        let metadata =
            ReportMetadata::new(text.chars().count(), parsed.detected_format, privacy_mode);

        // Non-empty input from which nothing could be extracted is the one
        // caller-visible failure; an empty conversation is a valid zero case.
        if parsed.messages.is_empty() && !text.trim().is_empty() {
            info!(
                "Analysis failed: no messages in {} chars of input (format: {})",
                metadata.text_length,
                parsed.detected_format.as_str()
            );
            return Report::parse_error(
                crate::error::RapportError::NoMessages {
                    detected: parsed.detected_format.as_str().to_string(),
                }
                .to_string(),
                metadata,
            );
        }

        // Scorers see message bodies only, never senders or timestamps.
        let body = parsed
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let metrics = score_all(&body, &parsed.stats, &self.lexicon, &self.tuning);
        let mut report = aggregate(metrics.clone(), parsed.stats, metadata);

        if let Some(orchestrator) = &self.orchestrator {
            report.insights = orchestrator
                .insights(&metrics, &report.conversation_stats, report.insights)
                .await;
            report.recommendations = orchestrator
                .recommendations(&metrics, &report.conversation_stats, report.recommendations)
                .await;
            report.summary = orchestrator
                .enhance_summary(&metrics, report.summary)
                .await;
        } else {
            debug!("No orchestrator configured; report is rule-based only");
        }

        info!(
            "Report ready: {} messages, {} participants, overall {:.1}/10",
            report.conversation_stats.total_messages,
            report.conversation_stats.participant_count,
            report.overall_score
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DetectedFormat;
    use crate::report::ReportStatus;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(Lexicon::builtin()), None)
    }

    #[tokio::test]
    async fn test_empty_input_is_success() {
        let report = analyzer().analyze("", FormatHint::Auto, false).await;
        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(report.conversation_stats.total_messages, 0);
        // Neutral defaults, not errors
        let metrics = report.metrics.unwrap();
        assert_eq!(metrics.sentiment.score, 50.0);
        assert_eq!(metrics.empathy.score, 0.0);
    }

    #[tokio::test]
    async fn test_unparseable_input_is_error_status() {
        let report = analyzer()
            .analyze("just some prose without any sender markers whatsoever, and more of it, line after line without a colon near the front of any line because every line is written as running text", FormatHint::Auto, false)
            .await;
        assert_eq!(report.status, ReportStatus::Error);
        assert!(report.error.is_some());
        assert!(report.metrics.is_none());
    }

    #[tokio::test]
    async fn test_privacy_flag_recorded() {
        let report = analyzer()
            .analyze("Alice: hello\nBob: hi", FormatHint::Simple, true)
            .await;
        assert!(report.metadata.privacy_mode);
        assert_eq!(report.metadata.detected_format, DetectedFormat::Simple);
    }
}
