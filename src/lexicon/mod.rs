// src/lexicon/mod.rs
// Versioned lexicon tables consumed by the metric scorers.
//
// Scoring logic never embeds word lists; everything comes through this module
// so lexicons can be audited, tested, and swapped without touching the scorers.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Built-in tables shipped with the crate (English + Turkish).
const DEFAULT_LEXICONS: &str = include_str!("default_lexicons.toml");

/// Raw on-disk shape of a lexicon file.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    version: String,
    sentiment: SentimentTable,
    empathy: EmpathyTable,
    conflict: ConflictTable,
    pronouns: PronounTable,
    system_markers: MarkerTable,
}

#[derive(Debug, Deserialize)]
struct SentimentTable {
    positive: Vec<String>,
    negative: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmpathyTable {
    phrases: Vec<String>,
    emoji: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ConflictTable {
    indicators: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PronounTable {
    collective: Vec<String>,
    singular: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MarkerTable {
    contains: Vec<String>,
}

/// Compiled lexicon: single-token tables become hash sets, multi-word
/// phrases and markers stay as lowercase substrings.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub version: String,
    pub positive_words: HashSet<String>,
    pub negative_words: HashSet<String>,
    pub empathy_phrases: Vec<String>,
    pub empathy_emoji: Vec<String>,
    pub conflict_indicators: HashSet<String>,
    pub collective_pronouns: HashSet<String>,
    pub singular_pronouns: HashSet<String>,
    pub system_markers: Vec<String>,
}

impl Lexicon {
    /// Load the built-in tables. Infallible at runtime: the embedded TOML is
    /// validated by tests, so a parse failure here is a build defect.
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_LEXICONS)
            .unwrap_or_else(|e| panic!("embedded lexicon tables are invalid: {e}"))
    }

    /// Load lexicon tables from an external TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse lexicon file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(raw).context("Invalid lexicon TOML")?;
        let lexicon = Self {
            version: file.version,
            positive_words: to_token_set(file.sentiment.positive),
            negative_words: to_token_set(file.sentiment.negative),
            empathy_phrases: to_lowercase(file.empathy.phrases),
            empathy_emoji: file.empathy.emoji,
            conflict_indicators: to_token_set(file.conflict.indicators),
            collective_pronouns: to_token_set(file.pronouns.collective),
            singular_pronouns: to_token_set(file.pronouns.singular),
            system_markers: to_lowercase(file.system_markers.contains),
        };
        info!(
            "Lexicon v{} loaded ({} positive, {} negative, {} empathy phrases, {} conflict indicators)",
            lexicon.version,
            lexicon.positive_words.len(),
            lexicon.negative_words.len(),
            lexicon.empathy_phrases.len(),
            lexicon.conflict_indicators.len()
        );
        Ok(lexicon)
    }
}

fn to_token_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}

fn to_lowercase(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.to_lowercase()).collect()
}
