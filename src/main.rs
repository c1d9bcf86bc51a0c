// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rapport::cache::connect_cache;
use rapport::lexicon::Lexicon;
use rapport::llm::{build_provider, Orchestrator};
use rapport::{Analyzer, FormatHint, RapportConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Timestamped,
    Simple,
}

impl From<FormatArg> for FormatHint {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => FormatHint::Auto,
            FormatArg::Timestamped => FormatHint::Timestamped,
            FormatArg::Simple => FormatHint::Simple,
        }
    }
}

/// Analyze an exported chat conversation and print the health report as JSON.
#[derive(Parser, Debug)]
#[command(name = "rapport", version, about)]
struct Cli {
    /// Path to the exported conversation text file
    file: PathBuf,

    /// Export format of the input file
    #[arg(long, value_enum, default_value = "auto")]
    format: FormatArg,

    /// Mark the input as already PII-masked by an upstream preprocessor
    #[arg(long)]
    privacy: bool,

    /// Skip LLM augmentation; produce the rule-based report only
    #[arg(long)]
    no_llm: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Override the built-in lexicon tables with a TOML file
    #[arg(long)]
    lexicon: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RapportConfig::from_env();

    let level = config
        .log_level
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting rapport analysis of {}", cli.file.display());

    let lexicon = match cli.lexicon.as_deref().or(config
        .lexicon_path
        .as_deref()
        .map(std::path::Path::new))
    {
        Some(path) => Arc::new(Lexicon::from_path(path)?),
        None => Arc::new(Lexicon::builtin()),
    };

    let orchestrator = if cli.no_llm {
        None
    } else {
        let provider = build_provider(&config);
        let cache = connect_cache(config.redis_url.as_deref(), config.cache_max_entries).await;
        Some(Arc::new(Orchestrator::new(
            provider,
            cache,
            config.orchestrator_settings(),
        )))
    };

    let analyzer = Analyzer::new(lexicon, orchestrator);

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let report = analyzer
        .analyze(&text, cli.format.into(), cli.privacy)
        .await;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");
    Ok(())
}
