// src/llm/provider/mod.rs
// LLM provider trait and adapter selection for multi-provider support.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub mod claude;
pub mod deepseek;
pub mod openai;

pub use claude::ClaudeProvider;
pub use deepseek::DeepSeekProvider;
pub use openai::OpenAiProvider;

use crate::config::RapportConfig;

/// Minimal capability surface every provider adapter implements. The
/// orchestrator is polymorphic over this and carries no provider-specific
/// behavior of its own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Whether the adapter is configured well enough to attempt a call.
    /// Checked before any network I/O.
    fn is_available(&self) -> bool;

    /// One-shot text generation.
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}

/// Which adapter the configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Claude,
    DeepSeek,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" | "gpt" => Some(ProviderKind::OpenAi),
            "claude" | "anthropic" => Some(ProviderKind::Claude),
            "deepseek" => Some(ProviderKind::DeepSeek),
            _ => None,
        }
    }
}

/// Construct the configured adapter. Selection happens here, once, at
/// construction time; call sites never branch on the provider.
pub fn build_provider(config: &RapportConfig) -> Arc<dyn LlmProvider> {
    let kind = ProviderKind::parse(&config.llm_provider).unwrap_or(ProviderKind::OpenAi);
    let timeout = config.provider_timeout();
    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            timeout,
        )),
        ProviderKind::Claude => Arc::new(ClaudeProvider::new(
            config.anthropic_api_key.clone(),
            config.anthropic_model.clone(),
            timeout,
        )),
        ProviderKind::DeepSeek => Arc::new(DeepSeekProvider::new(
            config.deepseek_api_key.clone(),
            config.deepseek_model.clone(),
            timeout,
        )),
    };
    info!(
        "LLM provider: {} (available: {})",
        provider.name(),
        provider.is_available()
    );
    provider
}
