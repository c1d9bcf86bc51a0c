// src/config/mod.rs
// All tunables come from the environment (.env supported); nothing here is a
// process-wide singleton. `RapportConfig::from_env()` is called once at
// startup and the value is passed into whatever needs it.

use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct RapportConfig {
    // ── LLM provider selection
    pub llm_provider: String,
    pub llm_max_tokens: usize,
    pub llm_call_timeout_secs: u64,
    pub prompt_version: String,

    // ── Provider credentials/endpoints
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub deepseek_api_key: String,
    pub deepseek_model: String,

    // ── Cache
    pub redis_url: Option<String>,
    pub cache_long_ttl_secs: u64,
    pub cache_short_ttl_secs: u64,
    pub cache_max_entries: usize,

    // ── Lexicons
    pub lexicon_path: Option<String>,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Values may carry inline comments and stray whitespace
            let clean = val.split('#').next().unwrap_or("").trim();
            clean.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RapportConfig {
    pub fn from_env() -> Self {
        // A missing .env file is fine; plain env vars still apply.
        let _ = dotenvy::dotenv();

        Self {
            llm_provider: env_var_or("RAPPORT_LLM_PROVIDER", "openai".to_string()),
            llm_max_tokens: env_var_or("RAPPORT_LLM_MAX_TOKENS", 700),
            llm_call_timeout_secs: env_var_or("RAPPORT_LLM_TIMEOUT_SECS", 20),
            prompt_version: env_var_or(
                "RAPPORT_PROMPT_VERSION",
                crate::llm::prompt::PROMPT_VERSION.to_string(),
            ),
            openai_api_key: env_var_or("OPENAI_API_KEY", String::new()),
            openai_base_url: env_var_or(
                "OPENAI_BASE_URL",
                "https://api.openai.com".to_string(),
            ),
            openai_model: env_var_or("RAPPORT_OPENAI_MODEL", "gpt-4o-mini".to_string()),
            anthropic_api_key: env_var_or("ANTHROPIC_API_KEY", String::new()),
            anthropic_model: env_var_or(
                "RAPPORT_ANTHROPIC_MODEL",
                "claude-3-5-haiku-latest".to_string(),
            ),
            deepseek_api_key: env_var_or("DEEPSEEK_API_KEY", String::new()),
            deepseek_model: env_var_or("RAPPORT_DEEPSEEK_MODEL", "deepseek-chat".to_string()),
            redis_url: env_var_opt("RAPPORT_REDIS_URL"),
            cache_long_ttl_secs: env_var_or("RAPPORT_CACHE_LONG_TTL_SECS", 3600),
            cache_short_ttl_secs: env_var_or("RAPPORT_CACHE_SHORT_TTL_SECS", 1800),
            cache_max_entries: env_var_or("RAPPORT_CACHE_MAX_ENTRIES", 1000),
            lexicon_path: env_var_opt("RAPPORT_LEXICON_PATH"),
            log_level: env_var_or("RAPPORT_LOG_LEVEL", "info".to_string()),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_call_timeout_secs)
    }

    pub fn orchestrator_settings(&self) -> crate::llm::OrchestratorSettings {
        crate::llm::OrchestratorSettings {
            long_ttl: Duration::from_secs(self.cache_long_ttl_secs),
            short_ttl: Duration::from_secs(self.cache_short_ttl_secs),
            call_timeout: self.provider_timeout(),
            max_tokens: self.llm_max_tokens,
            prompt_version: self.prompt_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RapportConfig::from_env();
        assert_eq!(config.llm_provider, "openai");
        assert!(config.cache_long_ttl_secs > config.cache_short_ttl_secs);
        assert!(config.llm_max_tokens > 0);
    }

    #[test]
    fn test_orchestrator_settings_mapping() {
        let config = RapportConfig::from_env();
        let settings = config.orchestrator_settings();
        assert_eq!(settings.long_ttl.as_secs(), config.cache_long_ttl_secs);
        assert_eq!(settings.call_timeout.as_secs(), config.llm_call_timeout_secs);
    }

    #[test]
    fn test_env_var_or_strips_comments() {
        std::env::set_var("RAPPORT_TEST_VALUE", "42 # answer");
        assert_eq!(env_var_or::<u64>("RAPPORT_TEST_VALUE", 0), 42);
        std::env::remove_var("RAPPORT_TEST_VALUE");
    }
}
