// src/llm/provider/deepseek.rs
// DeepSeek Chat API adapter (OpenAI-compatible wire format).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

use super::LlmProvider;

pub struct DeepSeekProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl DeepSeekProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let start = Instant::now();
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post("https://api.deepseek.com/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("DeepSeek API error {}: {}", status, error_text));
        }

        let raw = response.json::<Value>().await?;
        let content = raw["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("No content in DeepSeek response"))?
            .to_string();

        debug!(
            "DeepSeek generate: model={} latency={}ms",
            self.model,
            start.elapsed().as_millis()
        );
        Ok(content)
    }
}
