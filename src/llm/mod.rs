// src/llm/mod.rs

pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use provider::{build_provider, LlmProvider, ProviderKind};
