// src/lib.rs

pub mod cache;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod llm;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use config::RapportConfig;
pub use error::RapportError;
pub use parser::FormatHint;
pub use pipeline::Analyzer;
pub use report::{Report, ReportStatus};
