// src/error.rs

use thiserror::Error;

/// Pipeline-level failures. Only `NoMessages` is ever surfaced to a caller
/// (as `Report.status == "error"`); provider and cache failures are handled
/// at the orchestrator boundary and never reach here.
#[derive(Debug, Error)]
pub enum RapportError {
    #[error("no messages could be extracted from non-empty input (tried {detected} format); retry with an explicit format hint")]
    NoMessages { detected: String },
}
