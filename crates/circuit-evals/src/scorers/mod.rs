//! Scoring surface shared by all evals.
//!
//! A scorer takes the eval input (the prompt) and the output (generated
//! circuit code) and returns a score in `[0, 1]` plus free-form metadata
//! for the report.

use anyhow::Result;
use async_trait::async_trait;

pub mod ai_validator;
pub mod execution;
pub mod mock_execution;

pub use ai_validator::AiCircuitValidator;
pub use execution::{CircuitRunner, ExecutionScorer, HttpCircuitRunner, RunOutcome};
pub use mock_execution::MockExecutionScorer;

/// One scorer's verdict on one case.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    /// Score in `[0.0, 1.0]`.
    pub score: f64,
    /// Scorer-specific detail, embedded verbatim in the report.
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score `output` (generated circuit code) for `input` (the prompt).
    async fn score(&self, input: &str, output: &str) -> Result<ScoreOutcome>;
}
