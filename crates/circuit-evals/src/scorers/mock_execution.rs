//! Mock execution scorer: deterministic substring checks, no network.
//!
//! Used offline and in CI where neither the runner service nor a model is
//! reachable. The checks and penalties mirror the failure patterns the real
//! execution path reports most often.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::{ScoreOutcome, Scorer};

pub struct MockExecutionScorer;

#[async_trait]
impl Scorer for MockExecutionScorer {
    fn name(&self) -> &'static str {
        "mock-circuit-execution"
    }

    async fn score(&self, _input: &str, output: &str) -> Result<ScoreOutcome> {
        if output.trim().is_empty() {
            return Ok(ScoreOutcome {
                score: 0.0,
                metadata: json!({
                    "execution_successful": false,
                    "mock_execution": true,
                    "error": "No output provided",
                    "errors": ["No output provided"],
                    "warnings": [],
                }),
            });
        }

        let mut score: f64 = 1.0;
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        if output.contains("invalidcomponent") {
            errors.push("Invalid component detected: invalidcomponent".into());
            score -= 0.5;
        }
        if output.contains(r#"resistance="invalid""#) {
            errors.push("Invalid resistance value: invalid".into());
            score -= 0.3;
        }
        if !output.contains("export default") {
            errors.push("Missing export default".into());
            score -= 0.2;
        }
        if !output.contains("<board") {
            errors.push("Missing board element".into());
            score -= 0.4;
        }
        if output.contains("pcbX") || output.contains("pcbY") {
            warnings.push("Using deprecated pcbX/pcbY coordinates".into());
            score -= 0.1;
        }

        let score = score.max(0.0);

        Ok(ScoreOutcome {
            score,
            metadata: json!({
                "execution_successful": true,
                "mock_execution": true,
                "errors": errors,
                "warnings": warnings,
                "error_count": errors.len(),
                "warning_count": warnings.len(),
                "rationale": format!(
                    "Mock execution completed. Found {} errors and {} warnings.",
                    errors.len(),
                    warnings.len()
                ),
            }),
        })
    }
}
