//! AI circuit validator: LLM-as-judge with boolean defect flags.
//!
//! The judge model returns a JSON object of ten defect flags plus a
//! rationale; the score is the fraction of flags that came back clean.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::client::{ChatBackend, ChatMessage, ChatRequest};
use crate::codegen::parse_codefence;
use crate::prompts::validator_prompt;

use super::{ScoreOutcome, Scorer};

/// The judge's verdict. Each flag is true when the defect is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub has_invalid_element: bool,
    pub uses_xy_coordinates: bool,
    pub missing_connection: bool,
    pub has_syntax_errors: bool,
    pub improper_component_usage: bool,
    pub missing_required_props: bool,
    pub invalid_footprint: bool,
    pub improper_trace_connections: bool,
    pub uses_deprecated_syntax: bool,
    pub has_logical_errors: bool,
    #[serde(default)]
    pub rationale: String,
}

impl ValidationFlags {
    fn defects(&self) -> [bool; 10] {
        [
            self.has_invalid_element,
            self.uses_xy_coordinates,
            self.missing_connection,
            self.has_syntax_errors,
            self.improper_component_usage,
            self.missing_required_props,
            self.invalid_footprint,
            self.improper_trace_connections,
            self.uses_deprecated_syntax,
            self.has_logical_errors,
        ]
    }

    /// Fraction of clean flags in `[0, 1]`.
    pub fn score(&self) -> f64 {
        let defects = self.defects();
        let clean = defects.iter().filter(|&&flagged| !flagged).count();
        clean as f64 / defects.len() as f64
    }

    pub fn issues_found(&self) -> usize {
        self.defects().iter().filter(|&&flagged| flagged).count()
    }
}

/// Parse the judge reply, tolerating a code fence around the JSON object.
pub fn parse_verdict(reply: &str) -> Result<ValidationFlags> {
    let candidate = parse_codefence(reply);
    serde_json::from_str(&candidate)
        .with_context(|| format!("Judge reply is not a valid verdict: {candidate}"))
}

pub struct AiCircuitValidator {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl AiCircuitValidator {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Scorer for AiCircuitValidator {
    fn name(&self) -> &'static str {
        "ai-circuit-validator"
    }

    async fn score(&self, input: &str, output: &str) -> Result<ScoreOutcome> {
        let mut request = ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::user(validator_prompt(input, output))],
        );
        request.json_response = true;

        let response = self
            .backend
            .chat(request)
            .await
            .context("AI validator request failed")?;
        let verdict = parse_verdict(&response.content)?;

        let score = verdict.score();
        info!(
            score,
            issues = verdict.issues_found(),
            "ai validation complete"
        );

        Ok(ScoreOutcome {
            score,
            metadata: json!({
                "validation_flags": {
                    "has_invalid_element": verdict.has_invalid_element,
                    "uses_xy_coordinates": verdict.uses_xy_coordinates,
                    "missing_connection": verdict.missing_connection,
                    "has_syntax_errors": verdict.has_syntax_errors,
                    "improper_component_usage": verdict.improper_component_usage,
                    "missing_required_props": verdict.missing_required_props,
                    "invalid_footprint": verdict.invalid_footprint,
                    "improper_trace_connections": verdict.improper_trace_connections,
                    "uses_deprecated_syntax": verdict.uses_deprecated_syntax,
                    "has_logical_errors": verdict.has_logical_errors,
                },
                "rationale": verdict.rationale,
                "issues_found": verdict.issues_found(),
                "total_checks": 10,
            }),
        })
    }
}
