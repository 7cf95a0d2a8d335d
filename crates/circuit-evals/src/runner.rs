//! Suite execution and reporting.
//!
//! The runner owns the chat backends and the execution-backend choice. For
//! each case it either scores the fixture body directly or generates code
//! from the prompt first, then runs every scorer the suite asks for and
//! folds the results into a report.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::client::{ChatBackend, ChatClient};
use crate::codegen::{generate_circuit, GeneratedCircuit, GenerationOptions};
use crate::config::{EvalConfig, ExecutionBackend};
use crate::prompts::PROMPT_VERSION;
use crate::scorers::{
    AiCircuitValidator, ExecutionScorer, HttpCircuitRunner, MockExecutionScorer, Scorer,
};
use crate::snippet::create_snippet_url;
use crate::suite::{EvalSuite, ScorerKind};

/// One scorer's entry in a case report.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEntry {
    pub scorer: String,
    pub score: f64,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub prompt: String,
    pub code: String,
    pub snippet_url: String,
    /// False for fixture cases (expected body scored directly).
    pub generated: bool,
    pub elapsed_ms: u64,
    pub scores: Vec<ScoreEntry>,
    /// Mean across this case's scorers.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub prompt_version: String,
    pub started_at: DateTime<Utc>,
    pub cases: Vec<CaseReport>,
    /// Mean across case scores.
    pub mean_score: f64,
}

impl SuiteReport {
    /// Human-readable summary for terminal output.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "suite: {}  (started {})\n",
            self.suite,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        for case in &self.cases {
            out.push_str(&format!("\n  {}  [{:.2}]\n", case.prompt, case.score));
            for entry in &case.scores {
                out.push_str(&format!("    {:<24} {:.2}\n", entry.scorer, entry.score));
            }
            out.push_str(&format!("    snippet: {}\n", case.snippet_url));
        }
        out.push_str(&format!("\nmean score: {:.2}\n", self.mean_score));
        out
    }
}

/// Runs eval suites with a fixed configuration and backend choice.
pub struct EvalRunner {
    config: EvalConfig,
    backend: ExecutionBackend,
    generation: Arc<dyn ChatBackend>,
    judge: Arc<dyn ChatBackend>,
    options: GenerationOptions,
}

impl EvalRunner {
    pub fn new(
        config: EvalConfig,
        backend: ExecutionBackend,
        options: GenerationOptions,
    ) -> Result<Self> {
        let generation: Arc<dyn ChatBackend> = Arc::new(
            ChatClient::new(&config.generation, config.request_timeout)
                .context("Failed to build generation client")?,
        );
        let judge: Arc<dyn ChatBackend> = Arc::new(
            ChatClient::new(&config.judge, config.request_timeout)
                .context("Failed to build judge client")?,
        );
        Ok(Self::with_backends(
            config, backend, options, generation, judge,
        ))
    }

    /// Construct with explicit chat backends (tests inject canned ones).
    pub fn with_backends(
        config: EvalConfig,
        backend: ExecutionBackend,
        options: GenerationOptions,
        generation: Arc<dyn ChatBackend>,
        judge: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            config,
            backend,
            generation,
            judge,
            options,
        }
    }

    fn build_scorers(&self, kinds: &[ScorerKind]) -> Result<Vec<Box<dyn Scorer>>> {
        let mut scorers: Vec<Box<dyn Scorer>> = Vec::new();
        for kind in kinds {
            match (kind, self.backend) {
                (ScorerKind::Execution, ExecutionBackend::Remote) => {
                    let runner = HttpCircuitRunner::new(
                        &self.config.runner_url,
                        self.config.request_timeout,
                    )?;
                    scorers.push(Box::new(ExecutionScorer::new(runner)));
                }
                (ScorerKind::Execution, ExecutionBackend::Mock)
                | (ScorerKind::MockExecution, _) => {
                    scorers.push(Box::new(MockExecutionScorer));
                }
                (ScorerKind::AiValidator, _) => {
                    scorers.push(Box::new(AiCircuitValidator::new(
                        self.judge.clone(),
                        self.config.judge.model.clone(),
                    )));
                }
            }
        }
        Ok(scorers)
    }

    pub async fn run_suite(&self, suite: &EvalSuite) -> Result<SuiteReport> {
        let started_at = Utc::now();
        let scorers = self.build_scorers(&suite.scorers)?;
        let mut cases = Vec::with_capacity(suite.cases.len());

        info!(suite = %suite.name, cases = suite.cases.len(), "running eval suite");

        for case in &suite.cases {
            let started = Instant::now();

            // A failed case must not abort the suite: the remaining cases
            // (and everything already scored) still make it into the report.
            let (circuit, generated) = match &case.expected {
                Some(expected) => (
                    GeneratedCircuit {
                        code: expected.clone(),
                        raw_response: expected.clone(),
                        snippet_url: create_snippet_url(expected),
                    },
                    false,
                ),
                None => {
                    match generate_circuit(self.generation.as_ref(), &self.options, &case.prompt)
                        .await
                    {
                        Ok(circuit) => (circuit, true),
                        Err(e) => {
                            warn!(prompt = %case.prompt, "generation failed: {e:#}");
                            cases.push(CaseReport {
                                prompt: case.prompt.clone(),
                                code: String::new(),
                                snippet_url: String::new(),
                                generated: true,
                                elapsed_ms: started.elapsed().as_millis() as u64,
                                scores: vec![ScoreEntry {
                                    scorer: "generation".to_string(),
                                    score: 0.0,
                                    metadata: json!({
                                        "failed": true,
                                        "error": format!("{e:#}"),
                                    }),
                                }],
                                score: 0.0,
                            });
                            continue;
                        }
                    }
                }
            };

            let mut scores = Vec::with_capacity(scorers.len());
            for scorer in &scorers {
                let entry = match scorer.score(&case.prompt, &circuit.code).await {
                    Ok(outcome) => ScoreEntry {
                        scorer: scorer.name().to_string(),
                        score: outcome.score,
                        metadata: outcome.metadata,
                    },
                    Err(e) => {
                        warn!(scorer = scorer.name(), "scorer failed: {e:#}");
                        ScoreEntry {
                            scorer: scorer.name().to_string(),
                            score: 0.0,
                            metadata: json!({
                                "failed": true,
                                "error": format!("{e:#}"),
                            }),
                        }
                    }
                };
                scores.push(entry);
            }

            let score = mean(scores.iter().map(|entry| entry.score));
            info!(prompt = %case.prompt, score, "case scored");

            cases.push(CaseReport {
                prompt: case.prompt.clone(),
                code: circuit.code,
                snippet_url: circuit.snippet_url,
                generated,
                elapsed_ms: started.elapsed().as_millis() as u64,
                scores,
                score,
            });
        }

        let mean_score = mean(cases.iter().map(|case| case.score));
        Ok(SuiteReport {
            suite: suite.name.clone(),
            prompt_version: PROMPT_VERSION.to_string(),
            started_at,
            cases,
            mean_score,
        })
    }
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatRequest, ChatResponse};
    use crate::suite::{builtin_suite, EvalCase};
    use async_trait::async_trait;

    struct CannedBackend(String);

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: self.0.clone(),
                usage: Default::default(),
            })
        }
    }

    fn mock_runner(reply: &str) -> EvalRunner {
        let backend = Arc::new(CannedBackend(reply.to_string()));
        EvalRunner::with_backends(
            EvalConfig::default(),
            ExecutionBackend::Mock,
            GenerationOptions {
                model: "test-model".into(),
                reasoning_effort: None,
            },
            backend.clone(),
            backend,
        )
    }

    #[tokio::test]
    async fn demo_suite_runs_offline() {
        let runner = mock_runner("unused");
        let suite = builtin_suite("demo").unwrap();
        let report = runner.run_suite(&suite).await.unwrap();

        assert_eq!(report.cases.len(), 3);
        assert!(report.cases.iter().all(|case| !case.generated));
        // Well-formed timer fixture: clean. Invalid fixture: component +
        // resistance penalties. Deprecated-coords fixture: one warning.
        assert_eq!(report.cases[0].score, 1.0);
        assert!((report.cases[1].score - 0.2).abs() < 1e-9);
        assert!((report.cases[2].score - 0.9).abs() < 1e-9);
        assert!((report.mean_score - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn live_case_generates_before_scoring() {
        let reply = "```tsx\nexport default () => (\n  <board width=\"20mm\" height=\"20mm\" />\n)\n```";
        let runner = mock_runner(reply);
        let suite = builtin_suite("555-timer").unwrap();
        let report = runner.run_suite(&suite).await.unwrap();

        assert_eq!(report.cases.len(), 1);
        let case = &report.cases[0];
        assert!(case.generated);
        assert!(case.code.starts_with("export default"));
        // Mock execution backend: has export default and <board, no defects.
        assert_eq!(case.score, 1.0);
    }

    #[tokio::test]
    async fn report_renders_a_table() {
        let runner = mock_runner("unused");
        let suite = builtin_suite("demo").unwrap();
        let report = runner.run_suite(&suite).await.unwrap();

        let table = report.render_table();
        assert!(table.contains("suite: demo"));
        assert!(table.contains("mock-circuit-execution"));
        assert!(table.contains("mean score: 0.70"));
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
    }

    #[tokio::test]
    async fn unparseable_judge_reply_fails_the_entry_not_the_suite() {
        // The judge answers prose instead of a verdict object: the validator
        // entry scores 0 with the error recorded, the mock entry still
        // scores, and both cases survive into the report.
        let runner = mock_runner("Looks fine to me!");
        let suite = EvalSuite {
            name: "judge-prose".into(),
            scorers: vec![ScorerKind::MockExecution, ScorerKind::AiValidator],
            cases: vec![
                EvalCase {
                    prompt: "good fixture".into(),
                    expected: Some(
                        "export default () => (\n  <board width=\"10mm\" height=\"10mm\" />\n)"
                            .into(),
                    ),
                },
                EvalCase {
                    prompt: "bad fixture".into(),
                    expected: Some("not even close".into()),
                },
            ],
        };

        let report = runner.run_suite(&suite).await.unwrap();
        assert_eq!(report.cases.len(), 2);

        for case in &report.cases {
            let validator = &case.scores[1];
            assert_eq!(validator.scorer, "ai-circuit-validator");
            assert_eq!(validator.score, 0.0);
            assert_eq!(validator.metadata["failed"], serde_json::json!(true));
            assert!(validator.metadata["error"]
                .as_str()
                .unwrap()
                .contains("not a valid verdict"));
        }

        // The mock scorer ran normally on both cases.
        assert_eq!(report.cases[0].scores[0].score, 1.0);
        // Missing export default and board: 1.0 - 0.2 - 0.4.
        assert!((report.cases[1].scores[0].score - 0.4).abs() < 1e-9);
    }

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn generation_failure_is_recorded_and_later_cases_run() {
        let backend = Arc::new(FailingBackend);
        let runner = EvalRunner::with_backends(
            EvalConfig::default(),
            ExecutionBackend::Mock,
            GenerationOptions {
                model: "test-model".into(),
                reasoning_effort: None,
            },
            backend.clone(),
            backend,
        );

        let suite = EvalSuite {
            name: "gen-failure".into(),
            scorers: vec![ScorerKind::MockExecution],
            cases: vec![
                EvalCase {
                    prompt: "live case that cannot generate".into(),
                    expected: None,
                },
                EvalCase {
                    prompt: "fixture case".into(),
                    expected: Some(
                        "export default () => (\n  <board width=\"10mm\" height=\"10mm\" />\n)"
                            .into(),
                    ),
                },
            ],
        };

        let report = runner.run_suite(&suite).await.unwrap();
        assert_eq!(report.cases.len(), 2);

        let failed = &report.cases[0];
        assert_eq!(failed.score, 0.0);
        assert_eq!(failed.scores[0].scorer, "generation");
        assert!(failed.scores[0].metadata["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));

        assert_eq!(report.cases[1].score, 1.0);
        assert!((report.mean_score - 0.5).abs() < 1e-9);
    }
}
