//! Execution scorer: run the code, analyze the circuit JSON.
//!
//! The circuit runner is an external service; this scorer only forwards the
//! generated source and interprets the outcome. Score policy:
//!
//! - runner reports an execution error → 0.0
//! - transport failure or timeout → 0.0
//! - executed but produced no circuit JSON → 0.1
//! - circuit JSON produced → 1.0 minus issue penalties (0.3/error,
//!   0.1/warning, floored at 0)

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use circuit_report::{analyze, score_analysis};

use super::{ScoreOutcome, Scorer};

/// Outcome of executing circuit source through a runner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunOutcome {
    /// Compiled circuit JSON, when execution succeeded.
    pub circuit_json: Option<serde_json::Value>,
    /// Execution error message, when the code failed to run.
    pub error: Option<String>,
}

/// Executes circuit source and returns the compiled representation.
#[async_trait]
pub trait CircuitRunner: Send + Sync {
    async fn execute(&self, code: &str) -> Result<RunOutcome>;
}

/// Production runner: POSTs the source to the remote runner service.
pub struct HttpCircuitRunner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCircuitRunner {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client for circuit runner")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl CircuitRunner for HttpCircuitRunner {
    async fn execute(&self, code: &str) -> Result<RunOutcome> {
        let url = format!("{}/execute", self.base_url);
        let body = json!({
            "fs_map": { "index.tsx": code }
        });

        // Single timeout race over the whole exchange, body included: a
        // runner that stalls mid-response must surface as a runtime failure,
        // not hang the suite.
        let exchange = async {
            let response = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Circuit runner request to {url} failed"))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                anyhow::bail!("Circuit runner returned {status}: {detail}");
            }

            response
                .json::<RunOutcome>()
                .await
                .context("Failed to decode circuit runner response")
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| anyhow::anyhow!("Circuit runner timed out after {:?}", self.timeout))?
    }
}

/// Scores generated code by executing it and analyzing the result.
pub struct ExecutionScorer<R> {
    runner: R,
}

impl<R: CircuitRunner> ExecutionScorer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: CircuitRunner> Scorer for ExecutionScorer<R> {
    fn name(&self) -> &'static str {
        "circuit-execution"
    }

    async fn score(&self, _input: &str, output: &str) -> Result<ScoreOutcome> {
        let outcome = match self.runner.execute(output).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("circuit execution failed: {e:#}");
                return Ok(ScoreOutcome {
                    score: 0.0,
                    metadata: json!({
                        "execution_successful": false,
                        "error": format!("{e:#}"),
                        "error_type": "runtime_error",
                        "circuit_json": null,
                        "errors": [],
                        "warnings": [],
                    }),
                });
            }
        };

        if let Some(error) = outcome.error {
            return Ok(ScoreOutcome {
                score: 0.0,
                metadata: json!({
                    "execution_successful": false,
                    "error": error,
                    "error_type": "execution_error",
                    "circuit_json": null,
                    "errors": [],
                    "warnings": [],
                }),
            });
        }

        let Some(circuit_json) = outcome.circuit_json else {
            return Ok(ScoreOutcome {
                score: 0.1,
                metadata: json!({
                    "execution_successful": true,
                    "error": "No circuit JSON generated",
                    "error_type": "no_output",
                    "circuit_json": null,
                    "errors": [],
                    "warnings": [],
                }),
            });
        };

        // A depth-limit trip means the runner handed back something
        // pathological; score it as a hard failure, distinguishably.
        let analysis = match analyze(&circuit_json) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("circuit json analysis failed: {e}");
                return Ok(ScoreOutcome {
                    score: 0.0,
                    metadata: json!({
                        "execution_successful": true,
                        "error": e.to_string(),
                        "error_type": "analysis_error",
                        "circuit_json": null,
                        "errors": [],
                        "warnings": [],
                    }),
                });
            }
        };

        let score = score_analysis(&analysis);
        let total_elements = circuit_json.as_array().map(|a| a.len()).unwrap_or(1);

        info!(
            score,
            errors = analysis.errors.len(),
            warnings = analysis.warnings.len(),
            "circuit executed and analyzed"
        );

        Ok(ScoreOutcome {
            score,
            metadata: json!({
                "execution_successful": true,
                "error": null,
                "error_type": null,
                "circuit_json": circuit_json,
                "errors": analysis.errors,
                "warnings": analysis.warnings,
                "error_count": analysis.errors.len(),
                "warning_count": analysis.warnings.len(),
                "issues_summary": analysis.summary,
                "total_elements": total_elements,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRunner(RunOutcome);

    #[async_trait]
    impl CircuitRunner for FixedRunner {
        async fn execute(&self, _code: &str) -> Result<RunOutcome> {
            Ok(self.0.clone())
        }
    }

    struct FailingRunner;

    #[async_trait]
    impl CircuitRunner for FailingRunner {
        async fn execute(&self, _code: &str) -> Result<RunOutcome> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn clean_circuit_scores_one() {
        let scorer = ExecutionScorer::new(FixedRunner(RunOutcome {
            circuit_json: Some(json!([{ "type": "board", "width": "20mm" }])),
            error: None,
        }));
        let outcome = scorer.score("prompt", "code").await.unwrap();
        assert_eq!(outcome.score, 1.0);
        assert_eq!(outcome.metadata["error_count"], json!(0));
        assert_eq!(outcome.metadata["execution_successful"], json!(true));
    }

    #[tokio::test]
    async fn issues_are_penalized() {
        let scorer = ExecutionScorer::new(FixedRunner(RunOutcome {
            circuit_json: Some(json!([
                { "type": "trace", "error_type": "unconnected", "message": "dangling" },
                { "type": "resistor", "warning_type": "deprecated_prop" }
            ])),
            error: None,
        }));
        let outcome = scorer.score("prompt", "code").await.unwrap();
        assert!((outcome.score - 0.6).abs() < 1e-9);
        assert_eq!(outcome.metadata["error_count"], json!(1));
        assert_eq!(outcome.metadata["warning_count"], json!(1));
        assert_eq!(outcome.metadata["total_elements"], json!(2));
    }

    #[tokio::test]
    async fn execution_error_scores_zero() {
        let scorer = ExecutionScorer::new(FixedRunner(RunOutcome {
            circuit_json: None,
            error: Some("ReferenceError: invalidcomponent".into()),
        }));
        let outcome = scorer.score("prompt", "code").await.unwrap();
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.metadata["error_type"], json!("execution_error"));
    }

    #[tokio::test]
    async fn missing_circuit_json_scores_a_tenth() {
        let scorer = ExecutionScorer::new(FixedRunner(RunOutcome::default()));
        let outcome = scorer.score("prompt", "code").await.unwrap();
        assert!((outcome.score - 0.1).abs() < 1e-9);
        assert_eq!(outcome.metadata["error_type"], json!("no_output"));
    }

    #[tokio::test]
    async fn transport_failure_scores_zero_as_runtime_error() {
        let scorer = ExecutionScorer::new(FailingRunner);
        let outcome = scorer.score("prompt", "code").await.unwrap();
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.metadata["error_type"], json!("runtime_error"));
    }

    #[tokio::test]
    async fn runner_stalling_mid_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // A server that sends headers, starts the body, then stops writing:
        // the timeout must cover the body read, not just the connect.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/json\r\n\
                      content-length: 1000\r\n\r\n\
                      {\"circuit_json\": [",
                )
                .await
                .unwrap();
            // Hold the connection open without writing the rest.
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let runner =
            HttpCircuitRunner::new(&format!("http://{addr}"), Duration::from_millis(250))
                .unwrap();
        let scorer = ExecutionScorer::new(runner);
        let outcome = scorer.score("prompt", "code").await.unwrap();

        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.metadata["error_type"], json!("runtime_error"));
        assert!(outcome.metadata["error"]
            .as_str()
            .unwrap()
            .contains("timed out"));

        server.abort();
    }
}
