//! End-to-end harness tests through the public API — no network, no model.
//!
//! Chat backends are canned; execution goes through the mock backend or a
//! stub `CircuitRunner`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use circuit_evals::client::{ChatBackend, ChatRequest, ChatResponse};
use circuit_evals::codegen::GenerationOptions;
use circuit_evals::config::{EvalConfig, ExecutionBackend};
use circuit_evals::runner::EvalRunner;
use circuit_evals::scorers::{CircuitRunner, ExecutionScorer, RunOutcome, Scorer};
use circuit_evals::suite::EvalSuite;

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

/// Runner stub that compiles any source into a fixed circuit JSON.
struct StubRunner(serde_json::Value);

#[async_trait]
impl CircuitRunner for StubRunner {
    async fn execute(&self, _code: &str) -> Result<RunOutcome> {
        Ok(RunOutcome {
            circuit_json: Some(self.0.clone()),
            error: None,
        })
    }
}

fn runner_with_reply(reply: &str) -> EvalRunner {
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
async fn toml_suite_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suite.toml");
    std::fs::write(
        &path,
        r#"
name = "toml-smoke"
scorers = ["mock-execution"]

[[cases]]
prompt = "Generate a minimal board"
"#,
    )
    .unwrap();

    let suite = EvalSuite::load(&path).unwrap();
    let reply = "```tsx\nexport default () => (\n  <board width=\"10mm\" height=\"10mm\" />\n)\n```";
    let report = runner_with_reply(reply).run_suite(&suite).await.unwrap();

    assert_eq!(report.suite, "toml-smoke");
    assert_eq!(report.cases.len(), 1);
    assert!(report.cases[0].generated);
    assert_eq!(report.cases[0].score, 1.0);
    assert!(report.cases[0].snippet_url.contains("snippet_code="));
}

#[tokio::test]
async fn execution_scorer_flows_issues_into_metadata() {
    // Circuit with a nested error element: the analysis path must be fully
    // qualified and the penalty reflected in the score.
    let circuit_json = serde_json::json!([
        { "type": "board", "width": "20mm" },
        {
            "type": "source_group",
            "members": [
                {
                    "type": "pcb_trace",
                    "error_type": "pcb_trace_error",
                    "error_message": "trace overlaps keepout"
                }
            ]
        }
    ]);

    let scorer = ExecutionScorer::new(StubRunner(circuit_json));
    let outcome = scorer.score("prompt", "code").await.unwrap();

    assert!((outcome.score - 0.7).abs() < 1e-9);
    let errors = outcome.metadata["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["path"], "root[1].members[0]");
    assert_eq!(errors[0]["message"], "trace overlaps keepout");
    assert_eq!(
        outcome.metadata["issues_summary"],
        "pcb_trace_error: trace overlaps keepout"
    );
}

#[tokio::test]
async fn validator_report_carries_judge_rationale() {
    let verdict = serde_json::json!({
        "has_invalid_element": true,
        "uses_xy_coordinates": false,
        "missing_connection": false,
        "has_syntax_errors": false,
        "improper_component_usage": false,
        "missing_required_props": false,
        "invalid_footprint": false,
        "improper_trace_connections": false,
        "uses_deprecated_syntax": false,
        "has_logical_errors": false,
        "rationale": "fakecomponent is not a tscircuit element"
    })
    .to_string();

    let runner = runner_with_reply(&verdict);
    let suite_toml = r#"
name = "judge-smoke"
scorers = ["ai-validator"]

[[cases]]
prompt = "Create an invalid circuit"
expected = "export default () => (<board><fakecomponent /></board>)"
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("judge.toml");
    std::fs::write(&path, suite_toml).unwrap();

    let suite = EvalSuite::load(&path).unwrap();
    let report = runner.run_suite(&suite).await.unwrap();

    let entry = &report.cases[0].scores[0];
    assert_eq!(entry.scorer, "ai-circuit-validator");
    assert!((entry.score - 0.9).abs() < 1e-9);
    assert_eq!(
        entry.metadata["rationale"],
        "fakecomponent is not a tscircuit element"
    );
    assert_eq!(entry.metadata["issues_found"], 1);
}
