use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

/// One OpenAI-compatible endpoint plus the model served there.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

/// Which execution backend scores generated code.
///
/// Passed explicitly from the CLI down to whoever builds the scorer set —
/// scorers never consult process-wide state to pick a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionBackend {
    /// POST code to the remote circuit runner service and analyze the
    /// circuit JSON it returns.
    Remote,
    /// Deterministic substring checks, no network. Useful offline and in CI.
    Mock,
}

/// Top-level harness configuration.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Generation model (writes circuit code from prompts).
    pub generation: Endpoint,
    /// Judge model (AI circuit validator).
    pub judge: Endpoint,
    /// Circuit runner service base URL (compiles/executes generated code).
    pub runner_url: String,
    /// Per-request timeout for generation, judging, and execution calls.
    pub request_timeout: Duration,
}

impl Default for EvalConfig {
    fn default() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        Self {
            generation: Endpoint {
                url: std::env::var("CIRCUIT_EVALS_OPENAI_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
                api_key: api_key.clone(),
                model: std::env::var("CIRCUIT_EVALS_MODEL").unwrap_or_else(|_| "gpt-5-nano".into()),
            },
            judge: Endpoint {
                url: std::env::var("CIRCUIT_EVALS_JUDGE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
                api_key,
                model: std::env::var("CIRCUIT_EVALS_JUDGE_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".into()),
            },
            runner_url: std::env::var("CIRCUIT_RUNNER_URL")
                .unwrap_or_else(|_| "http://localhost:3020".into()),
            request_timeout: Duration::from_secs(
                std::env::var("CIRCUIT_EVALS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// Check if an OpenAI-compatible endpoint is reachable (GET /models).
pub async fn check_endpoint(url: &str, api_key: &str) -> bool {
    let models_url = format!("{url}/models");
    match reqwest::Client::new()
        .get(&models_url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}
