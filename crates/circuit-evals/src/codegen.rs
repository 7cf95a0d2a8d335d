//! Prompt → circuit code generation.
//!
//! Sends the syntax-primed system preamble plus the user's prompt to the
//! generation model, pulls the first fenced code block out of the reply, and
//! attaches a shareable snippet URL. Duration and token usage are logged as
//! structured fields.

use std::sync::OnceLock;
use std::time::Instant;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::client::{ChatBackend, ChatMessage, ChatRequest, ReasoningEffort};
use crate::prompts;
use crate::snippet::create_snippet_url;

/// Options for one generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub model: String,
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// Generated circuit source plus provenance.
#[derive(Debug, Clone)]
pub struct GeneratedCircuit {
    /// Extracted code (fence contents, or the whole trimmed reply).
    pub code: String,
    /// The model's full reply.
    pub raw_response: String,
    /// Shareable editor link for the extracted code.
    pub snippet_url: String,
}

fn codefence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```(?:typescript|ts|tsx|javascript|js|jsx)?\n([\s\S]*?)```")
            .expect("codefence regex is valid")
    })
}

/// Extract the first fenced code block; fall back to the whole trimmed text.
pub fn parse_codefence(text: &str) -> String {
    if let Some(captures) = codefence_regex().captures(text) {
        if let Some(block) = captures.get(1) {
            return block.as_str().trim().to_string();
        }
    }
    text.trim().to_string()
}

/// Generate circuit code for `prompt` through `backend`.
pub async fn generate_circuit(
    backend: &dyn ChatBackend,
    options: &GenerationOptions,
    prompt: &str,
) -> Result<GeneratedCircuit> {
    let started = Instant::now();

    let mut request = ChatRequest::new(
        options.model.clone(),
        vec![
            ChatMessage::system(prompts::generation_preamble()),
            ChatMessage::user(prompt),
        ],
    );
    request.reasoning_effort = options.reasoning_effort;

    let response = backend
        .chat(request)
        .await
        .context("Circuit generation request failed")?;

    let code = parse_codefence(&response.content);
    let snippet_url = create_snippet_url(&code);

    info!(
        model = %options.model,
        prompt_version = prompts::PROMPT_VERSION,
        elapsed_ms = started.elapsed().as_millis() as u64,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        code_bytes = code.len(),
        "circuit generation complete"
    );

    Ok(GeneratedCircuit {
        code,
        raw_response: response.content,
        snippet_url,
    })
}
