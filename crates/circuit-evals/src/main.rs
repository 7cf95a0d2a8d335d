use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use circuit_evals::client::ReasoningEffort;
use circuit_evals::codegen::GenerationOptions;
use circuit_evals::config::{EvalConfig, ExecutionBackend};
use circuit_evals::runner::EvalRunner;
use circuit_evals::suite::{builtin_suite, builtin_suite_names, EvalSuite};
use circuit_report::{score_analysis, Analyzer, DEFAULT_MAX_DEPTH};

#[derive(Parser)]
#[command(name = "circuit-evals", about = "Eval harness for LLM-generated circuit code")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an eval suite (built-in name or path to a .toml suite file).
    Run {
        #[arg(long)]
        suite: String,
        /// Execution backend for execution-scored suites.
        #[arg(long, value_enum, default_value = "remote")]
        backend: ExecutionBackend,
        /// Override the generation model from config.
        #[arg(long)]
        model: Option<String>,
        #[arg(long, value_enum)]
        reasoning_effort: Option<ReasoningEffort>,
        /// Emit the full report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Analyze a circuit JSON file for errors and warnings.
    Analyze {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        #[arg(long)]
        json: bool,
    },
    /// List built-in suites.
    Suites,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            suite,
            backend,
            model,
            reasoning_effort,
            json,
        } => run(suite, backend, model, reasoning_effort, json).await,
        Command::Analyze {
            file,
            max_depth,
            json,
        } => analyze_file(&file, max_depth, json),
        Command::Suites => {
            for name in builtin_suite_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn run(
    suite: String,
    backend: ExecutionBackend,
    model: Option<String>,
    reasoning_effort: Option<ReasoningEffort>,
    json: bool,
) -> Result<()> {
    let suite = match builtin_suite(&suite) {
        Some(suite) => suite,
        None => EvalSuite::load(std::path::Path::new(&suite))
            .with_context(|| format!("{suite} is neither a built-in suite nor a readable file"))?,
    };

    let config = EvalConfig::default();
    let options = GenerationOptions {
        model: model.unwrap_or_else(|| config.generation.model.clone()),
        reasoning_effort,
    };
    info!(
        suite = %suite.name,
        backend = ?backend,
        model = %options.model,
        "starting eval run"
    );

    let runner = EvalRunner::new(config, backend, options)?;
    let report = runner.run_suite(&suite).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_table());
    }
    Ok(())
}

fn analyze_file(file: &PathBuf, max_depth: usize, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let circuit_json: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let analysis = Analyzer::default()
        .with_max_depth(max_depth)
        .analyze(&circuit_json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    if analysis.has_issues {
        println!("{}", analysis.summary);
        println!(
            "\n{} errors, {} warnings — penalty score {:.2}",
            analysis.errors.len(),
            analysis.warnings.len(),
            score_analysis(&analysis)
        );
    } else {
        println!("no errors or warnings — score 1.00");
    }
    Ok(())
}
