//! Eval suite definitions.
//!
//! A suite is a named list of cases plus the scorers to run. Cases with a
//! fixed `expected` body are fixture cases: the body is scored directly.
//! Cases without one are live: the runner generates code from the prompt
//! first. Built-in suites mirror the original harness; external suites load
//! from TOML so new evals don't require recompiling.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which scorers a suite runs. `Execution` resolves to the remote or mock
/// backend depending on the `ExecutionBackend` the runner was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    Execution,
    MockExecution,
    AiValidator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    /// The prompt presented to the generation model (and to the judge as
    /// context).
    pub prompt: String,
    /// Fixture output; when present, generation is skipped.
    #[serde(default)]
    pub expected: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalSuite {
    pub name: String,
    pub scorers: Vec<ScorerKind>,
    pub cases: Vec<EvalCase>,
}

impl EvalSuite {
    /// Load a suite from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file {}", path.display()))?;
        let suite: EvalSuite = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse suite file {}", path.display()))?;
        if suite.cases.is_empty() {
            anyhow::bail!("Suite {} has no cases", suite.name);
        }
        Ok(suite)
    }
}

/// Resolve a built-in suite by name.
pub fn builtin_suite(name: &str) -> Option<EvalSuite> {
    match name {
        "validation" => Some(validation_suite()),
        "execution" => Some(execution_suite()),
        "555-timer" => Some(timer_555_suite()),
        "demo" => Some(demo_suite()),
        _ => None,
    }
}

/// Names of all built-in suites, for `circuit-evals suites`.
pub fn builtin_suite_names() -> &'static [&'static str] {
    &["validation", "execution", "555-timer", "demo"]
}

const LED_CIRCUIT: &str = r#"export default () => (
  <board width="20mm" height="20mm">
    <resistor name="R1" resistance="220ohm" footprint="0402" />
    <led name="LED1" color="red" footprint="0603" />
    <trace from=".R1 .pin1" to=".LED1 .anode" />
    <trace from=".LED1 .cathode" to=".R1 .pin2" />
  </board>
)"#;

const TIMER_CIRCUIT: &str = r#"export default () => (
  <board width="30mm" height="25mm">
    <chip
      name="U1"
      footprint="dip8"
      pinLabels={{
        pin1: "GND",
        pin2: "TRIG",
        pin3: "OUT",
        pin4: "RESET",
        pin5: "CTRL",
        pin6: "THRES",
        pin7: "DISCH",
        pin8: "VCC"
      }}
    />
    <resistor name="R1" resistance="10k" footprint="0402" />
    <capacitor name="C1" capacitance="10uF" footprint="0603" />
  </board>
)"#;

const INVALID_CIRCUIT: &str = r#"export default () => (
  <board>
    <invalidcomponent name="X1" />
    <resistor resistance="invalid" />
    <trace from="nowhere" to="somewhere" />
  </board>
)"#;

const DEPRECATED_COORDS_CIRCUIT: &str = r#"export default () => (
  <board>
    <resistor name="R1" pcbX="5mm" pcbY="10mm" resistance="1k" />
    <capacitor name="C1" pcbX="15mm" pcbY="10mm" capacitance="100nF" />
  </board>
)"#;

/// Fixture circuits judged by the AI validator.
fn validation_suite() -> EvalSuite {
    EvalSuite {
        name: "validation".into(),
        scorers: vec![ScorerKind::AiValidator],
        cases: vec![
            EvalCase {
                prompt: "Create a simple LED circuit with a resistor".into(),
                expected: Some(LED_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Create a 555 timer circuit".into(),
                expected: Some(TIMER_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Create a circuit with invalid syntax".into(),
                expected: Some(INVALID_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Create a circuit using raw coordinates (deprecated pattern)".into(),
                expected: Some(DEPRECATED_COORDS_CIRCUIT.into()),
            },
        ],
    }
}

/// Fixture circuits through the execution backend.
fn execution_suite() -> EvalSuite {
    EvalSuite {
        name: "execution".into(),
        scorers: vec![ScorerKind::Execution],
        cases: vec![
            EvalCase {
                prompt: "Simple LED circuit".into(),
                expected: Some(LED_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Invalid syntax test".into(),
                expected: Some(INVALID_CIRCUIT.into()),
            },
        ],
    }
}

/// Live generation scored by execution.
fn timer_555_suite() -> EvalSuite {
    EvalSuite {
        name: "555-timer".into(),
        scorers: vec![ScorerKind::Execution],
        cases: vec![EvalCase {
            prompt: "Create a simple 555 timer circuit that creates a square wave".into(),
            expected: None,
        }],
    }
}

/// Fixture circuits through the mock scorer only; runs anywhere.
fn demo_suite() -> EvalSuite {
    EvalSuite {
        name: "demo".into(),
        scorers: vec![ScorerKind::MockExecution],
        cases: vec![
            EvalCase {
                prompt: "Create a simple LED blinker circuit with a 555 timer".into(),
                expected: Some(TIMER_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Create an invalid circuit with made-up components".into(),
                expected: Some(INVALID_CIRCUIT.into()),
            },
            EvalCase {
                prompt: "Create a circuit using deprecated coordinates".into(),
                expected: Some(DEPRECATED_COORDS_CIRCUIT.into()),
            },
        ],
    }
}
