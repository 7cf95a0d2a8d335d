//! Eval harness for LLM-generated circuit code.
//!
//! Pipeline per eval case: prompt a generation model for circuit source,
//! extract the fenced code from the reply, then score it — by executing it
//! through the remote circuit runner and analyzing the resulting circuit
//! JSON, by deterministic mock checks, or by an AI judge returning defect
//! flags. Reports aggregate per-case scores with metadata.

pub mod client;
pub mod codegen;
pub mod config;
pub mod prompts;
pub mod runner;
pub mod scorers;
pub mod snippet;
pub mod suite;
