//! Deterministic analysis of compiled circuit JSON.
//!
//! The circuit compiler emits an arbitrarily nested tree of elements. Any
//! element may carry an `error_type` and/or `warning_type` marker. This crate
//! walks that tree, collects every marked element into structured issue
//! records, and derives a penalty score from the counts.
//!
//! Everything here is pure and synchronous: no I/O, no shared state. Safe to
//! call concurrently on independent inputs.

pub mod analysis;
pub mod scoring;

pub use analysis::{
    analyze, AnalysisError, Analyzer, CircuitAnalysis, Issue, IssueKind, TagSchema,
    DEFAULT_MAX_DEPTH,
};
pub use scoring::{penalty_score, score_analysis, ERROR_PENALTY, WARNING_PENALTY};
