//! Penalty scoring over an analysis result.
//!
//! A clean execution starts at 1.0; every error costs 0.3 and every warning
//! 0.1, floored at 0.0. The weights are product policy inherited from the
//! original scorer, not tunable per call.

use crate::analysis::CircuitAnalysis;

pub const ERROR_PENALTY: f64 = 0.3;
pub const WARNING_PENALTY: f64 = 0.1;

/// Score from issue counts, clamped to `[0.0, 1.0]`.
pub fn penalty_score(error_count: usize, warning_count: usize) -> f64 {
    let score = 1.0 - ERROR_PENALTY * error_count as f64 - WARNING_PENALTY * warning_count as f64;
    score.max(0.0)
}

/// Score an analysis result directly.
pub fn score_analysis(analysis: &CircuitAnalysis) -> f64 {
    penalty_score(analysis.errors.len(), analysis.warnings.len())
}
