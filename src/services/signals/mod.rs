//! Signal generation.
//!
//! Indicator calculations, the composite scoring model, alternative
//! strategies and assembly of the final [`Signal`](crate::types::Signal).

pub mod assembler;
pub mod indicators;
pub mod scoring;
mod snapshot;
pub mod strategies;

pub use assembler::assemble;
pub use scoring::{CompositeScore, Contribution, Factor, ScoringEngine, ScoringInputs};
pub use strategies::Strategy;

use serde::Serialize;

use crate::types::{IndicatorSnapshot, Recommendation};

/// Result of running a strategy over one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub recommendation: Recommendation,
    /// In [0, 1], rounded to two decimals.
    pub confidence: f64,
    pub rationale: Vec<String>,
    pub indicators: IndicatorSnapshot,
}

/// Clamp to [0, 1] and round to two decimals.
pub(crate) fn round_confidence(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
