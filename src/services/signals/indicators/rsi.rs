//! Relative Strength Index (RSI) indicator.

use super::{closes, Indicator};
use crate::types::Bar;

/// Value substituted for an undefined RSI when scoring.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI (Relative Strength Index) indicator.
///
/// Average gain and average loss are exponentially weighted with
/// `alpha = 1 / period` (Wilder smoothing, bias-adjusted weights). Values
/// range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// The first `period` entries are undefined, and so is any point where the
/// average loss is zero (the ratio has no finite value). Consumers
/// substitute [`NEUTRAL_RSI`] for undefined points.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI over a close series.
    pub fn over(closes: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if period == 0 {
            return out;
        }

        let decay = 1.0 - 1.0 / period as f64;
        let mut gain_acc = 0.0;
        let mut loss_acc = 0.0;
        let mut weight_acc = 0.0;

        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            gain_acc = change.max(0.0) + decay * gain_acc;
            loss_acc = (-change).max(0.0) + decay * loss_acc;
            weight_acc = 1.0 + decay * weight_acc;

            // i changes observed so far
            if i < period {
                continue;
            }
            let avg_gain = gain_acc / weight_acc;
            let avg_loss = loss_acc / weight_acc;
            if avg_loss == 0.0 {
                continue;
            }
            let rs = avg_gain / avg_loss;
            out[i] = Some(100.0 - 100.0 / (1.0 + rs));
        }
        out
    }

    /// Latest RSI with the neutral fallback applied.
    pub fn latest_or_neutral(&self, bars: &[Bar]) -> f64 {
        self.latest(bars).unwrap_or(NEUTRAL_RSI)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn id(&self) -> &str {
        "rsi"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        Self::over(&closes(bars), self.period)
    }
}
