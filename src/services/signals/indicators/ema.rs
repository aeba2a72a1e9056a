//! Exponential Moving Average (EMA) indicator.

use super::{closes, rolling, Indicator};
use crate::types::Bar;

/// EMA (Exponential Moving Average) of closing prices.
///
/// Seeded with the SMA of the first `period` values, then smoothed with
/// multiplier `2 / (period + 1)`.
pub struct Ema {
    period: usize,
    id: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            id: format!("ema_{}", period),
        }
    }

    /// EMA over a series whose leading entries may be undefined.
    ///
    /// The seed window starts at the first defined value; a gap after that
    /// leaves the remainder undefined.
    pub fn over(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if period == 0 {
            return out;
        }
        let Some(start) = values.iter().position(Option::is_some) else {
            return out;
        };
        let seed_end = start + period - 1;
        if seed_end >= values.len() {
            return out;
        }

        let Some(seed) = rolling::mean_defined(&values[start..=seed_end], period)
            .pop()
            .flatten()
        else {
            return out;
        };

        let multiplier = 2.0 / (period as f64 + 1.0);
        let mut ema = seed;
        out[seed_end] = Some(ema);
        for i in seed_end + 1..values.len() {
            match values[i] {
                Some(v) => {
                    ema = (v - ema) * multiplier + ema;
                    out[i] = Some(ema);
                }
                None => break,
            }
        }
        out
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn id(&self) -> &str {
        &self.id
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        Self::over(&rolling::defined(&closes(bars)), self.period)
    }
}
