//! Simple Moving Average (SMA) indicator.

use super::{closes, rolling, Indicator};
use crate::types::Bar;

/// SMA (Simple Moving Average) of closing prices.
pub struct Sma {
    period: usize,
    id: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            id: format!("sma_{}", period),
        }
    }

    /// Rolling mean of an arbitrary series.
    pub fn over(values: &[f64], period: usize) -> Vec<Option<f64>> {
        rolling::mean(values, period)
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn id(&self) -> &str {
        &self.id
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        Self::over(&closes(bars), self.period)
    }
}
