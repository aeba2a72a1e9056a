//! MACD (Moving Average Convergence Divergence) indicator.

use serde::{Deserialize, Serialize};

use super::{closes, rolling, Ema, Indicator};
use crate::types::Bar;

/// MACD line, signal line and histogram at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(fast) - EMA(slow)
/// - Signal Line = EMA(signal) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdPoint;

    fn id(&self) -> &str {
        "macd"
    }

    fn min_periods(&self) -> usize {
        self.slow_period.max(self.fast_period) + self.signal_period - 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<MacdPoint>> {
        let prices = rolling::defined(&closes(bars));
        let fast = Ema::over(&prices, self.fast_period);
        let slow = Ema::over(&prices, self.slow_period);

        let line: Vec<Option<f64>> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();
        let signal = Ema::over(&line, self.signal_period);

        line.iter()
            .zip(&signal)
            .map(|(m, s)| {
                let (macd, signal) = ((*m)?, (*s)?);
                Some(MacdPoint {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            })
            .collect()
    }
}
