//! Stochastic Oscillator indicator.

use serde::{Deserialize, Serialize};

use super::{rolling, Indicator};
use crate::types::Bar;

/// Value used for %K when the window has no range.
pub const NEUTRAL_STOCHASTIC: f64 = 50.0;

/// %K and its smoothed %D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticPoint {
    pub k: f64,
    pub d: f64,
}

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(%K, smoothing)
///
/// Signals:
/// - Below 20: Oversold
/// - Above 80: Overbought
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    /// Raw %K series.
    pub fn percent_k(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highest = rolling::max(&highs, self.k_period);
        let lowest = rolling::min(&lows, self.k_period);

        bars.iter()
            .zip(highest.iter().zip(&lowest))
            .map(|(bar, (hh, ll))| {
                let (highest_high, lowest_low) = ((*hh)?, (*ll)?);
                if highest_high == lowest_low {
                    Some(NEUTRAL_STOCHASTIC)
                } else {
                    Some((bar.close - lowest_low) / (highest_high - lowest_low) * 100.0)
                }
            })
            .collect()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticPoint;

    fn id(&self) -> &str {
        "stochastic"
    }

    fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<StochasticPoint>> {
        let k = self.percent_k(bars);
        let d = rolling::mean_defined(&k, self.d_period);
        k.iter()
            .zip(&d)
            .map(|(k, d)| {
                Some(StochasticPoint {
                    k: (*k)?,
                    d: (*d)?,
                })
            })
            .collect()
    }
}
