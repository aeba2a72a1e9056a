//! Bollinger Bands indicator.

use serde::{Deserialize, Serialize};

use super::{closes, rolling, Indicator};
use crate::types::Bar;

/// Band levels and the close's position between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// %B: 0 at the lower band, 1 at the upper band, 0.5 when the bands
    /// collapse onto each other.
    pub position: f64,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(period)
/// - Upper band: SMA + k * StdDev
/// - Lower band: SMA - k * StdDev
///
/// StdDev is the sample standard deviation of the window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerPoint;

    fn id(&self) -> &str {
        "bollinger"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<BollingerPoint>> {
        let prices = closes(bars);
        let middle = rolling::mean(&prices, self.period);
        let std_dev = rolling::sample_std_defined(&rolling::defined(&prices), self.period);

        prices
            .iter()
            .zip(middle.iter().zip(&std_dev))
            .map(|(price, (m, s))| {
                let (middle, std_dev) = ((*m)?, (*s)?);
                let upper = middle + self.std_dev_multiplier * std_dev;
                let lower = middle - self.std_dev_multiplier * std_dev;
                let band_width = upper - lower;
                let position = if band_width > 0.0 {
                    (price - lower) / band_width
                } else {
                    0.5
                };
                Some(BollingerPoint {
                    upper,
                    middle,
                    lower,
                    position,
                })
            })
            .collect()
    }
}
