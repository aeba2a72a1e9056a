//! Volume ratio indicator.

use super::{rolling, Indicator};
use crate::types::Bar;

/// Ratio reported when the average volume is zero or undefined.
pub const NORMAL_VOLUME_RATIO: f64 = 1.0;

/// Current volume relative to its rolling average.
///
/// A zero or undefined average yields [`NORMAL_VOLUME_RATIO`], so the ratio
/// is always finite.
pub struct VolumeRatio {
    window: usize,
}

impl Default for VolumeRatio {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl VolumeRatio {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Rolling average volume, undefined before the window fills.
    pub fn average(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        rolling::mean(&volumes, self.window)
    }

    pub fn ratio(volume: f64, average: Option<f64>) -> f64 {
        match average {
            Some(avg) if avg.is_finite() && avg > 0.0 => volume / avg,
            _ => NORMAL_VOLUME_RATIO,
        }
    }
}

impl Indicator for VolumeRatio {
    type Output = f64;

    fn id(&self) -> &str {
        "volume_ratio"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        bars.iter()
            .zip(self.average(bars))
            .map(|(bar, avg)| Some(Self::ratio(bar.volume, avg)))
            .collect()
    }
}
