//! Williams %R indicator.

use super::{rolling, Indicator};
use crate::types::Bar;

/// Value used when the window has no range.
pub const NEUTRAL_WILLIAMS_R: f64 = -50.0;

/// Williams %R.
///
/// %R = -100 * (Highest High - Close) / (Highest High - Lowest Low)
///
/// Ranges from -100 (close at the low) to 0 (close at the high).
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for WilliamsR {
    type Output = f64;

    fn id(&self) -> &str {
        "williams_r"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highest = rolling::max(&highs, self.period);
        let lowest = rolling::min(&lows, self.period);

        bars.iter()
            .zip(highest.iter().zip(&lowest))
            .map(|(bar, (hh, ll))| {
                let (highest_high, lowest_low) = ((*hh)?, (*ll)?);
                if highest_high == lowest_low {
                    Some(NEUTRAL_WILLIAMS_R)
                } else {
                    Some(-100.0 * (highest_high - bar.close) / (highest_high - lowest_low))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::fixtures::bars_from_closes;

    #[test]
    fn test_close_at_high_is_zero() {
        let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
        bars[2].high = 12.0;
        let value = WilliamsR::new(3).latest(&bars).unwrap();
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn test_close_at_low_is_minus_hundred() {
        let mut bars = bars_from_closes(&[12.0, 11.0, 10.0]);
        bars[2].low = 10.0;
        let value = WilliamsR::new(3).latest(&bars).unwrap();
        assert!((value + 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_range_is_neutral() {
        let mut bars = bars_from_closes(&[5.0; 14]);
        for bar in &mut bars {
            bar.high = 5.0;
            bar.low = 5.0;
        }
        assert_eq!(WilliamsR::default().latest(&bars), Some(NEUTRAL_WILLIAMS_R));
    }

    #[test]
    fn test_undefined_before_window() {
        let out = WilliamsR::default().calculate(&bars_from_closes(&[5.0; 13]));
        assert!(out.iter().all(Option::is_none));
    }
}
