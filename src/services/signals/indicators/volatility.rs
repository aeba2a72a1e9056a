//! Return volatility indicator.

use super::{closes, rolling, Indicator};
use crate::types::Bar;

/// Sample standard deviation of percentage returns over `window`, scaled
/// by `sqrt(window)`.
///
/// Returns start at the second bar, so the first defined value is at index
/// `window`. A zero previous close yields a non-finite return; the value is
/// reported as-is and left to the consumer to treat as unusable.
pub struct ReturnVolatility {
    window: usize,
}

impl Default for ReturnVolatility {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl ReturnVolatility {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Percentage returns aligned with `closes`; index 0 is undefined.
    pub fn returns(closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(closes.len());
        if !closes.is_empty() {
            out.push(None);
        }
        out.extend(closes.windows(2).map(|w| Some(w[1] / w[0] - 1.0)));
        out
    }
}

impl Indicator for ReturnVolatility {
    type Output = f64;

    fn id(&self) -> &str {
        "volatility"
    }

    fn min_periods(&self) -> usize {
        self.window + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let scale = (self.window as f64).sqrt();
        rolling::sample_std_defined(&Self::returns(&closes(bars)), self.window)
            .into_iter()
            .map(|std| std.map(|s| s * scale))
            .collect()
    }
}
