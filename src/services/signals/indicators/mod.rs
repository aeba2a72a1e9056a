//! Technical indicator implementations.
//!
//! Each indicator is a small parameter struct with a pure `calculate` that
//! returns one entry per input bar, `None` where the value is undefined.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volatility;
pub mod volume;
pub mod williams;

pub use bollinger::{BollingerBands, BollingerPoint};
pub use ema::Ema;
pub use macd::{Macd, MacdPoint};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticPoint};
pub use volatility::ReturnVolatility;
pub use volume::VolumeRatio;
pub use williams::WilliamsR;

use crate::types::Bar;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Value produced per bar.
    type Output;

    /// Snapshot key for this indicator.
    fn id(&self) -> &str;

    /// Bars needed before the first defined value.
    fn min_periods(&self) -> usize;

    /// Compute the indicator aligned with `bars`.
    fn calculate(&self, bars: &[Bar]) -> Vec<Option<Self::Output>>;

    /// Value at the last bar, if defined.
    fn latest(&self, bars: &[Bar]) -> Option<Self::Output> {
        self.calculate(bars).pop().flatten()
    }
}

pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
