use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Result, SignalError};

const SHORT_WINDOW_RANGE: RangeInclusive<usize> = 3..=120;
const LONG_WINDOW_RANGE: RangeInclusive<usize> = 10..=240;
const RSI_PERIOD_RANGE: RangeInclusive<usize> = 2..=60;
const RSI_OVERBOUGHT_RANGE: RangeInclusive<f64> = 50.0..=90.0;
const RSI_OVERSOLD_RANGE: RangeInclusive<f64> = 10.0..=50.0;
const VOLUME_WINDOW_RANGE: RangeInclusive<usize> = 5..=120;
const VOLATILITY_WINDOW_RANGE: RangeInclusive<usize> = 5..=120;

/// Validated parameter set for the composite scoring model.
///
/// Only obtainable through [`ScoringParametersBuilder::build`] (or serde,
/// which routes through the builder), so every instance is in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoringParametersBuilder")]
pub struct ScoringParameters {
    short_window: usize,
    long_window: usize,
    rsi_period: usize,
    rsi_overbought: f64,
    rsi_oversold: f64,
    volume_window: usize,
    volatility_window: usize,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            short_window: 14,
            long_window: 50,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            volume_window: 20,
            volatility_window: 20,
        }
    }
}

impl ScoringParameters {
    pub fn builder() -> ScoringParametersBuilder {
        ScoringParametersBuilder::default()
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn rsi_period(&self) -> usize {
        self.rsi_period
    }

    pub fn rsi_overbought(&self) -> f64 {
        self.rsi_overbought
    }

    pub fn rsi_oversold(&self) -> f64 {
        self.rsi_oversold
    }

    pub fn volume_window(&self) -> usize {
        self.volume_window
    }

    pub fn volatility_window(&self) -> usize {
        self.volatility_window
    }

    /// Bars needed per window, as (parameter name, bars).
    ///
    /// RSI and volatility work on first differences, so each needs one bar
    /// more than its period.
    pub fn bar_requirements(&self) -> [(&'static str, usize); 5] {
        [
            ("long_window", self.long_window),
            ("short_window", self.short_window),
            ("volume_window", self.volume_window),
            ("volatility_window", self.volatility_window + 1),
            ("rsi_period", self.rsi_period + 1),
        ]
    }

    /// Minimum series length for every scoring input to be defined.
    pub fn min_bars(&self) -> usize {
        self.bar_requirements()
            .iter()
            .map(|(_, bars)| *bars)
            .max()
            .unwrap_or(0)
    }
}

/// Unvalidated parameters; unset fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParametersBuilder {
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub rsi_period: Option<usize>,
    pub rsi_overbought: Option<f64>,
    pub rsi_oversold: Option<f64>,
    pub volume_window: Option<usize>,
    pub volatility_window: Option<usize>,
}

impl ScoringParametersBuilder {
    pub fn short_window(mut self, value: usize) -> Self {
        self.short_window = Some(value);
        self
    }

    pub fn long_window(mut self, value: usize) -> Self {
        self.long_window = Some(value);
        self
    }

    pub fn rsi_period(mut self, value: usize) -> Self {
        self.rsi_period = Some(value);
        self
    }

    pub fn rsi_overbought(mut self, value: f64) -> Self {
        self.rsi_overbought = Some(value);
        self
    }

    pub fn rsi_oversold(mut self, value: f64) -> Self {
        self.rsi_oversold = Some(value);
        self
    }

    pub fn volume_window(mut self, value: usize) -> Self {
        self.volume_window = Some(value);
        self
    }

    pub fn volatility_window(mut self, value: usize) -> Self {
        self.volatility_window = Some(value);
        self
    }

    pub fn build(self) -> Result<ScoringParameters> {
        let defaults = ScoringParameters::default();
        let params = ScoringParameters {
            short_window: self.short_window.unwrap_or(defaults.short_window),
            long_window: self.long_window.unwrap_or(defaults.long_window),
            rsi_period: self.rsi_period.unwrap_or(defaults.rsi_period),
            rsi_overbought: self.rsi_overbought.unwrap_or(defaults.rsi_overbought),
            rsi_oversold: self.rsi_oversold.unwrap_or(defaults.rsi_oversold),
            volume_window: self.volume_window.unwrap_or(defaults.volume_window),
            volatility_window: self.volatility_window.unwrap_or(defaults.volatility_window),
        };

        check_window("short_window", params.short_window, SHORT_WINDOW_RANGE)?;
        check_window("long_window", params.long_window, LONG_WINDOW_RANGE)?;
        check_window("rsi_period", params.rsi_period, RSI_PERIOD_RANGE)?;
        check_level("rsi_overbought", params.rsi_overbought, RSI_OVERBOUGHT_RANGE)?;
        check_level("rsi_oversold", params.rsi_oversold, RSI_OVERSOLD_RANGE)?;
        check_window("volume_window", params.volume_window, VOLUME_WINDOW_RANGE)?;
        check_window(
            "volatility_window",
            params.volatility_window,
            VOLATILITY_WINDOW_RANGE,
        )?;

        if params.rsi_oversold >= params.rsi_overbought {
            return Err(SignalError::validation(
                "rsi_oversold",
                format!(
                    "must be below rsi_overbought ({} >= {})",
                    params.rsi_oversold, params.rsi_overbought
                ),
            ));
        }

        Ok(params)
    }
}

impl TryFrom<ScoringParametersBuilder> for ScoringParameters {
    type Error = SignalError;

    fn try_from(builder: ScoringParametersBuilder) -> Result<Self> {
        builder.build()
    }
}

fn check_window(name: &str, value: usize, range: RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SignalError::validation(
            name,
            format!(
                "{} outside [{}, {}]",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}

fn check_level(name: &str, value: f64, range: RangeInclusive<f64>) -> Result<()> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(SignalError::validation(
            name,
            format!(
                "{} outside [{}, {}]",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}
