//! Indicator snapshot construction.

use super::indicators::{BollingerBands, Ema, Indicator, Macd, Stochastic, WilliamsR};
use super::scoring::ScoringInputs;
use crate::types::{Bar, IndicatorSnapshot, IndicatorValue};

/// Record the values the composite model scored on.
pub(crate) fn insert_scoring_inputs(snapshot: &mut IndicatorSnapshot, inputs: &ScoringInputs) {
    snapshot.insert_scalar("close", inputs.close);
    snapshot.insert_scalar("sma_short", inputs.sma_short);
    snapshot.insert_scalar("sma_long", inputs.sma_long);
    snapshot.insert_scalar("rsi", inputs.rsi);
    snapshot.insert_scalar("volume", inputs.volume);
    snapshot.insert_scalar("volume_ma", inputs.volume_ma);
    snapshot.insert_scalar("volume_ratio", inputs.volume_ratio);
    snapshot.insert_scalar("volatility", inputs.volatility);
}

/// Add informational indicators that are defined at the last bar.
///
/// None of these feed the composite score; undefined ones are left out.
pub(crate) fn insert_supplementary(snapshot: &mut IndicatorSnapshot, bars: &[Bar], ema_period: usize) {
    let ema = Ema::new(ema_period);
    if let Some(value) = ema.latest(bars) {
        snapshot.insert_scalar(ema.id(), value);
    }

    let macd = Macd::default();
    if let Some(point) = macd.latest(bars) {
        snapshot.insert(
            macd.id(),
            IndicatorValue::Macd {
                macd: point.macd,
                signal: point.signal,
                histogram: point.histogram,
            },
        );
    }

    let bollinger = BollingerBands::default();
    if let Some(point) = bollinger.latest(bars) {
        snapshot.insert(
            bollinger.id(),
            IndicatorValue::Bollinger {
                upper: point.upper,
                middle: point.middle,
                lower: point.lower,
                position: point.position,
            },
        );
    }

    let stochastic = Stochastic::default();
    if let Some(point) = stochastic.latest(bars) {
        snapshot.insert(
            stochastic.id(),
            IndicatorValue::Stochastic {
                k: point.k,
                d: point.d,
            },
        );
    }

    let williams = WilliamsR::default();
    if let Some(value) = williams.latest(bars) {
        snapshot.insert_scalar(williams.id(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::fixtures::{bars_from_closes, choppy_uptrend};

    #[test]
    fn test_short_history_omits_undefined_indicators() {
        let bars = bars_from_closes(&choppy_uptrend(20));
        let mut snapshot = IndicatorSnapshot::default();
        insert_supplementary(&mut snapshot, &bars, 14);
        assert!(snapshot.contains("ema_14"));
        assert!(snapshot.contains("bollinger"));
        assert!(snapshot.contains("stochastic"));
        assert!(snapshot.contains("williams_r"));
        // MACD needs 34 bars
        assert!(!snapshot.contains("macd"));
    }

    #[test]
    fn test_all_values_finite() {
        let bars = bars_from_closes(&choppy_uptrend(60));
        let mut snapshot = IndicatorSnapshot::default();
        insert_supplementary(&mut snapshot, &bars, 9);
        assert_eq!(snapshot.len(), 5);
        for (_, value) in snapshot.iter() {
            match value {
                IndicatorValue::Scalar(v) => assert!(v.is_finite()),
                IndicatorValue::Macd {
                    macd,
                    signal,
                    histogram,
                } => assert!(macd.is_finite() && signal.is_finite() && histogram.is_finite()),
                IndicatorValue::Bollinger {
                    upper,
                    lower,
                    position,
                    ..
                } => assert!(upper >= lower && position.is_finite()),
                IndicatorValue::Stochastic { k, d } => assert!(k.is_finite() && d.is_finite()),
            }
        }
    }
}
