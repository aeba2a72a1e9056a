//! Composite weighted-factor scoring.
//!
//! Starts from a neutral 50 and adds fixed-size contributions for trend,
//! momentum, volume and volatility, then maps the clamped total onto
//! BUY / SELL / HOLD.

use serde::Serialize;

use super::indicators::{Indicator, ReturnVolatility, Rsi, Sma, VolumeRatio};
use super::{round_confidence, snapshot, ScoreOutcome};
use crate::error::{Result, SignalError};
use crate::types::{IndicatorSnapshot, OhlcvSeries, Recommendation, ScoringParameters};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const TREND_POINTS: f64 = 20.0;
pub const MOMENTUM_POINTS: f64 = 15.0;
pub const VOLUME_POINTS: f64 = 5.0;
pub const VOLATILITY_POINTS: f64 = 5.0;

const HIGH_VOLUME_RATIO: f64 = 1.2;
const LOW_VOLUME_RATIO: f64 = 0.8;
const LOW_VOLATILITY: f64 = 0.02;
const HIGH_VOLATILITY: f64 = 0.06;
const MAX_REASONS: usize = 3;

/// Which part of the model a contribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Trend,
    Momentum,
    Volume,
    Volatility,
}

/// One non-zero contribution to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub factor: Factor,
    pub points: f64,
    pub reason: String,
}

/// Scoring inputs read at the evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringInputs {
    pub close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
    pub volume: f64,
    pub volume_ma: f64,
    pub volume_ratio: f64,
    /// Non-finite raw values are replaced by 0.
    pub volatility: f64,
}

/// Full breakdown of a composite evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    /// Clamped to [0, 100].
    pub score: f64,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub inputs: ScoringInputs,
    pub contributions: Vec<Contribution>,
}

/// Stateless composite scoring model.
pub struct ScoringEngine;

impl ScoringEngine {
    /// Score a series and package the result with its rationale and
    /// indicator snapshot.
    pub fn evaluate(series: &OhlcvSeries, params: &ScoringParameters) -> Result<ScoreOutcome> {
        let composite = Self::score(series, params)?;

        let mut indicators = IndicatorSnapshot::default();
        snapshot::insert_scoring_inputs(&mut indicators, &composite.inputs);
        snapshot::insert_supplementary(&mut indicators, series.bars(), params.short_window());

        Ok(ScoreOutcome {
            recommendation: composite.recommendation,
            confidence: composite.confidence,
            rationale: rationale(&composite.contributions),
            indicators,
        })
    }

    /// Compute the composite score and its contributions.
    ///
    /// Fails with a validation error naming the window when the series is
    /// too short, or when any scoring input is undefined at the last bar.
    pub fn score(series: &OhlcvSeries, params: &ScoringParameters) -> Result<CompositeScore> {
        check_history(series, params)?;
        let inputs = read_inputs(series, params)?;

        let mut contributions = Vec::new();
        let mut push = |factor: Factor, points: f64, reason: String| {
            if points != 0.0 {
                contributions.push(Contribution {
                    factor,
                    points,
                    reason,
                });
            }
        };

        let trend = trend_factor(inputs.close, inputs.sma_short, inputs.sma_long);
        push(
            Factor::Trend,
            trend,
            if trend > 0.0 {
                format!(
                    "Bullish trend: SMA{} above SMA{} with price above SMA{}",
                    params.short_window(),
                    params.long_window(),
                    params.short_window()
                )
            } else {
                format!(
                    "Bearish trend: SMA{} below SMA{} with price below SMA{}",
                    params.short_window(),
                    params.long_window(),
                    params.short_window()
                )
            },
        );

        let momentum = momentum_factor(inputs.rsi, params);
        push(
            Factor::Momentum,
            momentum,
            if momentum > 0.0 {
                format!(
                    "RSI {:.1} at or below oversold level {}",
                    inputs.rsi,
                    params.rsi_oversold()
                )
            } else {
                format!(
                    "RSI {:.1} at or above overbought level {}",
                    inputs.rsi,
                    params.rsi_overbought()
                )
            },
        );

        let volume = volume_factor(inputs.volume_ratio);
        push(
            Factor::Volume,
            volume,
            if volume > 0.0 {
                format!("Volume {:.2}x its average confirms participation", inputs.volume_ratio)
            } else {
                format!("Volume {:.2}x its average shows thin participation", inputs.volume_ratio)
            },
        );

        let volatility = volatility_factor(inputs.volatility);
        push(
            Factor::Volatility,
            volatility,
            if volatility > 0.0 {
                format!("Low volatility {:.4} favours stable moves", inputs.volatility)
            } else {
                format!("High volatility {:.4} raises risk", inputs.volatility)
            },
        );

        let raw = NEUTRAL_SCORE + trend + momentum + volume + volatility;
        let score = raw.clamp(0.0, 100.0);
        let recommendation = Recommendation::from_score(score);

        Ok(CompositeScore {
            score,
            recommendation,
            confidence: round_confidence(score / 100.0),
            inputs,
            contributions,
        })
    }
}

/// +20 for bullish alignment, -20 for bearish alignment, else 0.
pub fn trend_factor(close: f64, sma_short: f64, sma_long: f64) -> f64 {
    if sma_short > sma_long && close > sma_short {
        TREND_POINTS
    } else if sma_short < sma_long && close < sma_short {
        -TREND_POINTS
    } else {
        0.0
    }
}

/// +15 at or below oversold, -15 at or above overbought, else 0.
pub fn momentum_factor(rsi: f64, params: &ScoringParameters) -> f64 {
    if rsi <= params.rsi_oversold() {
        MOMENTUM_POINTS
    } else if rsi >= params.rsi_overbought() {
        -MOMENTUM_POINTS
    } else {
        0.0
    }
}

/// +5 above 1.2x average volume, -5 below 0.8x, else 0.
pub fn volume_factor(volume_ratio: f64) -> f64 {
    if volume_ratio > HIGH_VOLUME_RATIO {
        VOLUME_POINTS
    } else if volume_ratio < LOW_VOLUME_RATIO {
        -VOLUME_POINTS
    } else {
        0.0
    }
}

/// +5 for low positive volatility, -5 for high volatility, else 0.
///
/// Zero volatility (a flat series) carries no information and scores 0.
pub fn volatility_factor(volatility: f64) -> f64 {
    if !volatility.is_finite() || volatility <= 0.0 {
        0.0
    } else if volatility < LOW_VOLATILITY {
        VOLATILITY_POINTS
    } else if volatility > HIGH_VOLATILITY {
        -VOLATILITY_POINTS
    } else {
        0.0
    }
}

fn check_history(series: &OhlcvSeries, params: &ScoringParameters) -> Result<()> {
    let failing = params
        .bar_requirements()
        .into_iter()
        .filter(|(_, bars)| series.len() < *bars)
        .max_by_key(|(_, bars)| *bars);

    match failing {
        Some((name, bars)) => Err(SignalError::validation(
            name,
            format!("needs at least {} bars, series has {}", bars, series.len()),
        )),
        None => Ok(()),
    }
}

fn read_inputs(series: &OhlcvSeries, params: &ScoringParameters) -> Result<ScoringInputs> {
    let bars = series.bars();
    let last = series
        .last()
        .ok_or_else(|| SignalError::validation("series", "series is empty"))?;

    let sma_short = require("short_window", Sma::new(params.short_window()).latest(bars))?;
    let sma_long = require("long_window", Sma::new(params.long_window()).latest(bars))?;
    let rsi = Rsi::new(params.rsi_period()).latest_or_neutral(bars);

    let volume_indicator = VolumeRatio::new(params.volume_window());
    let volume_ma = require(
        "volume_window",
        volume_indicator.average(bars).pop().flatten(),
    )?;
    let volume_ratio = VolumeRatio::ratio(last.volume, Some(volume_ma));

    // A zero close makes returns non-finite; that scores as no volatility.
    let volatility = match ReturnVolatility::new(params.volatility_window()).latest(bars) {
        Some(v) if v.is_finite() => v,
        Some(_) => 0.0,
        None => {
            return Err(SignalError::validation(
                "volatility_window",
                "indicator undefined at the evaluation point",
            ))
        }
    };

    Ok(ScoringInputs {
        close: last.close,
        sma_short,
        sma_long,
        rsi,
        volume: last.volume,
        volume_ma,
        volume_ratio,
        volatility,
    })
}

fn require(window: &str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SignalError::validation(
            window,
            "indicator undefined at the evaluation point",
        )),
    }
}

/// Top contributions by absolute size; ties keep factor order.
fn rationale(contributions: &[Contribution]) -> Vec<String> {
    if contributions.is_empty() {
        return vec!["No decisive factors; neutral outlook, wait for confirmation".to_string()];
    }
    let mut ranked: Vec<&Contribution> = contributions.iter().collect();
    ranked.sort_by(|a, b| b.points.abs().total_cmp(&a.points.abs()));
    ranked
        .into_iter()
        .take(MAX_REASONS)
        .map(|c| format!("{} ({:+})", c.reason, c.points))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::fixtures::bars_from_closes;

    fn series(closes: &[f64]) -> OhlcvSeries {
        OhlcvSeries::new(bars_from_closes(closes)).unwrap()
    }

    #[test]
    fn test_trend_factor_alignment() {
        assert_eq!(trend_factor(12.0, 11.0, 10.0), TREND_POINTS);
        assert_eq!(trend_factor(8.0, 9.0, 10.0), -TREND_POINTS);
        // short above long but price below short: mixed
        assert_eq!(trend_factor(10.5, 11.0, 10.0), 0.0);
        assert_eq!(trend_factor(10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_momentum_factor_threshold_edges() {
        let params = ScoringParameters::default();
        assert_eq!(momentum_factor(30.0, &params), MOMENTUM_POINTS);
        assert_eq!(momentum_factor(30.0001, &params), 0.0);
        assert_eq!(momentum_factor(69.9999, &params), 0.0);
        assert_eq!(momentum_factor(70.0, &params), -MOMENTUM_POINTS);
    }

    #[test]
    fn test_momentum_never_jumps_from_negative_to_positive() {
        let params = ScoringParameters::default();
        let mut previous = momentum_factor(0.0, &params);
        for step in 1..=1000 {
            let current = momentum_factor(step as f64 / 10.0, &params);
            // rising RSI: contribution only steps down, one threshold at a time
            assert!(current <= previous);
            assert!((previous - current) == 0.0 || (previous - current) == MOMENTUM_POINTS);
            previous = current;
        }
    }

    #[test]
    fn test_volume_factor() {
        assert_eq!(volume_factor(1.21), VOLUME_POINTS);
        assert_eq!(volume_factor(1.2), 0.0);
        assert_eq!(volume_factor(0.8), 0.0);
        assert_eq!(volume_factor(0.79), -VOLUME_POINTS);
    }

    #[test]
    fn test_volatility_factor() {
        assert_eq!(volatility_factor(0.01), VOLATILITY_POINTS);
        assert_eq!(volatility_factor(0.04), 0.0);
        assert_eq!(volatility_factor(0.07), -VOLATILITY_POINTS);
        assert_eq!(volatility_factor(0.0), 0.0);
        assert_eq!(volatility_factor(f64::NAN), 0.0);
        assert_eq!(volatility_factor(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_short_series_names_longest_failing_window() {
        let err = ScoringEngine::score(&series(&[100.0; 30]), &ScoringParameters::default())
            .unwrap_err();
        match err {
            SignalError::Validation { field, reason } => {
                assert_eq!(field, "long_window");
                assert!(reason.contains("50"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_linear_uptrend_buys() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.5).collect();
        let result = ScoringEngine::score(&series(&closes), &ScoringParameters::default()).unwrap();
        assert_eq!(result.recommendation, Recommendation::Buy);
        assert_eq!(result.inputs.rsi, 50.0);
        assert_eq!(result.score, 75.0);
        assert_eq!(result.confidence, 0.75);
    }

    #[test]
    fn test_flat_series_holds() {
        let result =
            ScoringEngine::score(&series(&[100.0; 120]), &ScoringParameters::default()).unwrap();
        assert_eq!(result.recommendation, Recommendation::Hold);
        assert_eq!(result.score, 50.0);
        assert_eq!(result.confidence, 0.5);
        assert!(result.contributions.is_empty());
        assert_eq!(result.inputs.volatility, 0.0);
    }

    #[test]
    fn test_zero_close_scores_without_volatility() {
        let mut closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.5).collect();
        closes[110] = 0.0;
        let result = ScoringEngine::score(&series(&closes), &ScoringParameters::default()).unwrap();
        assert_eq!(result.inputs.volatility, 0.0);
        assert!(result
            .contributions
            .iter()
            .all(|c| c.factor != Factor::Volatility));
        assert!((0.0..=100.0).contains(&result.score));
    }

    #[test]
    fn test_volatility_window_still_required() {
        let params = ScoringParameters::builder()
            .short_window(5)
            .long_window(10)
            .volatility_window(40)
            .build()
            .unwrap();
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let err = ScoringEngine::score(&series(&closes), &params).unwrap_err();
        match err {
            SignalError::Validation { field, .. } => assert_eq!(field, "volatility_window"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rationale_ranked_and_capped() {
        let contributions = vec![
            Contribution {
                factor: Factor::Volume,
                points: 5.0,
                reason: "volume".into(),
            },
            Contribution {
                factor: Factor::Trend,
                points: -20.0,
                reason: "trend".into(),
            },
            Contribution {
                factor: Factor::Volatility,
                points: -5.0,
                reason: "volatility".into(),
            },
            Contribution {
                factor: Factor::Momentum,
                points: 15.0,
                reason: "momentum".into(),
            },
        ];
        let reasons = rationale(&contributions);
        assert_eq!(
            reasons,
            vec!["trend (-20)", "momentum (+15)", "volume (+5)"]
        );
    }

    #[test]
    fn test_rationale_when_neutral() {
        assert_eq!(rationale(&[]).len(), 1);
    }

    #[test]
    fn test_evaluate_snapshot_contents() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.5).collect();
        let outcome =
            ScoringEngine::evaluate(&series(&closes), &ScoringParameters::default()).unwrap();
        for key in [
            "close", "sma_short", "sma_long", "rsi", "volume", "volume_ma", "volume_ratio",
            "volatility", "ema_14", "macd", "bollinger", "stochastic", "williams_r",
        ] {
            assert!(outcome.indicators.contains(key), "missing {key}");
        }
        assert_eq!(outcome.indicators.scalar("close"), Some(159.5));
    }
}
