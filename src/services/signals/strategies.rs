//! Selectable signal strategies.
//!
//! The composite model is the default; the others are simpler rule sets
//! kept for comparison and selected by name from configuration.

use super::indicators::{
    BollingerBands, Indicator, Macd, Rsi, Sma, Stochastic, VolumeRatio, WilliamsR,
};
use super::scoring::ScoringEngine;
use super::{round_confidence, snapshot, ScoreOutcome};
use crate::error::{Result, SignalError};
use crate::types::{IndicatorSnapshot, OhlcvSeries, Recommendation, ScoringParameters};

/// Bars the consensus rule set needs (its longest window is SMA 50).
const CONSENSUS_MIN_BARS: usize = 50;
const CONSENSUS_THRESHOLD: f64 = 40.0;

/// Evaluation strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Weighted-factor model.
    Composite(ScoringParameters),
    /// Fast/slow SMA cross on the last two bars.
    SmaCrossover { fast: usize, slow: usize },
    /// RSI against fixed oversold/overbought levels.
    RsiThreshold {
        period: usize,
        oversold: f64,
        overbought: f64,
    },
    /// Point-voting over a broad indicator set.
    Consensus,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Composite(ScoringParameters::default())
    }
}

impl Strategy {
    pub fn sma_crossover() -> Self {
        Strategy::SmaCrossover { fast: 9, slow: 21 }
    }

    pub fn rsi_threshold() -> Self {
        Strategy::RsiThreshold {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }

    /// Resolve a configured strategy name.
    ///
    /// `params` only applies to the composite strategy.
    pub fn from_name(name: &str, params: ScoringParameters) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "composite" => Ok(Strategy::Composite(params)),
            "sma_crossover" => Ok(Self::sma_crossover()),
            "rsi_threshold" => Ok(Self::rsi_threshold()),
            "consensus" => Ok(Strategy::Consensus),
            other => Err(SignalError::Config(format!("unknown strategy: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Composite(_) => "composite",
            Strategy::SmaCrossover { .. } => "sma_crossover",
            Strategy::RsiThreshold { .. } => "rsi_threshold",
            Strategy::Consensus => "consensus",
        }
    }

    /// Bars needed before this strategy can evaluate.
    pub fn min_bars(&self) -> usize {
        match self {
            Strategy::Composite(params) => params.min_bars(),
            Strategy::SmaCrossover { slow, .. } => slow + 1,
            Strategy::RsiThreshold { period, .. } => period + 1,
            Strategy::Consensus => CONSENSUS_MIN_BARS,
        }
    }

    pub fn evaluate(&self, series: &OhlcvSeries) -> Result<ScoreOutcome> {
        match self {
            Strategy::Composite(params) => ScoringEngine::evaluate(series, params),
            Strategy::SmaCrossover { fast, slow } => sma_crossover(series, *fast, *slow),
            Strategy::RsiThreshold {
                period,
                oversold,
                overbought,
            } => rsi_threshold(series, *period, *oversold, *overbought),
            Strategy::Consensus => consensus(series),
        }
    }
}

fn ensure_bars(series: &OhlcvSeries, field: &str, needed: usize) -> Result<()> {
    if series.len() < needed {
        return Err(SignalError::validation(
            field,
            format!("needs at least {} bars, series has {}", needed, series.len()),
        ));
    }
    Ok(())
}

fn sma_crossover(series: &OhlcvSeries, fast: usize, slow: usize) -> Result<ScoreOutcome> {
    if fast == 0 || fast >= slow {
        return Err(SignalError::validation(
            "fast",
            format!("fast window {} must be positive and below slow window {}", fast, slow),
        ));
    }
    ensure_bars(series, "slow", slow + 1)?;

    let bars = series.bars();
    let fast_ma = Sma::new(fast).calculate(bars);
    let slow_ma = Sma::new(slow).calculate(bars);
    let n = bars.len();

    let defined = |i: usize| -> Result<(f64, f64)> {
        match (fast_ma[i], slow_ma[i]) {
            (Some(f), Some(s)) => Ok((f, s)),
            _ => Err(SignalError::validation(
                "slow",
                "moving average undefined at the evaluation point",
            )),
        }
    };
    let (prev_fast, prev_slow) = defined(n - 2)?;
    let (curr_fast, curr_slow) = defined(n - 1)?;
    let prev_diff = prev_fast - prev_slow;
    let curr_diff = curr_fast - curr_slow;
    let strength = (curr_diff.abs() / curr_slow.max(1e-6)).min(1.0);

    let (recommendation, confidence, reason) = if prev_diff <= 0.0 && curr_diff > 0.0 {
        (
            Recommendation::Buy,
            strength,
            format!("SMA{} crossed above SMA{}", fast, slow),
        )
    } else if prev_diff >= 0.0 && curr_diff < 0.0 {
        (
            Recommendation::Sell,
            strength,
            format!("SMA{} crossed below SMA{}", fast, slow),
        )
    } else {
        (
            Recommendation::Hold,
            0.0,
            format!("No SMA{}/SMA{} crossover on the last bar", fast, slow),
        )
    };

    let mut indicators = IndicatorSnapshot::default();
    indicators.insert_scalar("close", bars[n - 1].close);
    indicators.insert_scalar("sma_fast", curr_fast);
    indicators.insert_scalar("sma_slow", curr_slow);

    Ok(ScoreOutcome {
        recommendation,
        confidence: round_confidence(confidence),
        rationale: vec![reason],
        indicators,
    })
}

fn rsi_threshold(
    series: &OhlcvSeries,
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Result<ScoreOutcome> {
    if period == 0 {
        return Err(SignalError::validation("period", "must be positive"));
    }
    if !(0.0 < oversold && oversold < overbought && overbought < 100.0) {
        return Err(SignalError::validation(
            "oversold",
            format!(
                "expected 0 < oversold ({}) < overbought ({}) < 100",
                oversold, overbought
            ),
        ));
    }
    ensure_bars(series, "period", period + 1)?;

    let bars = series.bars();
    let rsi = Rsi::new(period).latest_or_neutral(bars);

    let (recommendation, confidence, reason) = if rsi <= oversold {
        (
            Recommendation::Buy,
            ((oversold - rsi) / oversold).min(1.0),
            format!("RSI {:.1} at or below {}", rsi, oversold),
        )
    } else if rsi >= overbought {
        (
            Recommendation::Sell,
            ((rsi - overbought) / (100.0 - overbought)).min(1.0),
            format!("RSI {:.1} at or above {}", rsi, overbought),
        )
    } else {
        (
            Recommendation::Hold,
            0.0,
            format!("RSI {:.1} between {} and {}", rsi, oversold, overbought),
        )
    };

    let mut indicators = IndicatorSnapshot::default();
    if let Some(last) = series.last() {
        indicators.insert_scalar("close", last.close);
    }
    indicators.insert_scalar("rsi", rsi);

    Ok(ScoreOutcome {
        recommendation,
        confidence: round_confidence(confidence),
        rationale: vec![reason],
        indicators,
    })
}

/// Buy and sell points accumulated by the consensus rules.
#[derive(Default)]
struct Votes {
    buy: f64,
    sell: f64,
    buy_reasons: Vec<String>,
    sell_reasons: Vec<String>,
}

impl Votes {
    fn buy(&mut self, points: f64, reason: String) {
        self.buy += points;
        self.buy_reasons.push(reason);
    }

    fn sell(&mut self, points: f64, reason: String) {
        self.sell += points;
        self.sell_reasons.push(reason);
    }
}

fn consensus(series: &OhlcvSeries) -> Result<ScoreOutcome> {
    ensure_bars(series, "series", CONSENSUS_MIN_BARS)?;

    let bars = series.bars();
    let undefined = |name: &str| SignalError::validation(name, "indicator undefined at the evaluation point");
    let last = series.last().ok_or_else(|| undefined("series"))?;
    let price = last.close;

    let rsi = Rsi::default().latest_or_neutral(bars);
    let macd = Macd::default().latest(bars).ok_or_else(|| undefined("macd"))?;
    let bollinger = BollingerBands::default()
        .latest(bars)
        .ok_or_else(|| undefined("bollinger"))?;
    let stochastic = Stochastic::default()
        .latest(bars)
        .ok_or_else(|| undefined("stochastic"))?;
    let williams = WilliamsR::default()
        .latest(bars)
        .ok_or_else(|| undefined("williams_r"))?;
    let sma_20 = Sma::new(20).latest(bars).ok_or_else(|| undefined("sma_20"))?;
    let sma_50 = Sma::new(50).latest(bars).ok_or_else(|| undefined("sma_50"))?;
    let volume_ratio = VolumeRatio::default().latest(bars).unwrap_or(1.0);

    let mut votes = Votes::default();

    if rsi < 30.0 {
        votes.buy(25.0, format!("RSI oversold ({:.1})", rsi));
    } else if rsi > 70.0 {
        votes.sell(25.0, format!("RSI overbought ({:.1})", rsi));
    } else if rsi < 45.0 {
        votes.buy(10.0, format!("RSI leaning low ({:.1})", rsi));
    } else if rsi > 55.0 {
        votes.sell(10.0, format!("RSI leaning high ({:.1})", rsi));
    }

    if macd.histogram > 0.0 && macd.macd > macd.signal {
        votes.buy(20.0, "MACD bullish crossover".to_string());
    } else if macd.histogram < 0.0 && macd.macd < macd.signal {
        votes.sell(20.0, "MACD bearish crossover".to_string());
    }

    if bollinger.position < 0.2 {
        votes.buy(15.0, "Price near lower Bollinger Band".to_string());
    } else if bollinger.position > 0.8 {
        votes.sell(15.0, "Price near upper Bollinger Band".to_string());
    }

    if stochastic.k < 20.0 && stochastic.d < 20.0 {
        votes.buy(15.0, "Stochastic oversold".to_string());
    } else if stochastic.k > 80.0 && stochastic.d > 80.0 {
        votes.sell(15.0, "Stochastic overbought".to_string());
    }

    if williams < -80.0 {
        votes.buy(10.0, "Williams %R oversold".to_string());
    } else if williams > -20.0 {
        votes.sell(10.0, "Williams %R overbought".to_string());
    }

    if price > sma_20 && sma_20 > sma_50 {
        votes.buy(15.0, "Strong uptrend".to_string());
    } else if price < sma_20 && sma_20 < sma_50 {
        votes.sell(15.0, "Strong downtrend".to_string());
    }

    // high volume backs whichever side is already ahead
    if volume_ratio > 1.5 {
        let reason = format!("High volume ({:.1}x average)", volume_ratio);
        if votes.buy > votes.sell {
            votes.buy(10.0, reason);
        } else {
            votes.sell(10.0, reason);
        }
    }

    let (recommendation, strength, mut reasons) =
        if votes.buy > votes.sell && votes.buy >= CONSENSUS_THRESHOLD {
            (Recommendation::Buy, votes.buy.min(100.0), votes.buy_reasons)
        } else if votes.sell > votes.buy && votes.sell >= CONSENSUS_THRESHOLD {
            (Recommendation::Sell, votes.sell.min(100.0), votes.sell_reasons)
        } else {
            (
                Recommendation::Hold,
                50.0,
                vec!["No clear signal; market conditions unclear".to_string()],
            )
        };
    reasons.truncate(3);

    let mut indicators = IndicatorSnapshot::default();
    indicators.insert_scalar("close", price);
    indicators.insert_scalar("rsi", rsi);
    indicators.insert_scalar("sma_20", sma_20);
    indicators.insert_scalar("sma_50", sma_50);
    indicators.insert_scalar("volume_ratio", volume_ratio);
    indicators.insert_scalar("buy_score", votes.buy);
    indicators.insert_scalar("sell_score", votes.sell);
    snapshot::insert_supplementary(&mut indicators, bars, 20);

    Ok(ScoreOutcome {
        recommendation,
        confidence: round_confidence(strength / 100.0),
        rationale: reasons,
        indicators,
    })
}
