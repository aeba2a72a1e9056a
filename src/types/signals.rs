use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Timeframe;

/// Categorical trading recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Map a composite score (0-100) to a recommendation.
    ///
    /// Scores strictly between the two thresholds always yield HOLD.
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            Recommendation::Buy
        } else if score <= 40.0 {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most-recent value of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Scalar(f64),
    Macd {
        macd: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
        position: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
}

impl IndicatorValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            IndicatorValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

/// Indicator name to latest value, for one series and parameter set.
///
/// Built once by the scoring layer and never mutated afterwards; the map is
/// ordered so serialized snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSnapshot {
    values: BTreeMap<String, IndicatorValue>,
}

impl IndicatorSnapshot {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: IndicatorValue) {
        self.values.insert(name.into(), value);
    }

    pub(crate) fn insert_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.insert(name, IndicatorValue::Scalar(value));
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorValue> {
        self.values.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(IndicatorValue::as_scalar)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Final evaluation record handed to transport/persistence.
///
/// Fields are read-only once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    symbol: String,
    timeframe: Timeframe,
    strategy: String,
    recommendation: Recommendation,
    confidence: f64,
    rationale: Vec<String>,
    indicators: IndicatorSnapshot,
    price: f64,
    created_at: DateTime<Utc>,
}

impl Signal {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        symbol: String,
        timeframe: Timeframe,
        strategy: String,
        recommendation: Recommendation,
        confidence: f64,
        rationale: Vec<String>,
        indicators: IndicatorSnapshot,
        price: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            timeframe,
            strategy,
            recommendation,
            confidence,
            rationale,
            indicators,
            price,
            created_at,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Name of the strategy that produced this signal.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    /// Confidence in [0, 1], rounded to two decimals.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// At most three reasons, strongest first.
    pub fn rationale(&self) -> &[String] {
        &self.rationale
    }

    pub fn indicators(&self) -> &IndicatorSnapshot {
        &self.indicators
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
