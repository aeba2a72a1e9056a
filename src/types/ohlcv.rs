use crate::error::{Result, SignalError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar in the canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn check(&self, index: usize) -> Result<()> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(SignalError::validation(
                "series",
                format!("bar {} has a non-finite price", index),
            ));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(SignalError::validation(
                "series",
                format!("bar {} has invalid volume {}", index, self.volume),
            ));
        }
        Ok(())
    }
}

/// Time-ordered bars with strictly increasing timestamps.
///
/// Construction validates ordering and numeric sanity, so every series in
/// circulation is safe to feed to the indicator library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvSeries {
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    /// Validate and wrap already-ordered bars.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            bar.check(i)?;
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(SignalError::validation(
                    "series",
                    format!("timestamps must be strictly increasing (bar {})", i),
                ));
            }
        }
        Ok(Self { bars })
    }

    /// Normalize raw provider output: drop bars without a positive close,
    /// sort by time, keep the last bar for duplicate timestamps, and retain
    /// only the most recent `lookback` bars (`0` keeps everything).
    pub fn from_raw(mut bars: Vec<Bar>, lookback: usize) -> Result<Self> {
        bars.retain(|b| b.close.is_finite() && b.close > 0.0);
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        if lookback > 0 && deduped.len() > lookback {
            deduped.drain(..deduped.len() - lookback);
        }

        Self::new(deduped)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
