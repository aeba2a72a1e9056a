use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SignalError;

/// Bar interval for a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h", alias = "60m")]
    OneHour,
    #[serde(rename = "1d")]
    #[default]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1wk",
            Timeframe::OneMonth => "1mo",
        }
    }

    /// Upstream (range, interval) pair for chart-style history endpoints.
    /// Intraday ranges are capped by how far back upstreams serve them.
    pub fn chart_range(&self) -> (&'static str, &'static str) {
        match self {
            Timeframe::OneMinute => ("5d", "1m"),
            Timeframe::FiveMinutes => ("1mo", "5m"),
            Timeframe::FifteenMinutes => ("2mo", "15m"),
            Timeframe::ThirtyMinutes => ("2mo", "30m"),
            Timeframe::OneHour => ("6mo", "60m"),
            Timeframe::OneDay => ("1y", "1d"),
            Timeframe::OneWeek => ("5y", "1wk"),
            Timeframe::OneMonth => ("10y", "1mo"),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Timeframe::OneMinute),
            "5m" => Ok(Timeframe::FiveMinutes),
            "15m" => Ok(Timeframe::FifteenMinutes),
            "30m" => Ok(Timeframe::ThirtyMinutes),
            "1h" | "60m" => Ok(Timeframe::OneHour),
            "1d" => Ok(Timeframe::OneDay),
            "1wk" => Ok(Timeframe::OneWeek),
            "1mo" => Ok(Timeframe::OneMonth),
            other => Err(SignalError::validation(
                "timeframe",
                format!("unknown timeframe '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn test_sixty_minutes_alias() {
        assert_eq!("60m".parse::<Timeframe>().unwrap(), Timeframe::OneHour);
        assert_eq!(Timeframe::OneHour.chart_range().1, "60m");
    }

    #[test]
    fn test_unknown_timeframe_rejected() {
        assert!("2h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_serde_uses_short_names() {
        let json = serde_json::to_string(&Timeframe::OneWeek).unwrap();
        assert_eq!(json, "\"1wk\"");
        let tf: Timeframe = serde_json::from_str("\"60m\"").unwrap();
        assert_eq!(tf, Timeframe::OneHour);
    }
}
