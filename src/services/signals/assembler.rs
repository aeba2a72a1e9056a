//! Signal assembly.

use chrono::{DateTime, Utc};

use super::ScoreOutcome;
use crate::types::{Signal, Timeframe};

/// Combine a strategy outcome with its context into a [`Signal`].
///
/// `symbol` is normalized to upper case.
pub fn assemble(
    symbol: &str,
    timeframe: Timeframe,
    strategy: &str,
    outcome: ScoreOutcome,
    price: f64,
    created_at: DateTime<Utc>,
) -> Signal {
    Signal::new(
        symbol.trim().to_uppercase(),
        timeframe,
        strategy.to_string(),
        outcome.recommendation,
        outcome.confidence,
        outcome.rationale,
        outcome.indicators,
        price,
        created_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndicatorSnapshot, Recommendation};
    use chrono::TimeZone;

    #[test]
    fn test_assemble_copies_outcome() {
        let created_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let outcome = ScoreOutcome {
            recommendation: Recommendation::Sell,
            confidence: 0.35,
            rationale: vec!["reason".to_string()],
            indicators: IndicatorSnapshot::default(),
        };
        let signal = assemble(" petr4.sa ", Timeframe::OneDay, "composite", outcome, 31.2, created_at);
        assert_eq!(signal.symbol(), "PETR4.SA");
        assert_eq!(signal.strategy(), "composite");
        assert_eq!(signal.recommendation(), Recommendation::Sell);
        assert_eq!(signal.confidence(), 0.35);
        assert_eq!(signal.rationale(), ["reason".to_string()]);
        assert_eq!(signal.price(), 31.2);
        assert_eq!(signal.created_at(), created_at);
    }

    #[test]
    fn test_serialized_shape() {
        let created_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let outcome = ScoreOutcome {
            recommendation: Recommendation::Hold,
            confidence: 0.5,
            rationale: vec![],
            indicators: IndicatorSnapshot::default(),
        };
        let signal = assemble("VALE3.SA", Timeframe::OneHour, "composite", outcome, 60.0, created_at);
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["recommendation"], "HOLD");
        assert_eq!(json["timeframe"], "1h");
        assert!(json.get("createdAt").is_some());
    }
}
