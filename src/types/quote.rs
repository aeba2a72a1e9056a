use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest quote for a symbol, normalized across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<f64>,
    pub timestamp: DateTime<Utc>,
}
