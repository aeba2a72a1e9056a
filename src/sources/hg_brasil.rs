//! HG Brasil Finance provider.
//!
//! Quote-only: the API has no usable OHLC history, so history requests
//! fail as unsupported and the coordinator moves on to the fallback.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{http_client, MarketDataProvider, ProviderOptions};
use crate::error::{Result, SignalError};
use crate::types::{OhlcvSeries, Quote, Timeframe};

const HG_BRASIL_URL: &str = "https://api.hgbrasil.com";

#[derive(Debug, Deserialize)]
struct StockPriceResponse {
    #[serde(default)]
    results: HashMap<String, Value>,
}

/// HG Brasil provider.
pub struct HgBrasilProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HgBrasilProvider {
    /// Options: `api_key` (may be empty for the public tier) and `base_url`.
    pub fn new(options: &ProviderOptions, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: options
                .get("base_url")
                .unwrap_or(HG_BRASIL_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: options.get("api_key").unwrap_or_default().to_string(),
        })
    }
}

/// B3 tickers are queried without the `.SA` suffix.
fn b3_ticker(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    match upper.strip_suffix(".SA") {
        Some(base) => base.to_string(),
        None => upper,
    }
}

#[async_trait]
impl MarketDataProvider for HgBrasilProvider {
    fn name(&self) -> &str {
        "hg_brasil"
    }

    async fn get_history(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        _lookback: usize,
    ) -> Result<OhlcvSeries> {
        Err(SignalError::Unsupported(format!(
            "HG Brasil has no OHLC history for {}",
            symbol
        )))
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let ticker = b3_ticker(symbol);
        let url = format!("{}/finance/stock_price", self.base_url);
        debug!("Fetching HG Brasil quote: {} ({})", url, ticker);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", ticker.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SignalError::ProviderTransport(format!(
                "HG Brasil API error: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_quote(symbol, &ticker, &body)
    }
}

fn number(value: &Value, key: &str) -> Option<f64> {
    let parsed = match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_quote(symbol: &str, ticker: &str, body: &str) -> Result<Quote> {
    let data: StockPriceResponse = serde_json::from_str(body)?;

    let entry = data
        .results
        .get(ticker)
        .or_else(|| data.results.values().next())
        .ok_or_else(|| SignalError::NoData(format!("no data for {} on HG Brasil", symbol)))?;

    if entry.get("error").and_then(Value::as_bool) == Some(true) {
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown symbol");
        return Err(SignalError::NoData(format!(
            "HG Brasil error for {}: {}",
            symbol, message
        )));
    }

    let price = number(entry, "price")
        .filter(|p| *p > 0.0)
        .ok_or_else(|| SignalError::NoData(format!("missing price for {} on HG Brasil", symbol)))?;

    Ok(Quote {
        symbol: symbol.trim().to_uppercase(),
        price,
        change: number(entry, "change_price").or_else(|| number(entry, "change")),
        pct_change: number(entry, "change_percent"),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b3_ticker_strips_suffix() {
        assert_eq!(b3_ticker("petr4.sa"), "PETR4");
        assert_eq!(b3_ticker("VALE3"), "VALE3");
    }

    #[test]
    fn test_parse_quote() {
        let body = r#"{
            "by": "symbol",
            "valid_key": true,
            "results": {
                "PETR4": {
                    "symbol": "PETR4",
                    "name": "Petrobras",
                    "price": 38.52,
                    "change_percent": 1.24,
                    "updated_at": "2024-05-10 17:07:00"
                }
            }
        }"#;
        let quote = parse_quote("PETR4.SA", "PETR4", body).unwrap();
        assert_eq!(quote.symbol, "PETR4.SA");
        assert_eq!(quote.price, 38.52);
        assert_eq!(quote.pct_change, Some(1.24));
        assert_eq!(quote.change, None);
    }

    #[test]
    fn test_error_entry_is_no_data() {
        let body = r#"{"results":{"XXXX3":{"error":true,"message":"Error to get stock price"}}}"#;
        let err = parse_quote("XXXX3", "XXXX3", body).unwrap_err();
        assert!(matches!(err, SignalError::NoData(_)));
    }

    #[test]
    fn test_empty_results_is_no_data() {
        let err = parse_quote("PETR4", "PETR4", r#"{"results":{}}"#).unwrap_err();
        assert!(matches!(err, SignalError::NoData(_)));
    }

    #[tokio::test]
    async fn test_history_is_unsupported() {
        let provider =
            HgBrasilProvider::new(&ProviderOptions::new(), Duration::from_secs(1)).unwrap();
        let err = provider
            .get_history("PETR4.SA", Timeframe::OneDay, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::Unsupported(_)));
    }
}
