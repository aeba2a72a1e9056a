//! Yahoo Finance chart API provider.
//!
//! Serves OHLCV history for every supported timeframe and quotes from the
//! chart metadata. B3 symbols keep their `.SA` suffix.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, MarketDataProvider, ProviderOptions};
use crate::error::{Result, SignalError};
use crate::types::{Bar, OhlcvSeries, Quote, Timeframe};

const YAHOO_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Options: `base_url` overrides the API host.
    pub fn new(options: &ProviderOptions, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: options
                .get("base_url")
                .unwrap_or(YAHOO_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<String> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            self.base_url,
            symbol.trim().to_uppercase(),
            range,
            interval
        );
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // unknown symbols come back as 404 with a chart.error payload
        if status == StatusCode::NOT_FOUND {
            return Err(match parse_chart(&body) {
                Err(e @ SignalError::NoData(_)) => e,
                _ => SignalError::NoData(format!("{} not found on Yahoo", symbol)),
            });
        }
        if !status.is_success() {
            return Err(SignalError::ProviderTransport(format!(
                "Yahoo API error: {}",
                status
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: usize,
    ) -> Result<OhlcvSeries> {
        let (range, interval) = timeframe.chart_range();
        let body = self.fetch_chart(symbol, range, interval).await?;
        parse_history(symbol, &body, lookback)
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let body = self.fetch_chart(symbol, "5d", "1d").await?;
        parse_quote(symbol, &body)
    }
}

fn parse_chart(body: &str) -> Result<ChartResult> {
    let data: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = data.chart.error {
        return Err(SignalError::NoData(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    data.chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SignalError::NoData("empty chart result".to_string()))
}

fn chart_bars(result: ChartResult) -> Vec<Bar> {
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // partially filled rows (halts, the live bar) are skipped
        let (Some(open), Some(high), Some(low), Some(close)) =
            (at(&opens, i), at(&highs, i), at(&lows, i), at(&closes, i))
        else {
            continue;
        };
        if ![open, high, low, close].iter().all(|p| p.is_finite()) {
            continue;
        }
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        let volume = at(&volumes, i).filter(|v| v.is_finite() && *v >= 0.0);

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: volume.unwrap_or(0.0),
        });
    }
    bars
}

fn parse_history(symbol: &str, body: &str, lookback: usize) -> Result<OhlcvSeries> {
    let series = OhlcvSeries::from_raw(chart_bars(parse_chart(body)?), lookback)?;
    if series.is_empty() {
        return Err(SignalError::NoData(format!(
            "empty history for {} on Yahoo",
            symbol
        )));
    }
    Ok(series)
}

fn parse_quote(symbol: &str, body: &str) -> Result<Quote> {
    let result = parse_chart(body)?;
    let meta_price = result.meta.regular_market_price;
    let previous = result.meta.chart_previous_close.or(result.meta.previous_close);
    let market_time = result
        .meta
        .regular_market_time
        .and_then(|t| Utc.timestamp_opt(t, 0).single());
    let last_bar = chart_bars(result).pop();

    let price = meta_price
        .or(last_bar.map(|b| b.close))
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| SignalError::NoData(format!("no quote for {} on Yahoo", symbol)))?;

    let change = previous.filter(|p| *p > 0.0).map(|p| price - p);
    let pct_change = previous
        .filter(|p| *p > 0.0)
        .map(|p| (price - p) / p * 100.0);

    Ok(Quote {
        symbol: symbol.trim().to_uppercase(),
        price,
        change,
        pct_change,
        timestamp: market_time
            .or(last_bar.map(|b| b.timestamp))
            .unwrap_or_else(Utc::now),
    })
}
