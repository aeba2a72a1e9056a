//! Signal evaluation service.
//!
//! Fetches history through the failover coordinator (with caching), runs a
//! strategy over it and assembles the resulting [`Signal`].

use chrono::Duration;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::{quote_key, series_key, Cache};
use super::clock::{Clock, SystemClock};
use super::failover::{FailoverCoordinator, FailoverCounts};
use super::signals::{assemble, Strategy};
use crate::config::Config;
use crate::error::{Result, SignalError};
use crate::sources::{build_provider, ProviderKind};
use crate::types::{OhlcvSeries, Quote, ScoringParameters, Signal, Timeframe};

/// One year; longer TTLs are clamped.
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Tunables for [`SignalService`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    /// Bars requested per history fetch.
    pub lookback: usize,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    /// Strategy used when a request names none.
    pub strategy: Strategy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            lookback: 200,
            cache_ttl: Duration::seconds(60),
            cache_max_entries: 1024,
            strategy: Strategy::default(),
        }
    }
}

/// Outcome of one request in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub result: Result<Signal>,
}

/// Evaluates symbols into signals.
pub struct SignalService {
    coordinator: FailoverCoordinator,
    history_cache: Cache<OhlcvSeries>,
    quote_cache: Cache<Quote>,
    clock: Arc<dyn Clock>,
    lookback: usize,
    strategy: Strategy,
}

impl SignalService {
    pub fn new(coordinator: FailoverCoordinator, clock: Arc<dyn Clock>, options: ServiceOptions) -> Self {
        Self {
            history_cache: Cache::new(options.cache_ttl, options.cache_max_entries, clock.clone()),
            quote_cache: Cache::new(options.cache_ttl, options.cache_max_entries, clock.clone()),
            coordinator,
            clock,
            lookback: options.lookback,
            strategy: options.strategy,
        }
    }

    /// Build the service from configuration: primary provider by name,
    /// `yahoo` as fallback, system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let timeout = config.request_timeout();
        let primary_kind = config.primary_kind()?;
        let primary = build_provider(primary_kind, &config.provider_options(primary_kind), timeout)?;
        let fallback_kind = ProviderKind::FALLBACK;
        let fallback = if fallback_kind == primary_kind {
            None
        } else {
            Some(build_provider(
                fallback_kind,
                &config.provider_options(fallback_kind),
                timeout,
            )?)
        };

        let params = config
            .scoring
            .clone()
            .build()
            .map_err(|e| SignalError::Config(e.to_string()))?;
        let strategy = Strategy::from_name(&config.strategy, params)?;

        info!(
            primary = primary.name(),
            fallback = fallback.as_ref().map(|f| f.name()).unwrap_or("none"),
            strategy = strategy.name(),
            "Signal service configured"
        );

        let ttl_secs = config.cache.ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        Ok(Self::new(
            FailoverCoordinator::new(primary, fallback),
            Arc::new(SystemClock),
            ServiceOptions {
                lookback: config.lookback,
                cache_ttl: Duration::seconds(ttl_secs),
                cache_max_entries: config.cache.max_entries,
                strategy,
            },
        ))
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn failover_counts(&self) -> FailoverCounts {
        self.coordinator.counts()
    }

    /// History for `symbol`, from cache when fresh.
    pub async fn history(&self, symbol: &str, timeframe: Timeframe, lookback: usize) -> Result<OhlcvSeries> {
        let symbol = normalize_symbol(symbol)?;
        let key = series_key(self.coordinator.primary_name(), &symbol, timeframe, lookback);
        if let Some(series) = self.history_cache.get(&key) {
            debug!(symbol = %symbol, timeframe = %timeframe, "History cache hit");
            return Ok(series);
        }

        let (series, provider) = self
            .coordinator
            .fetch_history(&symbol, timeframe, lookback)
            .await?;
        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            provider = %provider,
            bars = series.len(),
            "History fetched"
        );
        self.history_cache.set(key, series.clone());
        Ok(series)
    }

    /// Latest quote for `symbol`, from cache when fresh.
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = normalize_symbol(symbol)?;
        let key = quote_key(self.coordinator.primary_name(), &symbol);
        if let Some(quote) = self.quote_cache.get(&key) {
            return Ok(quote);
        }

        let (quote, _) = self.coordinator.fetch_quote(&symbol).await?;
        self.quote_cache.set(key, quote.clone());
        Ok(quote)
    }

    /// Evaluate with the composite model, using `params` or the configured
    /// strategy when `params` is `None`.
    pub async fn evaluate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        params: Option<ScoringParameters>,
    ) -> Result<Signal> {
        match params {
            Some(params) => {
                self.evaluate_with(symbol, timeframe, &Strategy::Composite(params))
                    .await
            }
            None => self.evaluate_with(symbol, timeframe, &self.strategy).await,
        }
    }

    pub async fn evaluate_with(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        strategy: &Strategy,
    ) -> Result<Signal> {
        let lookback = self.lookback.max(strategy.min_bars());
        let series = self.history(symbol, timeframe, lookback).await?;

        let outcome = match strategy.evaluate(&series) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    symbol,
                    timeframe = %timeframe,
                    strategy = strategy.name(),
                    bars = series.len(),
                    error = %e,
                    "Signal evaluation rejected"
                );
                return Err(e);
            }
        };

        let price = series
            .last()
            .map(|bar| bar.close)
            .ok_or_else(|| SignalError::NoData(format!("empty history for {}", symbol)))?;
        let signal = assemble(
            symbol,
            timeframe,
            strategy.name(),
            outcome,
            price,
            self.clock.now(),
        );

        info!(
            symbol = signal.symbol(),
            timeframe = %timeframe,
            strategy = signal.strategy(),
            recommendation = %signal.recommendation(),
            confidence = signal.confidence(),
            "Signal generated"
        );
        Ok(signal)
    }

    /// Evaluate several requests concurrently.
    ///
    /// Entries come back in request order; one failure does not affect the
    /// others.
    pub async fn evaluate_batch(&self, requests: &[(String, Timeframe)]) -> Vec<BatchEntry> {
        let evaluations = requests.iter().map(|(symbol, timeframe)| async move {
            BatchEntry {
                symbol: symbol.clone(),
                timeframe: *timeframe,
                result: self.evaluate(symbol, *timeframe, None).await,
            }
        });
        join_all(evaluations).await
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(SignalError::validation("symbol", "must not be empty"));
    }
    Ok(symbol)
}
