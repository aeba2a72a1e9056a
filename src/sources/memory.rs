//! In-memory provider.
//!
//! Serves fixed histories and quotes and can be told to fail, which makes
//! it the test double for the failover and service layers. Also usable for
//! offline runs.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::MarketDataProvider;
use crate::error::{Result, SignalError};
use crate::types::{OhlcvSeries, Quote, Timeframe};

/// Failure a [`MemoryProvider`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoData,
    Unsupported,
    Transport,
}

impl FailureKind {
    fn to_error(self, provider: &str, symbol: &str) -> SignalError {
        match self {
            FailureKind::NoData => {
                SignalError::NoData(format!("{} has no data for {}", provider, symbol))
            }
            FailureKind::Unsupported => {
                SignalError::Unsupported(format!("{} cannot serve {}", provider, symbol))
            }
            FailureKind::Transport => {
                SignalError::ProviderTransport(format!("{} timed out for {}", provider, symbol))
            }
        }
    }
}

/// Provider backed by in-process maps.
pub struct MemoryProvider {
    name: String,
    histories: DashMap<String, OhlcvSeries>,
    quotes: DashMap<String, Quote>,
    failure: RwLock<Option<FailureKind>>,
    history_calls: AtomicUsize,
    quote_calls: AtomicUsize,
}

fn history_key(symbol: &str, timeframe: Timeframe) -> String {
    format!("{}:{}", symbol.trim().to_uppercase(), timeframe)
}

impl MemoryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            histories: DashMap::new(),
            quotes: DashMap::new(),
            failure: RwLock::new(None),
            history_calls: AtomicUsize::new(0),
            quote_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_history(self, symbol: &str, timeframe: Timeframe, series: OhlcvSeries) -> Self {
        self.insert_history(symbol, timeframe, series);
        self
    }

    pub fn with_quote(self, quote: Quote) -> Self {
        self.insert_quote(quote);
        self
    }

    /// Fail every request with `kind`.
    pub fn failing(self, kind: FailureKind) -> Self {
        self.set_failure(Some(kind));
        self
    }

    pub fn insert_history(&self, symbol: &str, timeframe: Timeframe, series: OhlcvSeries) {
        self.histories.insert(history_key(symbol, timeframe), series);
    }

    pub fn insert_quote(&self, quote: Quote) {
        self.quotes.insert(quote.symbol.trim().to_uppercase(), quote);
    }

    /// Switch failure injection on or off.
    pub fn set_failure(&self, kind: Option<FailureKind>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = kind;
        }
    }

    /// Number of history requests received, including failed ones.
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Number of quote requests received, including failed ones.
    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    fn injected_failure(&self, symbol: &str) -> Result<()> {
        let failure = self.failure.read().ok().and_then(|f| *f);
        match failure {
            Some(kind) => Err(kind.to_error(&self.name, symbol)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketDataProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: usize,
    ) -> Result<OhlcvSeries> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.injected_failure(symbol)?;

        let series = self
            .histories
            .get(&history_key(symbol, timeframe))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                SignalError::NoData(format!(
                    "{} has no {} history for {}",
                    self.name, timeframe, symbol
                ))
            })?;

        if lookback > 0 && series.len() > lookback {
            return OhlcvSeries::from_raw(series.bars().to_vec(), lookback);
        }
        Ok(series)
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.injected_failure(symbol)?;

        self.quotes
            .get(&symbol.trim().to_uppercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SignalError::NoData(format!("{} has no quote for {}", self.name, symbol)))
    }
}
