//! Primary/fallback provider coordination.

use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::Result;
use crate::sources::MarketDataProvider;
use crate::types::{OhlcvSeries, Quote, Timeframe};

/// Point-in-time failover counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverCounts {
    /// Requests that hopped from the primary to the fallback.
    pub failovers: u64,
    /// Requests where no provider produced a result.
    pub terminal_failures: u64,
}

#[derive(Debug, Default)]
struct FailoverStats {
    failovers: AtomicU64,
    terminal_failures: AtomicU64,
}

/// Routes requests to the primary provider and, on provider failure, makes
/// exactly one attempt against the fallback.
pub struct FailoverCoordinator {
    primary: Arc<dyn MarketDataProvider>,
    fallback: Option<Arc<dyn MarketDataProvider>>,
    stats: FailoverStats,
}

impl FailoverCoordinator {
    /// A fallback with the same name as the primary is dropped, so a
    /// request never hits the same provider twice.
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        fallback: Option<Arc<dyn MarketDataProvider>>,
    ) -> Self {
        let fallback = fallback.filter(|f| f.name() != primary.name());
        Self {
            primary,
            fallback,
            stats: FailoverStats::default(),
        }
    }

    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }

    pub fn fallback_name(&self) -> Option<&str> {
        self.fallback.as_ref().map(|f| f.name())
    }

    pub fn counts(&self) -> FailoverCounts {
        FailoverCounts {
            failovers: self.stats.failovers.load(Ordering::Relaxed),
            terminal_failures: self.stats.terminal_failures.load(Ordering::Relaxed),
        }
    }

    pub async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: usize,
    ) -> Result<(OhlcvSeries, String)> {
        self.run("history", symbol, move |provider| async move {
            let series = provider.get_history(symbol, timeframe, lookback).await?;
            Ok((series, provider.name().to_string()))
        })
        .await
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<(Quote, String)> {
        self.run("quote", symbol, move |provider| async move {
            let quote = provider.get_quote(symbol).await?;
            Ok((quote, provider.name().to_string()))
        })
        .await
    }

    async fn run<T, F, Fut>(&self, operation: &str, symbol: &str, call: F) -> Result<T>
    where
        F: Fn(Arc<dyn MarketDataProvider>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let primary_err = match call(self.primary.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_provider_failure() => return Err(e),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            self.stats.terminal_failures.fetch_add(1, Ordering::Relaxed);
            error!(
                symbol,
                operation,
                provider = self.primary.name(),
                error = %primary_err,
                "Provider failed and no fallback is configured"
            );
            return Err(primary_err);
        };

        self.stats.failovers.fetch_add(1, Ordering::Relaxed);
        warn!(
            symbol,
            operation,
            primary = self.primary.name(),
            fallback = fallback.name(),
            kind = primary_err.kind(),
            error = %primary_err,
            "Primary provider failed, falling back"
        );

        match call(fallback.clone()).await {
            Ok(value) => Ok(value),
            Err(fallback_err) => {
                self.stats.terminal_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    symbol,
                    operation,
                    primary = self.primary.name(),
                    fallback = fallback.name(),
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "All providers failed"
                );
                Err(fallback_err)
            }
        }
    }
}
