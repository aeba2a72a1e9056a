//! Market data providers.
//!
//! Every provider implements [`MarketDataProvider`] and normalizes its
//! payloads into [`OhlcvSeries`] and [`Quote`] before returning.

pub mod hg_brasil;
pub mod memory;
pub mod yahoo;

pub use hg_brasil::HgBrasilProvider;
pub use memory::MemoryProvider;
pub use yahoo::YahooProvider;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SignalError};
use crate::types::{OhlcvSeries, Quote, Timeframe};

/// Source of OHLCV history and quotes.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Stable provider name, used in logs and cache keys.
    fn name(&self) -> &str;

    /// Fetch up to `lookback` most recent bars, oldest first.
    async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: usize,
    ) -> Result<OhlcvSeries>;

    /// Fetch the latest quote.
    async fn get_quote(&self, symbol: &str) -> Result<Quote>;
}

/// Known provider implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Yahoo,
    HgBrasil,
    Memory,
}

impl ProviderKind {
    /// Provider used when the primary fails.
    pub const FALLBACK: ProviderKind = ProviderKind::Yahoo;

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Yahoo => "yahoo",
            ProviderKind::HgBrasil => "hg_brasil",
            ProviderKind::Memory => "memory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "hg_brasil" | "hgbrasil" => Ok(ProviderKind::HgBrasil),
            "memory" => Ok(ProviderKind::Memory),
            other => Err(SignalError::Config(format!("unknown provider: {}", other))),
        }
    }
}

/// Opaque per-provider settings such as `base_url` or `api_key`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderOptions {
    values: HashMap<String, String>,
}

impl ProviderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Value for `key`, ignoring blank entries.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Build a provider by kind.
pub fn build_provider(
    kind: ProviderKind,
    options: &ProviderOptions,
    timeout: Duration,
) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match kind {
        ProviderKind::Yahoo => Arc::new(YahooProvider::new(options, timeout)?),
        ProviderKind::HgBrasil => Arc::new(HgBrasilProvider::new(options, timeout)?),
        ProviderKind::Memory => Arc::new(MemoryProvider::new("memory")),
    };
    Ok(provider)
}

/// Build the HTTP client shared by the network providers.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (compatible; omen/0.1)")
        .build()
        .map_err(|e| SignalError::Config(format!("failed to build HTTP client: {}", e)))
}
