use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SignalError};
use crate::services::Strategy;
use crate::sources::{ProviderKind, ProviderOptions};
use crate::types::{ScoringParametersBuilder, Timeframe};

/// Cache sizing and lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Time-to-live for cached series and quotes (seconds).
    pub ttl_secs: u64,
    /// Maximum entries per cache (0 = unbounded).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            max_entries: 1024,
        }
    }
}

/// Application configuration.
///
/// Loading never fails; values that need checking (provider name, strategy
/// name, scoring parameters) are validated when the service is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Primary provider name (default: yahoo).
    pub primary_provider: String,
    /// Symbols evaluated by the runner.
    pub default_assets: Vec<String>,
    /// Timeframe used by the runner.
    pub default_timeframe: Timeframe,
    /// Bars requested from providers.
    pub lookback: usize,
    /// Strategy name (composite, sma_crossover, rsi_threshold, consensus).
    pub strategy: String,
    pub cache: CacheConfig,
    /// Seconds between runner passes (0 = run once).
    pub run_interval_secs: u64,
    /// HTTP timeout for provider requests (seconds).
    pub request_timeout_secs: u64,
    /// Yahoo Finance base URL override.
    pub yahoo_base_url: Option<String>,
    /// HG Brasil API key.
    pub hg_api_key: Option<String>,
    /// HG Brasil base URL override.
    pub hg_base_url: Option<String>,
    /// Composite scoring overrides; unset fields keep their defaults.
    pub scoring: ScoringParametersBuilder,
    /// Variables that were set but did not parse, as `KEY="raw"`.
    pub parse_errors: Vec<String>,
}

/// Reads variables through `lookup`, remembering the ones that fail to parse.
struct EnvReader<F> {
    lookup: F,
    errors: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed<T: FromStr>(&mut self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.push(format!("{}={:?}", key, raw));
                None
            }
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();
        let mut vars = EnvReader {
            lookup,
            errors: Vec::new(),
        };

        let default_assets = vars
            .raw("DEFAULT_ASSETS")
            .map(|s| {
                s.split(',')
                    .map(|a| a.trim().to_uppercase())
                    .filter(|a| !a.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|assets| !assets.is_empty())
            .unwrap_or(defaults.default_assets);

        let scoring = ScoringParametersBuilder {
            short_window: vars.parsed("SHORT_WINDOW"),
            long_window: vars.parsed("LONG_WINDOW"),
            rsi_period: vars.parsed("RSI_PERIOD"),
            rsi_overbought: vars.parsed("RSI_OVERBOUGHT"),
            rsi_oversold: vars.parsed("RSI_OVERSOLD"),
            volume_window: vars.parsed("VOLUME_WINDOW"),
            volatility_window: vars.parsed("VOLATILITY_WINDOW"),
        };

        Self {
            primary_provider: vars.raw("PRIMARY_PROVIDER").unwrap_or(defaults.primary_provider),
            default_assets,
            default_timeframe: vars
                .parsed("DEFAULT_TIMEFRAME")
                .unwrap_or(defaults.default_timeframe),
            lookback: vars.parsed("LOOKBACK").unwrap_or(defaults.lookback),
            strategy: vars.raw("STRATEGY").unwrap_or(defaults.strategy),
            cache: CacheConfig {
                ttl_secs: vars.parsed("CACHE_TTL_SECS").unwrap_or(defaults.cache.ttl_secs),
                max_entries: vars
                    .parsed("CACHE_MAX_ENTRIES")
                    .unwrap_or(defaults.cache.max_entries),
            },
            run_interval_secs: vars
                .parsed("RUN_INTERVAL_SECS")
                .unwrap_or(defaults.run_interval_secs),
            request_timeout_secs: vars
                .parsed("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            yahoo_base_url: vars.raw("YAHOO_BASE_URL"),
            hg_api_key: vars.raw("HG_API_KEY"),
            hg_base_url: vars.raw("HG_BASE_URL"),
            scoring,
            parse_errors: vars.errors,
        }
    }

    /// Built-in defaults, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            primary_provider: "yahoo".to_string(),
            default_assets: vec![
                "PETR4.SA".to_string(),
                "VALE3.SA".to_string(),
                "BBDC4.SA".to_string(),
            ],
            default_timeframe: Timeframe::OneDay,
            lookback: 200,
            strategy: "composite".to_string(),
            cache: CacheConfig::default(),
            run_interval_secs: 0,
            request_timeout_secs: 10,
            yahoo_base_url: None,
            hg_api_key: None,
            hg_base_url: None,
            scoring: ScoringParametersBuilder::default(),
            parse_errors: Vec::new(),
        }
    }

    pub fn primary_kind(&self) -> Result<ProviderKind> {
        self.primary_provider.parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Options handed to the provider of `kind`.
    pub fn provider_options(&self, kind: ProviderKind) -> ProviderOptions {
        let mut options = ProviderOptions::new();
        let set = |options: ProviderOptions, key: &str, value: &Option<String>| match value {
            Some(v) => options.with(key, v.as_str()),
            None => options,
        };
        match kind {
            ProviderKind::Yahoo => {
                options = set(options, "base_url", &self.yahoo_base_url);
            }
            ProviderKind::HgBrasil => {
                options = set(options, "api_key", &self.hg_api_key);
                options = set(options, "base_url", &self.hg_base_url);
            }
            ProviderKind::Memory => {}
        }
        options
    }

    /// Reject settings that would make every evaluation fail.
    pub fn validate(&self) -> Result<()> {
        if !self.parse_errors.is_empty() {
            return Err(SignalError::Config(format!(
                "malformed environment values: {}",
                self.parse_errors.join(", ")
            )));
        }
        self.primary_kind()?;
        if self.lookback == 0 {
            return Err(SignalError::Config("LOOKBACK must be positive".to_string()));
        }
        let params = self
            .scoring
            .clone()
            .build()
            .map_err(|e| SignalError::Config(e.to_string()))?;
        Strategy::from_name(&self.strategy, params)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
