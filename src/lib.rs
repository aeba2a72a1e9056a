//! Omen - technical-analysis trading signals for B3 equities.
//!
//! Fetches OHLCV history from market data providers with single-hop
//! failover, scores it with a weighted-factor model (or an alternative
//! strategy) and produces BUY / SELL / HOLD signals with a confidence,
//! rationale and indicator snapshot.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{Result, SignalError};
pub use services::{
    BatchEntry, Cache, Clock, FailoverCoordinator, FailoverCounts, ManualClock, ScoreOutcome,
    ScoringEngine, ServiceOptions, SignalService, Strategy, SystemClock,
};
pub use sources::{MarketDataProvider, ProviderKind, ProviderOptions};
pub use types::*;
