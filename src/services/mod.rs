pub mod cache;
pub mod clock;
pub mod failover;
pub mod signal_service;
pub mod signals;

pub use cache::Cache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use failover::{FailoverCoordinator, FailoverCounts};
pub use signal_service::{BatchEntry, ServiceOptions, SignalService};
pub use signals::{ScoreOutcome, ScoringEngine, Strategy};
