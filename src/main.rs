use anyhow::Context;
use omen::{Config, SignalService, Timeframe};
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the signals
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        primary = %config.primary_provider,
        assets = config.default_assets.len(),
        timeframe = %config.default_timeframe,
        interval_secs = config.run_interval_secs,
        "Starting Omen"
    );

    let service = SignalService::from_config(&config).context("invalid configuration")?;
    let requests: Vec<(String, Timeframe)> = config
        .default_assets
        .iter()
        .map(|symbol| (symbol.clone(), config.default_timeframe))
        .collect();

    if config.run_interval_secs == 0 {
        return run_pass(&service, &requests).await;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.run_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => run_pass(&service, &requests).await?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }
    Ok(())
}

/// Evaluate every request once and print each signal as a JSON line.
async fn run_pass(service: &SignalService, requests: &[(String, Timeframe)]) -> anyhow::Result<()> {
    for entry in service.evaluate_batch(requests).await {
        match entry.result {
            Ok(signal) => println!("{}", serde_json::to_string(&signal)?),
            Err(e) => error!(
                symbol = %entry.symbol,
                timeframe = %entry.timeframe,
                kind = e.kind(),
                error = %e,
                "Evaluation failed"
            ),
        }
    }

    let counts = service.failover_counts();
    debug!(
        failovers = counts.failovers,
        terminal_failures = counts.terminal_failures,
        "Pass complete"
    );
    Ok(())
}
