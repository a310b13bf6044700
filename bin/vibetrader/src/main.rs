mod settings;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, EngineState, LogFormat};
use engine::{Engine, EngineHandle};
use paper::PaperSink;
use settings::Settings;
use strategy::build_strategies;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("Invalid environment configuration")?;

    // ── Logging ──────────────────────────────────────────────────────────────
    init_logging(cfg.log_format);
    info!(config = %cfg.config_path.display(), "VibeTrader starting");

    let settings = Settings::load(&cfg.config_path)?;

    // ── Strategies ────────────────────────────────────────────────────────────
    let strategies = build_strategies(&settings.strategies).context("Invalid strategy configuration")?;
    if strategies.is_empty() {
        warn!("No strategies configured; observations will only be recorded");
    }

    // ── Source + sink ─────────────────────────────────────────────────────────
    let source = settings
        .source
        .build(&settings.engine.symbol)
        .context("Invalid source configuration")?;
    let sink = Arc::new(PaperSink::new(cfg.paper_slippage_bps));

    // ── Engine ────────────────────────────────────────────────────────────────
    let (mut engine, handle) = Engine::new(&settings.engine, source, strategies, sink.clone())?;

    if cfg.stats_interval_secs > 0 {
        tokio::spawn(report_stats(handle.clone(), Duration::from_secs(cfg.stats_interval_secs)));
    }

    let stopper = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                stopper.stop().await;
            }
            Err(e) => warn!(error = %e, "Unable to listen for shutdown signal"),
        }
    });

    let outcome = engine.start().await;

    let stats = handle.stats().await;
    info!(
        executions = sink.executions().await.len(),
        retained = engine.history().len(),
        "Final statistics\n{stats}"
    );

    outcome.context("Engine stopped on a fatal error")?;
    info!("VibeTrader exited cleanly");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
    }
}

/// Log the statistics report every `period` until the engine stops.
async fn report_stats(handle: EngineHandle, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await; // the first tick completes immediately
    loop {
        ticker.tick().await;
        if handle.state().await == EngineState::Stopped {
            break;
        }
        info!("Statistics\n{}", handle.stats().await);
    }
}
