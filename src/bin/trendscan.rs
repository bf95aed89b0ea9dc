//! Trendscan
//!
//! Scans crypto and forex symbols for SAR+SMA and SuperTrend-MA signals,
//! either once (`SCAN_MODE=once`) or on a fixed interval until Ctrl-C.

use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use trendscan::config::{get_environment, ScannerConfig};
use trendscan::core::{ScanScheduler, Scanner};
use trendscan::logging;
use trendscan::metrics::Metrics;
use trendscan::services::{HttpMarketDataProvider, JsonFileSink, LogSink, MarketDataProvider};
use trendscan::signals::SignalEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = ScannerConfig::load()?;
    info!("Starting Trendscan");
    info!(environment = %get_environment(), "Environment");
    info!(
        timeframe = %config.scan.timeframe,
        interval_minutes = config.scan.interval_minutes,
        strategies = ?config.scan.active_strategies,
        crypto = config.scan.scan_crypto,
        forex = config.scan.scan_forex,
        "Scan configuration"
    );

    let metrics = Arc::new(Metrics::new()?);
    let engine = SignalEngine::new(config.engine)?;
    info!(
        sar_sma = ?engine.config().sar_sma,
        supertrend_ma = ?engine.config().supertrend_ma,
        "Engine parameters"
    );
    let provider: Arc<dyn MarketDataProvider> = Arc::new(HttpMarketDataProvider::new()?);

    let mut scanner = Scanner::new(config.scan.clone(), engine, provider).with_metrics(metrics.clone());
    if config.sink.log_signals {
        scanner = scanner.with_sink(Arc::new(LogSink));
    }
    if let Some(path) = &config.sink.signals_file {
        info!(path = %path.display(), "Saving signals to {}", path.display());
        scanner = scanner.with_sink(Arc::new(JsonFileSink::new(path.clone())));
    }
    let scanner = Arc::new(scanner);

    let mode = env::var("SCAN_MODE").unwrap_or_default();
    if mode.eq_ignore_ascii_case("once") {
        let report = scanner.scan().await;
        println!(
            "Scan finished in {:.1}s: {} signals, {} evaluated, {} skipped",
            report.duration.as_secs_f64(),
            report.signals.len(),
            report.evaluated,
            report.skipped
        );
        for signal in &report.signals {
            println!(
                "  {:<10} {:<14} {:<5} @ {}  tp1 {}  tp2 {}  sl {}",
                signal.symbol,
                signal.strategy,
                signal.direction,
                signal.price,
                signal.levels.tp1,
                signal.levels.tp2,
                signal.levels.stop_loss
            );
        }
        return Ok(());
    }

    let scheduler = ScanScheduler::new(scanner, config.scan.interval_minutes)?;
    info!("Scanner running, waiting for shutdown signal...");
    scheduler.run_until_shutdown().await?;

    match metrics.render() {
        Ok(text) => info!(metrics = %text, "Final metrics"),
        Err(e) => warn!(error = %e, "Failed to render metrics"),
    }
    info!("Trendscan stopped");
    Ok(())
}
