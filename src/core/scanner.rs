//! Scan orchestrator
//!
//! Resolves the symbol universe, fetches candles for every symbol with
//! bounded concurrency, runs each active strategy through the signal engine
//! and hands the resulting signals to the configured sinks.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::ScanSettings;
use crate::metrics::Metrics;
use crate::models::signal::{MarketType, Signal, StrategyKind};
use crate::services::market_data::MarketDataProvider;
use crate::services::sink::SignalSink;
use crate::signals::SignalEngine;
use crate::strategies::EvaluationContext;

/// Used when the 24h ticker cannot be fetched.
pub const FALLBACK_CRYPTO_SYMBOLS: [&str; 20] = [
    "BTCUSDT", "ETHUSDT", "ADAUSDT", "SOLUSDT", "XRPUSDT", "DOGEUSDT", "AVAXUSDT", "MATICUSDT",
    "LINKUSDT", "UNIUSDT", "LTCUSDT", "BCHUSDT", "XLMUSDT", "VETUSDT", "FILUSDT", "DOTUSDT",
    "TRXUSDT", "EOSUSDT", "XMRUSDT", "NEARUSDT",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub symbol: String,
    pub market_type: MarketType,
}

impl ScanTarget {
    pub fn new(symbol: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            symbol: symbol.into(),
            market_type,
        }
    }
}

/// Outcome of one scan over the whole universe.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Signals in universe order.
    pub signals: Vec<Signal>,
    /// (symbol, strategy) pairs evaluated to completion.
    pub evaluated: usize,
    /// (symbol, strategy) pairs dropped on fetch or compute failure.
    pub skipped: usize,
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct TargetOutcome {
    signals: Vec<Signal>,
    evaluated: usize,
    skipped: usize,
}

pub struct Scanner {
    settings: Arc<ScanSettings>,
    engine: Arc<SignalEngine>,
    provider: Arc<dyn MarketDataProvider>,
    sinks: Vec<Arc<dyn SignalSink>>,
    metrics: Option<Arc<Metrics>>,
}

impl Scanner {
    pub fn new(
        settings: ScanSettings,
        engine: SignalEngine,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            engine: Arc::new(engine),
            provider,
            sinks: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Crypto pairs by volume (or the fallback list) followed by the forex pairs.
    pub async fn universe(&self) -> Vec<ScanTarget> {
        let mut targets = Vec::new();

        if self.settings.scan_crypto {
            let limit = self.settings.crypto_top_coins;
            let symbols = match self
                .provider
                .top_crypto_symbols(limit, self.settings.min_volume)
                .await
            {
                Ok(symbols) if !symbols.is_empty() => symbols,
                Ok(_) => {
                    warn!("Scanner: no crypto pairs above minimum volume, using fallback list");
                    fallback_crypto(limit)
                }
                Err(e) => {
                    warn!(error = %e, "Scanner: failed to fetch crypto ranking, using fallback list");
                    fallback_crypto(limit)
                }
            };
            targets.extend(
                symbols
                    .into_iter()
                    .map(|s| ScanTarget::new(s, MarketType::Crypto)),
            );
        }

        if self.settings.scan_forex {
            targets.extend(
                self.settings
                    .forex_pairs
                    .iter()
                    .map(|s| ScanTarget::new(s.clone(), MarketType::Forex)),
            );
        }

        targets
    }

    /// Scan the configured universe and publish the signals found.
    pub async fn scan(&self) -> ScanReport {
        let targets = self.universe().await;
        self.scan_targets(targets).await
    }

    /// Scan an explicit list of targets and publish the signals found.
    pub async fn scan_targets(&self, targets: Vec<ScanTarget>) -> ScanReport {
        let started = Instant::now();
        info!(
            targets = targets.len(),
            strategies = ?self.settings.active_strategies,
            timeframe = %self.settings.timeframe,
            "Scanner: starting scan of {} symbols",
            targets.len()
        );

        let mut outcomes: Vec<(usize, TargetOutcome)> = stream::iter(targets.into_iter().enumerate())
            .map(|(index, target)| async move { (index, self.scan_target(&target).await) })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = ScanReport::default();
        for (_, outcome) in outcomes {
            report.evaluated += outcome.evaluated;
            report.skipped += outcome.skipped;
            report.signals.extend(outcome.signals);
        }
        report.duration = started.elapsed();

        self.publish(&report.signals).await;
        self.record(&report);

        info!(
            signals = report.signals.len(),
            evaluated = report.evaluated,
            skipped = report.skipped,
            duration_ms = report.duration.as_millis() as u64,
            "Scanner: scan complete, {} signals from {} evaluations ({} skipped)",
            report.signals.len(),
            report.evaluated,
            report.skipped
        );
        report
    }

    async fn scan_target(&self, target: &ScanTarget) -> TargetOutcome {
        let strategies = &self.settings.active_strategies;
        let mut outcome = TargetOutcome::default();

        // one fetch covers every strategy; each then sees its own window
        let limit = strategies
            .iter()
            .map(|&kind| self.settings.candles_for(kind))
            .max()
            .unwrap_or(0);

        let fetched = self
            .provider
            .get_candles(
                &target.symbol,
                target.market_type,
                &self.settings.timeframe,
                limit,
            )
            .await;
        tokio::time::sleep(self.delay_for(target.market_type)).await;

        let series = match fetched {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    symbol = %target.symbol,
                    market_type = %target.market_type,
                    error = %e,
                    "Scanner: skipping {}, candle fetch failed",
                    target.symbol
                );
                outcome.skipped = strategies.len();
                return outcome;
            }
        };

        let ctx = EvaluationContext::new(
            &target.symbol,
            target.market_type,
            &self.settings.timeframe,
        );
        for &kind in strategies {
            let mut window = series.clone();
            window.truncate_front(self.settings.candles_for(kind));
            match self.engine.evaluate(kind, &window, &ctx) {
                Ok(Some(signal)) => {
                    outcome.evaluated += 1;
                    outcome.signals.push(signal);
                }
                Ok(None) => outcome.evaluated += 1,
                Err(e) => {
                    debug!(
                        symbol = %target.symbol,
                        strategy = %kind,
                        error = %e,
                        "Scanner: skipping {} for {}",
                        kind,
                        target.symbol
                    );
                    outcome.skipped += 1;
                }
            }
        }
        outcome
    }

    fn delay_for(&self, market_type: MarketType) -> Duration {
        match market_type {
            MarketType::Crypto => Duration::from_millis(self.settings.crypto_delay_ms),
            MarketType::Forex => Duration::from_millis(self.settings.forex_delay_ms),
        }
    }

    async fn publish(&self, signals: &[Signal]) {
        if signals.is_empty() {
            return;
        }
        for sink in &self.sinks {
            if let Err(e) = sink.publish(signals).await {
                error!(
                    sink = sink.name(),
                    error = %e,
                    "Scanner: failed to publish {} signals to {}",
                    signals.len(),
                    sink.name()
                );
            }
        }
    }

    fn record(&self, report: &ScanReport) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        metrics.scan_runs_total.inc();
        metrics.symbols_evaluated_total.inc_by(report.evaluated as u64);
        metrics.symbols_skipped_total.inc_by(report.skipped as u64);
        metrics
            .scan_duration_seconds
            .observe(report.duration.as_secs_f64());
        for kind in StrategyKind::ALL {
            let count = report.signals.iter().filter(|s| s.strategy == kind).count();
            if count > 0 {
                let label = kind.to_string();
                metrics
                    .signals_emitted_total
                    .with_label_values(&[label.as_str()])
                    .inc_by(count as u64);
            }
        }
    }
}

fn fallback_crypto(limit: usize) -> Vec<String> {
    FALLBACK_CRYPTO_SYMBOLS
        .iter()
        .take(limit)
        .map(|s| s.to_string())
        .collect()
}
