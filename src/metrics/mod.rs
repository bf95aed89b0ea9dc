//! Prometheus metrics for the scanner.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub scan_runs_total: IntCounter,
    pub symbols_evaluated_total: IntCounter,
    pub symbols_skipped_total: IntCounter,
    pub signals_emitted_total: IntCounterVec,
    pub scan_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scan_runs_total = IntCounter::new("scan_runs_total", "Completed scan runs")?;
        let symbols_evaluated_total = IntCounter::new(
            "symbols_evaluated_total",
            "Symbol and strategy pairs evaluated",
        )?;
        let symbols_skipped_total = IntCounter::new(
            "symbols_skipped_total",
            "Symbol and strategy pairs skipped on fetch or compute failure",
        )?;
        let signals_emitted_total = IntCounterVec::new(
            Opts::new("signals_emitted_total", "Signals emitted by strategy"),
            &["strategy"],
        )?;
        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("scan_duration_seconds", "Wall time of a full scan")
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        registry.register(Box::new(scan_runs_total.clone()))?;
        registry.register(Box::new(symbols_evaluated_total.clone()))?;
        registry.register(Box::new(symbols_skipped_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            scan_runs_total,
            symbols_evaluated_total,
            symbols_skipped_total,
            signals_emitted_total,
            scan_duration_seconds,
        })
    }

    /// Text exposition format of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
