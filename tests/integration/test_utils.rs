//! Shared fixtures: candle generators, an in-memory provider and sinks.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use trendscan::common::math;
use trendscan::config::ScanSettings;
use trendscan::models::indicators::{Candle, CandleSeries};
use trendscan::models::signal::{
    IndicatorSnapshot, MarketType, Signal, SignalConditions, SignalDirection, StrategyKind,
    TradeLevels,
};
use trendscan::services::market_data::{MarketDataError, MarketDataProvider};
use trendscan::services::sink::{SignalSink, SinkError};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
}

pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Candle::new(
                close,
                close + 0.5,
                close - 0.5,
                close,
                100.0,
                start_time() + Duration::minutes(5 * i as i64),
            )
            .with_quote_volume(close * 100.0)
        })
        .collect()
}

/// 60 falling closes followed by a steep rally, cut right at the candle where
/// SMA 20 crosses above SMA 40.
pub fn sar_sma_crossing_series(base: f64) -> CandleSeries {
    let closes: Vec<f64> = (0..60)
        .map(|i| base - i as f64)
        .chain((1..=40).map(|i| base - 59.0 + 3.0 * i as f64))
        .collect();
    let fast = math::rolling_mean(&closes, 20);
    let slow = math::rolling_mean(&closes, 40);
    let k = (40..closes.len())
        .find(|&i| match (fast[i - 1], slow[i - 1], fast[i], slow[i]) {
            (Some(pf), Some(ps), Some(f), Some(s)) => pf <= ps && f > s,
            _ => false,
        })
        .expect("fast SMA crosses above slow SMA");
    CandleSeries::from(candles_from_closes(&closes[..=k]))
}

/// Steady climb: both averages stay ordered and the SuperTrend never flips.
pub fn steady_uptrend(len: usize) -> CandleSeries {
    let closes: Vec<f64> = (0..len).map(|i| 100.0 + 0.1 * i as f64).collect();
    CandleSeries::from(candles_from_closes(&closes))
}

pub fn test_settings() -> ScanSettings {
    ScanSettings {
        crypto_delay_ms: 0,
        forex_delay_ms: 0,
        scan_forex: false,
        ..ScanSettings::default()
    }
}

/// Binance klines payload for `candles`.
pub fn binance_klines_json(candles: &[Candle]) -> Value {
    Value::Array(
        candles
            .iter()
            .map(|c| {
                let open_time = c.timestamp.timestamp_millis();
                json!([
                    open_time,
                    c.open.to_string(),
                    c.high.to_string(),
                    c.low.to_string(),
                    c.close.to_string(),
                    c.volume.to_string(),
                    open_time + 299_999,
                    c.quote_volume.to_string(),
                    10,
                    "0",
                    "0",
                    "0"
                ])
            })
            .collect(),
    )
}

/// Yahoo chart payload for `candles`.
pub fn yahoo_chart_json(candles: &[Candle]) -> Value {
    json!({
        "chart": {
            "result": [{
                "meta": {"currency": "USD"},
                "timestamp": candles.iter().map(|c| c.timestamp.timestamp()).collect::<Vec<_>>(),
                "indicators": {"quote": [{
                    "open": candles.iter().map(|c| c.open).collect::<Vec<_>>(),
                    "high": candles.iter().map(|c| c.high).collect::<Vec<_>>(),
                    "low": candles.iter().map(|c| c.low).collect::<Vec<_>>(),
                    "close": candles.iter().map(|c| c.close).collect::<Vec<_>>(),
                    "volume": candles.iter().map(|_| 0).collect::<Vec<_>>()
                }]}
            }],
            "error": null
        }
    })
}

pub fn sample_signal(symbol: &str, strategy: StrategyKind) -> Signal {
    Signal {
        symbol: symbol.to_string(),
        market_type: MarketType::Crypto,
        strategy,
        direction: SignalDirection::Long,
        price: 100.0,
        levels: TradeLevels {
            tp1: 101.5,
            tp2: 103.0,
            stop_loss: 97.804,
        },
        indicators: IndicatorSnapshot::SarSma {
            sma_fast: 99.0,
            sma_slow: 98.0,
            sar: 98.0,
        },
        volume: 10.0,
        quote_volume: 1000.0,
        timeframe: "5m".to_string(),
        conditions: SignalConditions {
            condition_1: "SAR Below Price".to_string(),
            condition_2: "SMA 20 Cross Above SMA 40".to_string(),
            condition_3: "Price Above Both SMAs".to_string(),
        },
        accuracy: strategy.accuracy().to_string(),
        all_conditions_met: true,
        timestamp: start_time(),
    }
}

/// Serves canned series; unknown symbols fail like a dead endpoint.
#[derive(Default)]
pub struct FakeProvider {
    series: HashMap<String, CandleSeries>,
    top_symbols: Option<Vec<String>>,
    pub requests: Mutex<Vec<(String, MarketType, usize)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, series: CandleSeries) -> Self {
        self.series.insert(symbol.to_string(), series);
        self
    }

    pub fn with_top_symbols(mut self, symbols: &[&str]) -> Self {
        self.top_symbols = Some(symbols.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        market_type: MarketType,
        _timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), market_type, limit));
        let mut series = self
            .series
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::Empty(symbol.to_string()))?;
        series.truncate_front(limit);
        Ok(series)
    }

    async fn top_crypto_symbols(
        &self,
        limit: usize,
        _min_quote_volume: f64,
    ) -> Result<Vec<String>, MarketDataError> {
        match &self.top_symbols {
            Some(symbols) => Ok(symbols.iter().take(limit).cloned().collect()),
            None => Err(MarketDataError::Status {
                status: 503,
                url: "fake://ticker".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub published: Mutex<Vec<Signal>>,
}

#[async_trait]
impl SignalSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&self, signals: &[Signal]) -> Result<(), SinkError> {
        self.published.lock().unwrap().extend_from_slice(signals);
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl SignalSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn publish(&self, _signals: &[Signal]) -> Result<(), SinkError> {
        Err(SinkError::Io {
            path: "/dev/full".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }
}
