//! Binance spot REST client: klines and 24h tickers.

use backon::ExponentialBuilder;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::indicators::{Candle, CandleSeries};
use crate::services::market_data::{default_backoff, get_json, MarketDataError};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance caps a klines request at this many rows.
const MAX_KLINES: usize = 1000;

#[derive(Debug, Deserialize)]
struct Ticker24h {
    symbol: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    base_url: String,
    http: reqwest::Client,
    backoff: ExponentialBuilder,
}

impl BinanceClient {
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            backoff: default_backoff(),
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.clamp(1, MAX_KLINES).to_string()),
        ];
        let rows: Vec<Vec<Value>> = get_json(&self.http, &url, &query, &self.backoff).await?;
        if rows.is_empty() {
            return Err(MarketDataError::Empty(symbol.to_string()));
        }

        let candles = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(symbol = %symbol, count = candles.len(), "Binance: fetched {} klines for {}", candles.len(), symbol);
        Ok(CandleSeries::from(candles))
    }

    pub async fn top_usdt_pairs(
        &self,
        limit: usize,
        min_quote_volume: f64,
    ) -> Result<Vec<String>, MarketDataError> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let tickers: Vec<Ticker24h> = get_json(&self.http, &url, &[], &self.backoff).await?;
        Ok(rank_usdt_pairs(tickers, limit, min_quote_volume))
    }
}

fn rank_usdt_pairs(tickers: Vec<Ticker24h>, limit: usize, min_quote_volume: f64) -> Vec<String> {
    let mut pairs: Vec<(String, f64)> = tickers
        .into_iter()
        .filter(|t| t.symbol.ends_with("USDT"))
        .filter_map(|t| {
            let volume = t.quote_volume.parse::<f64>().ok()?;
            (volume > min_quote_volume).then_some((t.symbol, volume))
        })
        .collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.into_iter().take(limit).map(|(symbol, _)| symbol).collect()
}

fn number(row: &[Value], index: usize, field: &str) -> Result<f64, MarketDataError> {
    let value = row
        .get(index)
        .ok_or_else(|| MarketDataError::Decode(format!("kline missing {}", field)))?;
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| MarketDataError::Decode(format!("kline {} '{}' is not a number", field, s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarketDataError::Decode(format!("kline {} out of range", field))),
        other => Err(MarketDataError::Decode(format!(
            "kline {} has unexpected type: {}",
            field, other
        ))),
    }
}

/// `[open_time, open, high, low, close, volume, close_time, quote_volume, ...]`
fn parse_kline(row: &[Value]) -> Result<Candle, MarketDataError> {
    let open_time = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| MarketDataError::Decode("kline missing open time".into()))?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(open_time)
        .ok_or_else(|| MarketDataError::Decode(format!("invalid open time {}", open_time)))?;

    Ok(Candle::new(
        number(row, 1, "open")?,
        number(row, 2, "high")?,
        number(row, 3, "low")?,
        number(row, 4, "close")?,
        number(row, 5, "volume")?,
        timestamp,
    )
    .with_quote_volume(number(row, 7, "quote_volume")?))
}
