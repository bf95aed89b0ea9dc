//! Yahoo Finance chart API client for forex and commodity symbols.

use backon::ExponentialBuilder;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::models::indicators::{Candle, CandleSeries};
use crate::services::market_data::{default_backoff, get_json, MarketDataError};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Yahoo ticker for a scanner symbol: commodities map to futures, pairs get `=X`.
pub fn yahoo_symbol(symbol: &str) -> String {
    let symbol = symbol.to_ascii_uppercase();
    match symbol.as_str() {
        "XAUUSD" | "GOLD" => "GC=F".to_string(),
        "XAGUSD" | "SILVER" => "SI=F".to_string(),
        "USOIL" | "OIL" => "CL=F".to_string(),
        "UKOUSD" => "BZ=F".to_string(),
        _ => format!("{}=X", symbol),
    }
}

/// Yahoo interval, bars to merge per candle, and minutes per source bar.
fn interval_for(timeframe: &str) -> Result<(&'static str, usize, usize), MarketDataError> {
    match timeframe {
        "1m" => Ok(("1m", 1, 1)),
        "5m" => Ok(("5m", 1, 5)),
        "15m" => Ok(("15m", 1, 15)),
        "1h" => Ok(("60m", 1, 60)),
        // no native 4h bars: merge four hourly ones
        "4h" => Ok(("60m", 4, 60)),
        "1d" => Ok(("1d", 1, 1440)),
        other => Err(MarketDataError::UnsupportedTimeframe(other.to_string())),
    }
}

/// Smallest lookback range covering `minutes` of history.
fn range_for(minutes: usize) -> &'static str {
    match minutes {
        m if m <= 1_440 => "1d",
        m if m <= 10_080 => "7d",
        m if m <= 43_200 => "1mo",
        m if m <= 129_600 => "3mo",
        _ => "1y",
    }
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    http: reqwest::Client,
    backoff: ExponentialBuilder,
}

impl YahooClient {
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

    pub async fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        let (interval, merge, bar_minutes) = interval_for(timeframe)?;
        let ticker = yahoo_symbol(symbol);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let query = [
            ("interval", interval.to_string()),
            ("range", range_for(limit * merge * bar_minutes).to_string()),
        ];

        let response: ChartResponse = get_json(&self.http, &url, &query, &self.backoff).await?;
        let bars = parse_chart(symbol, response)?;
        let mut series = CandleSeries::from(merge_bars(bars, merge));
        series.truncate_front(limit);
        if series.is_empty() {
            return Err(MarketDataError::Empty(symbol.to_string()));
        }
        debug!(symbol = %symbol, ticker = %ticker, count = series.len(), "Yahoo: fetched {} candles for {}", series.len(), symbol);
        Ok(series)
    }
}

fn parse_chart(symbol: &str, response: ChartResponse) -> Result<Vec<Candle>, MarketDataError> {
    let result = match (response.chart.result, response.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) => {
            return Err(MarketDataError::Decode(format!("{}: {}", err.code, err.description)))
        }
        (None, None) => return Err(MarketDataError::Empty(symbol.to_string())),
    };
    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::Empty(symbol.to_string()))?;
    let timestamps = data
        .timestamp
        .ok_or_else(|| MarketDataError::Empty(symbol.to_string()))?;
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();
    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // rows with a missing price are gaps in the feed
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| MarketDataError::Decode(format!("invalid timestamp {}", ts)))?;
        let volume = at(&quote.volume, i).unwrap_or(0.0);
        candles.push(Candle::new(open, high, low, close, volume, timestamp));
    }
    Ok(candles)
}

/// Merge consecutive groups of `factor` bars; a trailing partial group is kept.
fn merge_bars(bars: Vec<Candle>, factor: usize) -> Vec<Candle> {
    if factor <= 1 {
        return bars;
    }
    bars.chunks(factor)
        .filter_map(|chunk| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            let volume: f64 = chunk.iter().map(|c| c.volume).sum();
            Some(Candle::new(
                first.open,
                chunk.iter().map(|c| c.high).fold(f64::MIN, f64::max),
                chunk.iter().map(|c| c.low).fold(f64::MAX, f64::min),
                last.close,
                volume,
                first.timestamp,
            ))
        })
        .collect()
}
