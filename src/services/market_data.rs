//! Market data provider interface and the HTTP-backed router.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::indicators::CandleSeries;
use crate::models::signal::MarketType;
use crate::services::binance::BinanceClient;
use crate::services::yahoo::YahooClient;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no data returned for {0}")]
    Empty(String),

    #[error("unsupported timeframe '{0}'")]
    UnsupportedTimeframe(String),
}

impl MarketDataError {
    /// Whether the request is worth repeating.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MarketDataError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent `limit` candles for a symbol, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        market_type: MarketType,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError>;

    /// USDT pairs above `min_quote_volume`, highest 24h quote volume first.
    async fn top_crypto_symbols(
        &self,
        limit: usize,
        min_quote_volume: f64,
    ) -> Result<Vec<String>, MarketDataError>;
}

/// Shared HTTP client configuration.
pub fn http_client() -> Result<reqwest::Client, MarketDataError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent("trendscan/0.1")
        .build()
        .map_err(MarketDataError::Http)
}

/// Exponential backoff used for every provider request.
pub fn default_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(250))
        .with_max_delay(Duration::from_secs(4))
        .with_max_times(3)
}

/// GET `url` and decode the JSON body, retrying transient failures.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    backoff: &ExponentialBuilder,
) -> Result<T, MarketDataError> {
    let fetch = || async {
        let response = client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice::<T>(&body).map_err(|e| MarketDataError::Decode(e.to_string()))
    };

    fetch
        .retry(backoff.clone())
        .when(MarketDataError::is_transient)
        .notify(|err, delay| {
            warn!(
                url = %url,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "MarketData: retrying request to {} in {:?}",
                url,
                delay
            );
        })
        .await
}

/// Routes crypto symbols to Binance and everything else to Yahoo.
pub struct HttpMarketDataProvider {
    binance: BinanceClient,
    yahoo: YahooClient,
}

impl HttpMarketDataProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = http_client()?;
        Ok(Self {
            binance: BinanceClient::with_client(crate::services::binance::DEFAULT_BASE_URL, client.clone()),
            yahoo: YahooClient::with_client(crate::services::yahoo::DEFAULT_BASE_URL, client),
        })
    }

    pub fn with_clients(binance: BinanceClient, yahoo: YahooClient) -> Self {
        Self { binance, yahoo }
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        market_type: MarketType,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        match market_type {
            MarketType::Crypto => self.binance.klines(symbol, timeframe, limit).await,
            MarketType::Forex => self.yahoo.candles(symbol, timeframe, limit).await,
        }
    }

    async fn top_crypto_symbols(
        &self,
        limit: usize,
        min_quote_volume: f64,
    ) -> Result<Vec<String>, MarketDataError> {
        self.binance.top_usdt_pairs(limit, min_quote_volume).await
    }
}
