//! HTTP market data providers against a mocked Binance / Yahoo.

use backon::ExponentialBuilder;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendscan::config::EngineConfig;
use trendscan::core::scanner::{ScanTarget, Scanner};
use trendscan::models::signal::{MarketType, SignalDirection, StrategyKind};
use trendscan::services::market_data::{HttpMarketDataProvider, MarketDataError, MarketDataProvider};
use trendscan::services::{BinanceClient, YahooClient};
use trendscan::signals::SignalEngine;

use crate::test_utils::{
    binance_klines_json, candles_from_closes, sar_sma_crossing_series, test_settings,
    yahoo_chart_json,
};

fn fast_retry() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(5))
        .with_max_times(2)
}

fn provider_for(server: &MockServer) -> HttpMarketDataProvider {
    let client = reqwest::Client::new();
    HttpMarketDataProvider::with_clients(
        BinanceClient::with_client(server.uri(), client.clone()).with_backoff(fast_retry()),
        YahooClient::with_client(server.uri(), client).with_backoff(fast_retry()),
    )
}

#[tokio::test]
async fn binance_klines_decode_into_ordered_series() {
    let server = MockServer::start().await;
    let candles = candles_from_closes(&[100.0, 101.0, 102.5]);
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "5m"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(binance_klines_json(&candles)))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider_for(&server)
        .get_candles("BTCUSDT", MarketType::Crypto, "5m", 3)
        .await
        .expect("klines");

    assert_eq!(series.len(), 3);
    assert_eq!(series.closes(), vec![100.0, 101.0, 102.5]);
    assert_eq!(series.candles()[0].timestamp, candles[0].timestamp);
    assert_eq!(series.candles()[2].quote_volume, 10250.0);
}

#[tokio::test]
async fn top_symbols_filter_and_rank_usdt_pairs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"symbol": "ETHUSDT", "quoteVolume": "800000.0", "lastPrice": "3000"},
            {"symbol": "BTCUSDT", "quoteVolume": "9000000.0", "lastPrice": "60000"},
            {"symbol": "ETHBTC", "quoteVolume": "99999999.0", "lastPrice": "0.05"},
            {"symbol": "PEPEUSDT", "quoteVolume": "1200.0", "lastPrice": "0.00001"}
        ])))
        .mount(&server)
        .await;

    let symbols = provider_for(&server)
        .top_crypto_symbols(10, 500_000.0)
        .await
        .unwrap();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .get_candles("BTCUSDT", MarketType::Crypto, "5m", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status { status: 503, .. }));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .get_candles("NOPEUSDT", MarketType::Crypto, "5m", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status { status: 400, .. }));
}

#[tokio::test]
async fn empty_kline_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .get_candles("BTCUSDT", MarketType::Crypto, "5m", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Empty(_)));
}

#[tokio::test]
async fn forex_routes_to_yahoo_with_mapped_symbol() {
    let server = MockServer::start().await;
    let candles = candles_from_closes(&[1.0850, 1.0855, 1.0860, 1.0858]);
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GC=F"))
        .and(query_param("interval", "5m"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(yahoo_chart_json(&candles)))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider_for(&server)
        .get_candles("XAUUSD", MarketType::Forex, "5m", 3)
        .await
        .expect("chart");

    // newest three of four
    assert_eq!(series.len(), 3);
    assert_eq!(series.closes(), vec![1.0855, 1.0860, 1.0858]);
}

#[tokio::test]
async fn scan_over_http_finds_the_crossing() {
    let server = MockServer::start().await;
    let series = sar_sma_crossing_series(200.0);
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(binance_klines_json(series.candles())))
        .mount(&server)
        .await;

    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    let scanner = Scanner::new(test_settings(), engine, Arc::new(provider_for(&server)));
    let report = scanner
        .scan_targets(vec![ScanTarget::new("BTCUSDT", MarketType::Crypto)])
        .await;

    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].strategy, StrategyKind::SarSma);
    assert_eq!(report.signals[0].direction, SignalDirection::Long);
    assert_eq!(report.signals[0].timestamp, series.last().unwrap().timestamp);
}
