//! JSON file and log sinks.

use serde_json::Value;
use tempfile::tempdir;

use trendscan::models::signal::StrategyKind;
use trendscan::services::sink::{JsonFileSink, LogSink, SignalSink, SinkError};

use crate::test_utils::sample_signal;

#[tokio::test]
async fn publishes_append_to_the_stored_array() {
    let dir = tempdir().unwrap();
    let sink = JsonFileSink::new(dir.path().join("signals.json"));

    sink.publish(&[sample_signal("BTCUSDT", StrategyKind::SarSma)])
        .await
        .unwrap();
    sink.publish(&[
        sample_signal("ETHUSDT", StrategyKind::SupertrendMa),
        sample_signal("SOLUSDT", StrategyKind::SarSma),
    ])
    .await
    .unwrap();

    let stored = sink.read_all().await.unwrap();
    let symbols: Vec<&str> = stored.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    assert_eq!(stored[1].strategy, StrategyKind::SupertrendMa);
}

#[tokio::test]
async fn stored_records_carry_flat_trade_levels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("signals.json");
    let sink = JsonFileSink::new(&path);
    sink.publish(&[sample_signal("BTCUSDT", StrategyKind::SarSma)])
        .await
        .unwrap();

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let record = &raw.as_array().unwrap()[0];
    assert_eq!(record["tp1"], 101.5);
    assert_eq!(record["stop_loss"], 97.804);
    assert!(record.get("levels").is_none());
    assert!(!dir.path().join("nested").join("signals.json.tmp").exists());
}

#[tokio::test]
async fn empty_publish_leaves_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signals.json");
    let sink = JsonFileSink::new(&path);

    sink.publish(&[]).await.unwrap();

    assert!(!path.exists());
    assert!(sink.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_reported_not_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signals.json");
    std::fs::write(&path, "{not json").unwrap();
    let sink = JsonFileSink::new(&path);

    let err = sink
        .publish(&[sample_signal("BTCUSDT", StrategyKind::SarSma)])
        .await
        .unwrap_err();

    assert!(matches!(err, SinkError::Serialization(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
}

#[tokio::test]
async fn log_sink_accepts_any_batch() {
    let sink = LogSink;
    assert_eq!(sink.name(), "log");
    sink.publish(&[sample_signal("EURUSD", StrategyKind::SupertrendMa)])
        .await
        .unwrap();
    sink.publish(&[]).await.unwrap();
}
