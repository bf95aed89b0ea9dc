use chrono::{Duration, TimeZone, Utc};
use trendscan::config::{EngineConfig, SarSmaParams, SuperTrendParams};
use trendscan::models::indicators::{Candle, CandleSeries, MaKind};
use trendscan::models::signal::{MarketType, StrategyKind};
use trendscan::signals::{EngineError, SignalEngine};
use trendscan::strategies::EvaluationContext;

fn choppy(len: usize) -> CandleSeries {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let x = i as f64;
            let close = 20.0 + 3.0 * (x / 7.0).sin() + (x / 2.5).cos();
            Candle::new(close, close + 0.3, close - 0.3, close, 5.0, start + Duration::minutes(5 * i as i64))
        })
        .collect::<Vec<_>>()
        .into()
}

fn ctx() -> EvaluationContext<'static> {
    EvaluationContext::new("LINKUSDT", MarketType::Crypto, "5m")
}

#[test]
fn minimum_candles_follow_parameters() {
    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.strategy(StrategyKind::SarSma).min_candles(), 50);
    assert_eq!(engine.strategy(StrategyKind::SupertrendMa).min_candles(), 110);

    let wide = SignalEngine::new(EngineConfig {
        sar_sma: SarSmaParams {
            sma_fast: 50,
            sma_slow: 100,
            ..SarSmaParams::default()
        },
        supertrend_ma: SuperTrendParams {
            ma_kind: MaKind::Sma,
            ma_length: 150,
            ..SuperTrendParams::default()
        },
    })
    .unwrap();
    assert_eq!(wide.strategy(StrategyKind::SarSma).min_candles(), 101);
    assert_eq!(wide.strategy(StrategyKind::SupertrendMa).min_candles(), 151);
}

#[test]
fn one_candle_short_yields_nothing() {
    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    for kind in StrategyKind::ALL {
        let required = engine.strategy(kind).min_candles();
        let series = choppy(required - 1);
        assert_eq!(engine.evaluate(kind, &series, &ctx()), Ok(None));
        assert_eq!(
            engine.strategy(kind).evaluate(&series, &ctx()),
            Err(EngineError::InsufficientData {
                required,
                available: required - 1
            })
        );
    }
}

#[test]
fn evaluation_is_deterministic() {
    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    let series = choppy(400);
    for end in (110..=400).step_by(7) {
        let mut window = series.clone();
        window.truncate_front(end);
        let a = engine.evaluate_all(&StrategyKind::ALL, &window, &ctx());
        let b = engine.evaluate_all(&StrategyKind::ALL, &window, &ctx());
        assert_eq!(a, b);
    }
}

#[test]
fn evaluate_all_reports_in_requested_order() {
    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    let kinds = [StrategyKind::SupertrendMa, StrategyKind::SarSma];
    let results = engine.evaluate_all(&kinds, &choppy(200), &ctx());
    let order: Vec<StrategyKind> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(order, kinds);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
}

#[test]
fn signals_only_fire_with_all_conditions_met() {
    let engine = SignalEngine::new(EngineConfig::default()).unwrap();
    let series = choppy(400);
    let candles = series.candles();
    for end in 110..=candles.len() {
        let window = CandleSeries::from(candles[..end].to_vec());
        for (kind, result) in engine.evaluate_all(&StrategyKind::ALL, &window, &ctx()) {
            if let Some(signal) = result.unwrap() {
                assert!(signal.all_conditions_met);
                assert_eq!(signal.strategy, kind);
                assert_eq!(signal.timestamp, candles[end - 1].timestamp);
                assert_eq!(signal.accuracy, kind.accuracy());
            }
        }
    }
}
