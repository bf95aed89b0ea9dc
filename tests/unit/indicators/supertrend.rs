use chrono::{Duration, TimeZone, Utc};
use trendscan::config::SuperTrendParams;
use trendscan::indicators::{calculate_supertrend_ma, SuperTrendMa};
use trendscan::models::indicators::{Candle, MaKind, TrendDirection};

fn swings(len: usize) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let x = i as f64;
            let close = 50.0 + 6.0 * (x / 15.0).sin() + 2.0 * (x / 4.0).cos();
            Candle::new(close, close + 0.4, close - 0.4, close, 1.0, start + Duration::minutes(5 * i as i64))
        })
        .collect()
}

fn short_params() -> SuperTrendParams {
    SuperTrendParams {
        ma_kind: MaKind::Sma,
        ma_length: 10,
        atr_period: 5,
        ..SuperTrendParams::default()
    }
}

#[test]
fn trend_flips_only_through_the_opposite_band() {
    let candles = swings(400);
    let points = calculate_supertrend_ma(&candles, &short_params());
    let mut flips = 0;

    for i in 1..candles.len() {
        let (Some(prev), Some(cur)) = (points[i - 1], points[i]) else {
            continue;
        };
        let close = candles[i].close;
        match prev.trend {
            TrendDirection::Bullish => assert_eq!(cur.trend == TrendDirection::Bearish, close < cur.final_up),
            TrendDirection::Bearish => assert_eq!(cur.trend == TrendDirection::Bullish, close > cur.final_dn),
        }
        if cur.trend != prev.trend {
            flips += 1;
        }
    }
    assert!(flips > 0);
}

#[test]
fn bands_ratchet_while_price_respects_them() {
    let candles = swings(400);
    let points = calculate_supertrend_ma(&candles, &short_params());

    for i in 2..candles.len() {
        let (Some(prev), Some(cur)) = (points[i - 1], points[i]) else {
            continue;
        };
        let prev_close = candles[i - 1].close;
        if prev_close > prev.final_up {
            assert!(cur.final_up >= prev.final_up, "lower band fell at {}", i);
        }
        if prev_close < prev.final_dn {
            assert!(cur.final_dn <= prev.final_dn, "upper band rose at {}", i);
        }
    }
}

#[test]
fn streaming_matches_batch() {
    let candles = swings(200);
    let params = short_params();
    let batch = calculate_supertrend_ma(&candles, &params);

    let mut calc = SuperTrendMa::new(&params);
    for (candle, expected) in candles.iter().zip(&batch) {
        assert_eq!(calc.update(candle), *expected);
    }
    let bands = calc.bands();
    let last = batch.last().copied().flatten().unwrap();
    assert_eq!(bands.final_up, Some(last.final_up));
    assert_eq!(bands.trend, last.trend);
}
