//! Series math over ordered price samples.
//!
//! Window functions return `Option<f64>` per index so that warm-up samples are
//! explicit instead of being encoded as NaN.

/// True range of one candle given the previous close.
///
/// Without a previous close the range collapses to `high - low`.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    let range = high - low;
    match prev_close {
        Some(prev) => range.max((high - prev).abs()).max((low - prev).abs()),
        None => range,
    }
}

/// Arithmetic mean of the trailing `period` values, if enough are available.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Smoothing factor for an exponential mean of the given span.
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Rolling arithmetic mean. Indices before `period - 1` are `None`.
pub fn rolling_mean(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        if period == 0 || i + 1 < period {
            out.push(None);
        } else {
            out.push(sma(&series[..=i], period));
        }
    }
    out
}

/// Exponential mean seeded with the first sample (no lagged SMA seed).
pub fn exponential_mean(series: &[f64], period: usize) -> Vec<f64> {
    let alpha = ema_alpha(period);
    let mut out: Vec<f64> = Vec::with_capacity(series.len());
    for (i, &value) in series.iter().enumerate() {
        let next = match i {
            0 => value,
            _ => alpha * value + (1.0 - alpha) * out[i - 1],
        };
        out.push(next);
    }
    out
}

/// True range per index. Inputs must be the same length.
pub fn true_range_series(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    (0..len)
        .map(|i| {
            let prev_close = if i == 0 { None } else { Some(close[i - 1]) };
            true_range(high[i], low[i], prev_close)
        })
        .collect()
}

/// Rolling mean of the true range.
pub fn average_true_range(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    rolling_mean(&true_range_series(high, low, close), period)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
