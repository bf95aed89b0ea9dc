//! ATR (Average True Range) indicator

use crate::common::math;
use crate::indicators::trend::Sma;

/// How the range average is labelled in configuration.
///
/// Both modes take a plain rolling mean of the true range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtrMode {
    Standard,
    RawTrueRange,
}

/// Streaming ATR: rolling mean of the true range over `period` candles.
#[derive(Debug, Clone)]
pub struct Atr {
    mode: AtrMode,
    window: Sma,
    prev_close: Option<f64>,
}

impl Atr {
    pub fn new(period: usize, mode: AtrMode) -> Self {
        Self {
            mode,
            window: Sma::new(period),
            prev_close: None,
        }
    }

    pub fn standard(period: usize) -> Self {
        Self::new(period, AtrMode::Standard)
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tr = math::true_range(high, low, self.prev_close);
        self.prev_close = Some(close);
        self.window.update(tr)
    }

    pub fn warmup(&self) -> usize {
        self.window.warmup()
    }

    pub fn mode(&self) -> AtrMode {
        self.mode
    }
}
