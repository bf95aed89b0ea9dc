//! SuperTrended moving average
//!
//! A moving average wrapped in ATR bands. The lower band (`final_up`) only
//! ratchets upward while price closes above it, the upper band (`final_dn`)
//! only ratchets downward while price closes below it, and the trend flips
//! when the close crosses the band on the opposing side.

use crate::config::SuperTrendParams;
use crate::indicators::trend::MovingAverage;
use crate::indicators::volatility::{Atr, AtrMode};
use crate::models::indicators::{Candle, TrendDirection};

/// Band ratchet state carried from one candle to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandState {
    pub final_up: Option<f64>,
    pub final_dn: Option<f64>,
    pub trend: TrendDirection,
}

/// Calculator output for one candle past warm-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperTrendPoint {
    pub trend: TrendDirection,
    pub final_up: f64,
    pub final_dn: f64,
    pub ma: f64,
}

#[derive(Debug, Clone)]
pub struct SuperTrendMa {
    ma: MovingAverage,
    atr: Atr,
    multiplier: f64,
    bands: BandState,
    prev_close: Option<f64>,
    index: usize,
}

impl SuperTrendMa {
    pub fn new(params: &SuperTrendParams) -> Self {
        let mode = if params.use_standard_atr {
            AtrMode::Standard
        } else {
            AtrMode::RawTrueRange
        };
        Self {
            ma: MovingAverage::new(params.ma_kind, params.ma_length),
            atr: Atr::new(params.atr_period, mode),
            multiplier: params.atr_multiplier,
            bands: BandState {
                final_up: None,
                final_dn: None,
                trend: TrendDirection::Bullish,
            },
            prev_close: None,
            index: 0,
        }
    }

    /// First index at which ma, atr and both bands are defined.
    ///
    /// Bands are never set on index 0, so this is at least 1.
    pub fn first_valid_index(&self) -> usize {
        self.ma.warmup().max(self.atr.warmup()).max(1)
    }

    pub fn bands(&self) -> BandState {
        self.bands
    }

    /// Feed the next candle. Returns `None` while any component is warming up.
    pub fn update(&mut self, candle: &Candle) -> Option<SuperTrendPoint> {
        let ma = self.ma.update(candle.close);
        let atr = self.atr.update(candle.high, candle.low, candle.close);
        let raw = ma
            .zip(atr)
            .map(|(ma, atr)| (ma - self.multiplier * atr, ma + self.multiplier * atr));

        if self.index > 0 {
            self.bands = self.step(raw, candle.close);
        }
        self.prev_close = Some(candle.close);
        self.index += 1;

        match (ma, self.bands.final_up, self.bands.final_dn) {
            (Some(ma), Some(final_up), Some(final_dn)) if atr.is_some() => Some(SuperTrendPoint {
                trend: self.bands.trend,
                final_up,
                final_dn,
                ma,
            }),
            _ => None,
        }
    }

    fn step(&self, raw: Option<(f64, f64)>, close: f64) -> BandState {
        let prev = self.bands;
        let prev_close = self.prev_close;

        let final_up = match (raw.map(|r| r.0), prev.final_up) {
            (None, carried) => carried,
            (Some(up), None) => Some(up),
            (Some(up), Some(prev_up)) => match prev_close {
                Some(pc) if pc > prev_up => Some(up.max(prev_up)),
                _ => Some(up),
            },
        };

        let final_dn = match (raw.map(|r| r.1), prev.final_dn) {
            (None, carried) => carried,
            (Some(dn), None) => Some(dn),
            (Some(dn), Some(prev_dn)) => match prev_close {
                Some(pc) if pc < prev_dn => Some(dn.min(prev_dn)),
                _ => Some(dn),
            },
        };

        // comparisons against an undefined band are false, so the trend carries
        let trend = match prev.trend {
            TrendDirection::Bearish => match final_dn {
                Some(dn) if close > dn => TrendDirection::Bullish,
                _ => TrendDirection::Bearish,
            },
            TrendDirection::Bullish => match final_up {
                Some(up) if close < up => TrendDirection::Bearish,
                _ => TrendDirection::Bullish,
            },
        };

        BandState {
            final_up,
            final_dn,
            trend,
        }
    }
}

/// Calculator output for every candle; warm-up indices are `None`.
pub fn calculate_supertrend_ma(
    candles: &[Candle],
    params: &SuperTrendParams,
) -> Vec<Option<SuperTrendPoint>> {
    let mut calc = SuperTrendMa::new(params);
    candles.iter().map(|c| calc.update(c)).collect()
}
