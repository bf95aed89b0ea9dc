//! Parabolic SAR (stop-and-reverse)
//!
//! Sequential state machine: every output depends on the previous state, so
//! the calculator is fed one candle at a time.

use crate::config::SarParams;
use crate::models::indicators::{Candle, TrendDirection};

/// Recurrence state after processing one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub sar: f64,
    pub trend: TrendDirection,
    /// Acceleration factor.
    pub af: f64,
    /// Extreme point of the current trend.
    pub ep: f64,
}

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    params: SarParams,
    state: Option<SarState>,
    // (i-1, i-2) relative to the candle being processed
    prev_highs: (Option<f64>, Option<f64>),
    prev_lows: (Option<f64>, Option<f64>),
}

impl ParabolicSar {
    pub fn new(params: SarParams) -> Self {
        Self {
            params,
            state: None,
            prev_highs: (None, None),
            prev_lows: (None, None),
        }
    }

    /// Feed the next candle's high and low and return the new state.
    pub fn update(&mut self, high: f64, low: f64) -> SarState {
        let next = match self.state {
            None => SarState {
                sar: low,
                trend: TrendDirection::Bullish,
                af: self.params.af_start,
                ep: high,
            },
            Some(prev) => match prev.trend {
                TrendDirection::Bullish => self.step_up(prev, high, low),
                TrendDirection::Bearish => self.step_down(prev, high, low),
            },
        };

        self.prev_highs = (Some(high), self.prev_highs.0);
        self.prev_lows = (Some(low), self.prev_lows.0);
        self.state = Some(next);
        next
    }

    /// Projected SAR for the next candle before clamping or reversal.
    pub fn tentative(prev: &SarState) -> f64 {
        prev.sar + prev.af * (prev.ep - prev.sar)
    }

    fn step_up(&self, prev: SarState, high: f64, low: f64) -> SarState {
        let mut sar = Self::tentative(&prev);
        if let Some(low_1) = self.prev_lows.0 {
            sar = sar.min(low_1);
        }
        if let Some(low_2) = self.prev_lows.1 {
            sar = sar.min(low_2);
        }

        if low <= sar {
            return SarState {
                sar: prev.ep,
                trend: TrendDirection::Bearish,
                af: self.params.af_start,
                ep: low,
            };
        }

        let (ep, af) = if high > prev.ep {
            (high, (prev.af + self.params.af_increment).min(self.params.af_max))
        } else {
            (prev.ep, prev.af)
        };
        SarState {
            sar,
            trend: TrendDirection::Bullish,
            af,
            ep,
        }
    }

    fn step_down(&self, prev: SarState, high: f64, low: f64) -> SarState {
        let mut sar = Self::tentative(&prev);
        if let Some(high_1) = self.prev_highs.0 {
            sar = sar.max(high_1);
        }
        if let Some(high_2) = self.prev_highs.1 {
            sar = sar.max(high_2);
        }

        if high >= sar {
            return SarState {
                sar: prev.ep,
                trend: TrendDirection::Bullish,
                af: self.params.af_start,
                ep: high,
            };
        }

        let (ep, af) = if low < prev.ep {
            (low, (prev.af + self.params.af_increment).min(self.params.af_max))
        } else {
            (prev.ep, prev.af)
        };
        SarState {
            sar,
            trend: TrendDirection::Bearish,
            af,
            ep,
        }
    }
}

/// SAR state for every candle of the slice, defined from index 0.
pub fn calculate_sar(candles: &[Candle], params: SarParams) -> Vec<SarState> {
    let mut sar = ParabolicSar::new(params);
    candles.iter().map(|c| sar.update(c.high, c.low)).collect()
}
