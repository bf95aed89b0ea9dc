//! Streaming simple and exponential moving averages

use std::collections::VecDeque;

use crate::common::math;
use crate::models::indicators::MaKind;

/// Simple moving average over a fixed trailing window.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period),
        }
    }

    /// Feed one sample; `None` until the window is full.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.period == 0 || self.window.len() < self.period {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.period as f64)
    }

    /// Index of the first defined output.
    pub fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }
}

/// Exponential moving average seeded with the first sample.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            alpha: math::ema_alpha(period),
            value: None,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.value = Some(next);
        next
    }

    pub fn warmup(&self) -> usize {
        0
    }
}

/// Either moving average, selected by [`MaKind`].
#[derive(Debug, Clone)]
pub enum MovingAverage {
    Simple(Sma),
    Exponential(Ema),
}

impl MovingAverage {
    pub fn new(kind: MaKind, length: usize) -> Self {
        match kind {
            MaKind::Sma => MovingAverage::Simple(Sma::new(length)),
            MaKind::Ema => MovingAverage::Exponential(Ema::new(length)),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        match self {
            MovingAverage::Simple(sma) => sma.update(value),
            MovingAverage::Exponential(ema) => Some(ema.update(value)),
        }
    }

    pub fn warmup(&self) -> usize {
        match self {
            MovingAverage::Simple(sma) => sma.warmup(),
            MovingAverage::Exponential(ema) => ema.warmup(),
        }
    }
}
