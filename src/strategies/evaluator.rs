//! Strategy interface and the checks shared by both evaluators.

use crate::models::indicators::{Candle, CandleSeries};
use crate::models::signal::{MarketType, Signal, StrategyKind};
use crate::signals::error::EngineError;

/// Where the series being evaluated came from.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub symbol: &'a str,
    pub market_type: MarketType,
    pub timeframe: &'a str,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(symbol: &'a str, market_type: MarketType, timeframe: &'a str) -> Self {
        Self {
            symbol,
            market_type,
            timeframe,
        }
    }
}

/// A strategy predicate over the two most recent valid candles.
///
/// Implementations are pure: the same series and context always yield the
/// same result.
pub trait SignalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Series length required before evaluating, given the current parameters.
    fn min_candles(&self) -> usize {
        self.kind().min_candles()
    }

    fn evaluate(
        &self,
        series: &CandleSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Option<Signal>, EngineError>;
}

pub(crate) fn ensure_length(series: &CandleSeries, required: usize) -> Result<(), EngineError> {
    if series.len() < required {
        return Err(EngineError::InsufficientData {
            required,
            available: series.len(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_finite_input(series: &CandleSeries) -> Result<(), EngineError> {
    match series.first_non_finite() {
        Some(index) => Err(EngineError::ComputeFailure(format!(
            "non-finite price at candle {}",
            index
        ))),
        None => Ok(()),
    }
}

pub(crate) fn ensure_finite(label: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::ComputeFailure(format!("{} is not finite", label)))
    }
}

/// The two most recent rows of a forward pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LastTwo<T> {
    prev: Option<T>,
    latest: Option<T>,
}

impl<T: Copy> LastTwo<T> {
    pub(crate) fn new() -> Self {
        Self {
            prev: None,
            latest: None,
        }
    }

    pub(crate) fn push(&mut self, row: T) {
        self.prev = self.latest.replace(row);
    }

    pub(crate) fn pair(&self) -> Option<(T, T)> {
        self.prev.zip(self.latest)
    }
}

pub(crate) fn latest_candle(series: &CandleSeries) -> Result<&Candle, EngineError> {
    series.last().ok_or(EngineError::InsufficientData {
        required: 1,
        available: 0,
    })
}
