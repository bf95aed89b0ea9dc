//! Signal engine: single entry point from a candle series to a signal.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::models::indicators::CandleSeries;
use crate::models::signal::{Signal, StrategyKind};
use crate::signals::error::EngineError;
use crate::strategies::{EvaluationContext, SarSmaStrategy, SignalStrategy, SuperTrendMaStrategy};

/// Holds validated parameters and one evaluator per strategy.
///
/// Shared read-only between concurrent scan tasks.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: Arc<EngineConfig>,
    sar_sma: SarSmaStrategy,
    supertrend_ma: SuperTrendMaStrategy,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sar_sma: SarSmaStrategy::new(config.sar_sma),
            supertrend_ma: SuperTrendMaStrategy::new(config.supertrend_ma),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self, kind: StrategyKind) -> &dyn SignalStrategy {
        match kind {
            StrategyKind::SarSma => &self.sar_sma,
            StrategyKind::SupertrendMa => &self.supertrend_ma,
        }
    }

    /// Evaluate one strategy on a series.
    ///
    /// A series too short for the strategy is not an error: it yields no
    /// signal. Non-finite data surfaces as [`EngineError::ComputeFailure`].
    pub fn evaluate(
        &self,
        kind: StrategyKind,
        series: &CandleSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Option<Signal>, EngineError> {
        match self.strategy(kind).evaluate(series, ctx) {
            Ok(Some(signal)) => {
                debug!(
                    symbol = %ctx.symbol,
                    strategy = %kind,
                    direction = %signal.direction,
                    price = signal.price,
                    "SignalEngine: {} {} signal for {}",
                    kind,
                    signal.direction,
                    ctx.symbol
                );
                Ok(Some(signal))
            }
            Ok(None) => Ok(None),
            Err(EngineError::InsufficientData { required, available }) => {
                debug!(
                    symbol = %ctx.symbol,
                    strategy = %kind,
                    required,
                    available,
                    "SignalEngine: not enough candles for {} ({} < {})",
                    ctx.symbol,
                    available,
                    required
                );
                Ok(None)
            }
            Err(e) => {
                warn!(
                    symbol = %ctx.symbol,
                    strategy = %kind,
                    error = %e,
                    "SignalEngine: evaluation failed for {}",
                    ctx.symbol
                );
                Err(e)
            }
        }
    }

    /// Evaluate every strategy in `kinds`, collecting signals and per-strategy errors.
    pub fn evaluate_all(
        &self,
        kinds: &[StrategyKind],
        series: &CandleSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Vec<(StrategyKind, Result<Option<Signal>, EngineError>)> {
        kinds
            .iter()
            .map(|&kind| (kind, self.evaluate(kind, series, ctx)))
            .collect()
    }
}
