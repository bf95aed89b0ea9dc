//! Parabolic SAR + SMA crossover strategy
//!
//! Fires on the candle where the fast SMA crosses the slow SMA, provided the
//! SAR sits on the matching side of price and price clears both averages.

use crate::common::math::round_to;
use crate::config::SarSmaParams;
use crate::indicators::trend::{ParabolicSar, Sma};
use crate::models::indicators::CandleSeries;
use crate::models::signal::{
    IndicatorSnapshot, Signal, SignalConditions, SignalDirection, StrategyKind,
};
use crate::signals::error::EngineError;
use crate::strategies::evaluator::{
    ensure_finite, ensure_finite_input, ensure_length, latest_candle, EvaluationContext, LastTwo,
    SignalStrategy,
};
use crate::strategies::levels::trade_levels;

const PRICE_DECIMALS: u32 = 6;

/// Indicator readings for one candle once both SMAs are defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarSmaRow {
    pub close: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub sar: f64,
}

/// The crossover predicate on two consecutive rows.
pub fn sar_sma_direction(latest: &SarSmaRow, prev: &SarSmaRow) -> Option<SignalDirection> {
    let price = latest.close;
    let long = latest.sar < price
        && latest.sma_fast > latest.sma_slow
        && prev.sma_fast <= prev.sma_slow
        && price > latest.sma_fast
        && price > latest.sma_slow;
    if long {
        return Some(SignalDirection::Long);
    }

    let short = latest.sar > price
        && latest.sma_fast < latest.sma_slow
        && prev.sma_fast >= prev.sma_slow
        && price < latest.sma_fast
        && price < latest.sma_slow;
    if short {
        return Some(SignalDirection::Short);
    }
    None
}

#[derive(Debug, Clone, Copy)]
pub struct SarSmaStrategy {
    params: SarSmaParams,
}

impl SarSmaStrategy {
    pub fn new(params: SarSmaParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SarSmaParams {
        &self.params
    }

    fn conditions(&self, direction: SignalDirection) -> SignalConditions {
        let (side, cross, position) = match direction {
            SignalDirection::Long => ("Below", "Above", "Above"),
            SignalDirection::Short => ("Above", "Below", "Below"),
        };
        SignalConditions {
            condition_1: format!("SAR {} Price", side),
            condition_2: format!(
                "SMA {} Cross {} SMA {}",
                self.params.sma_fast, cross, self.params.sma_slow
            ),
            condition_3: format!("Price {} Both SMAs", position),
        }
    }
}

impl SignalStrategy for SarSmaStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SarSma
    }

    fn min_candles(&self) -> usize {
        // two rows past the slow SMA warm-up
        StrategyKind::SarSma.min_candles().max(self.params.sma_slow + 1)
    }

    fn evaluate(
        &self,
        series: &CandleSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Option<Signal>, EngineError> {
        ensure_length(series, self.min_candles())?;
        ensure_finite_input(series)?;

        let mut fast = Sma::new(self.params.sma_fast);
        let mut slow = Sma::new(self.params.sma_slow);
        let mut sar = ParabolicSar::new(self.params.sar_params());
        let mut rows = LastTwo::new();

        for candle in series {
            let sma_fast = fast.update(candle.close);
            let sma_slow = slow.update(candle.close);
            let state = sar.update(candle.high, candle.low);
            if let (Some(sma_fast), Some(sma_slow)) = (sma_fast, sma_slow) {
                rows.push(SarSmaRow {
                    close: candle.close,
                    sma_fast,
                    sma_slow,
                    sar: state.sar,
                });
            }
        }

        let (prev, latest) = rows.pair().ok_or(EngineError::InsufficientData {
            required: self.params.sma_slow + 1,
            available: series.len(),
        })?;
        ensure_finite("sma_fast", latest.sma_fast)?;
        ensure_finite("sma_slow", latest.sma_slow)?;
        ensure_finite("sar", latest.sar)?;

        let Some(direction) = sar_sma_direction(&latest, &prev) else {
            return Ok(None);
        };

        let candle = latest_candle(series)?;
        let levels = trade_levels(
            ctx.market_type,
            StrategyKind::SarSma,
            ctx.symbol,
            direction,
            latest.close,
            latest.sar,
        );

        Ok(Some(Signal {
            symbol: ctx.symbol.to_string(),
            market_type: ctx.market_type,
            strategy: StrategyKind::SarSma,
            direction,
            price: round_to(latest.close, PRICE_DECIMALS),
            levels,
            indicators: IndicatorSnapshot::SarSma {
                sma_fast: round_to(latest.sma_fast, PRICE_DECIMALS),
                sma_slow: round_to(latest.sma_slow, PRICE_DECIMALS),
                sar: round_to(latest.sar, PRICE_DECIMALS),
            },
            volume: candle.volume,
            quote_volume: candle.quote_volume,
            timeframe: ctx.timeframe.to_string(),
            conditions: self.conditions(direction),
            accuracy: StrategyKind::SarSma.accuracy().to_string(),
            all_conditions_met: true,
            timestamp: candle.timestamp,
        }))
    }
}
