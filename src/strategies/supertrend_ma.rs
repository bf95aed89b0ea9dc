//! SuperTrended moving average strategy
//!
//! Signals on the candle where the band state machine changes trend.

use crate::common::math::round_to;
use crate::config::SuperTrendParams;
use crate::indicators::structure::{SuperTrendMa, SuperTrendPoint};
use crate::models::indicators::{CandleSeries, TrendDirection};
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

/// LONG on a bearish to bullish flip, SHORT on the reverse.
pub fn supertrend_direction(prev: TrendDirection, latest: TrendDirection) -> Option<SignalDirection> {
    match (prev, latest) {
        (TrendDirection::Bearish, TrendDirection::Bullish) => Some(SignalDirection::Long),
        (TrendDirection::Bullish, TrendDirection::Bearish) => Some(SignalDirection::Short),
        _ => None,
    }
}

/// Band reported alongside the signal: the upper band in an uptrend, the
/// lower band in a downtrend.
pub fn active_band(point: &SuperTrendPoint) -> f64 {
    match point.trend {
        TrendDirection::Bullish => point.final_dn,
        TrendDirection::Bearish => point.final_up,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuperTrendMaStrategy {
    params: SuperTrendParams,
}

impl SuperTrendMaStrategy {
    pub fn new(params: SuperTrendParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SuperTrendParams {
        &self.params
    }

    fn conditions(&self, direction: SignalDirection) -> SignalConditions {
        let (change, side) = match direction {
            SignalDirection::Long => ("BEARISH→BULLISH", "Above"),
            SignalDirection::Short => ("BULLISH→BEARISH", "Below"),
        };
        SignalConditions {
            condition_1: format!("Trend Changed: {}", change),
            condition_2: format!(
                "Price {} {} {}",
                side, self.params.ma_kind, self.params.ma_length
            ),
            condition_3: "SuperTrend Signal Confirmed".to_string(),
        }
    }
}

impl SignalStrategy for SuperTrendMaStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SupertrendMa
    }

    fn min_candles(&self) -> usize {
        let first_valid = SuperTrendMa::new(&self.params).first_valid_index();
        StrategyKind::SupertrendMa.min_candles().max(first_valid + 2)
    }

    fn evaluate(
        &self,
        series: &CandleSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Option<Signal>, EngineError> {
        ensure_length(series, self.min_candles())?;
        ensure_finite_input(series)?;

        let mut calc = SuperTrendMa::new(&self.params);
        let mut rows = LastTwo::new();
        for candle in series {
            if let Some(point) = calc.update(candle) {
                rows.push(point);
            }
        }

        let (prev, latest) = rows.pair().ok_or(EngineError::InsufficientData {
            required: calc.first_valid_index() + 2,
            available: series.len(),
        })?;
        ensure_finite("ma", latest.ma)?;
        ensure_finite("final_up", latest.final_up)?;
        ensure_finite("final_dn", latest.final_dn)?;

        let Some(direction) = supertrend_direction(prev.trend, latest.trend) else {
            return Ok(None);
        };

        let candle = latest_candle(series)?;
        let band = active_band(&latest);
        let levels = trade_levels(
            ctx.market_type,
            StrategyKind::SupertrendMa,
            ctx.symbol,
            direction,
            candle.close,
            band,
        );

        Ok(Some(Signal {
            symbol: ctx.symbol.to_string(),
            market_type: ctx.market_type,
            strategy: StrategyKind::SupertrendMa,
            direction,
            price: round_to(candle.close, PRICE_DECIMALS),
            levels,
            indicators: IndicatorSnapshot::SupertrendMa {
                ma_value: round_to(latest.ma, PRICE_DECIMALS),
                ma_kind: self.params.ma_kind,
                trend: latest.trend,
                active_band: round_to(band, PRICE_DECIMALS),
            },
            volume: candle.volume,
            quote_volume: candle.quote_volume,
            timeframe: ctx.timeframe.to_string(),
            conditions: self.conditions(direction),
            accuracy: StrategyKind::SupertrendMa.accuracy().to_string(),
            all_conditions_met: true,
            timestamp: candle.timestamp,
        }))
    }
}
