//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{Candle, CandleSeries, MaKind, TrendDirection};
pub use signal::{
    IndicatorSnapshot, MarketType, Signal, SignalConditions, SignalDirection, StrategyKind,
    TradeLevels,
};
