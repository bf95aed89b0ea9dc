//! Streaming indicator calculators.
//!
//! Each calculator is fed one candle at a time and carries only the small
//! recurrence state it needs. Warm-up samples are reported as `None`.

pub mod structure;
pub mod trend;
pub mod volatility;

pub use structure::{calculate_supertrend_ma, BandState, SuperTrendMa, SuperTrendPoint};
pub use trend::{calculate_sar, Ema, MovingAverage, ParabolicSar, SarState, Sma};
pub use volatility::{Atr, AtrMode};
