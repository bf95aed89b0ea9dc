//! Strategy evaluators that turn indicator readings into signals.

pub mod evaluator;
pub mod levels;
pub mod sar_sma;
pub mod supertrend_ma;

pub use evaluator::{EvaluationContext, SignalStrategy};
pub use sar_sma::SarSmaStrategy;
pub use supertrend_ma::SuperTrendMaStrategy;
