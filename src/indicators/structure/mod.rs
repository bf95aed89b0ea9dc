//! Structure indicators: SuperTrend bands

pub mod supertrend;

pub use supertrend::*;
