//! Trend indicators: moving averages, Parabolic SAR

pub mod ma;
pub mod sar;

pub use ma::*;
pub use sar::*;
