//! Trend-following signal scanner for crypto and forex markets.
//!
//! Candles flow from a [`services::MarketDataProvider`] through the streaming
//! indicator calculators into the two strategy evaluators; the
//! [`core::Scanner`] fans this out over the symbol universe and hands any
//! signals to the configured [`services::SignalSink`]s.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod strategies;
