//! Signal evaluation entry point and its error type.

pub mod engine;
pub mod error;

pub use engine::SignalEngine;
pub use error::EngineError;
