use thiserror::Error;

/// Failure of a single (series, strategy) evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient data: {available} candles available, {required} required")]
    InsufficientData { required: usize, available: usize },

    #[error("computation failed: {0}")]
    ComputeFailure(String),
}
