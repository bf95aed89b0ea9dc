//! Destinations for emitted signals.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::signal::Signal;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize signals: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, signals: &[Signal]) -> Result<(), SinkError>;
}

/// Appends signals to a JSON array stored in a single file.
///
/// The file is rewritten atomically through a temporary sibling so a reader
/// never observes a half-written array.
pub struct JsonFileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Signals currently stored in the file; a missing or empty file is an empty list.
    pub async fn read_all(&self) -> Result<Vec<Signal>, SinkError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(SinkError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SignalSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn publish(&self, signals: &[Signal]) -> Result<(), SinkError> {
        if signals.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;

        let mut stored = self.read_all().await?;
        stored.extend_from_slice(signals);
        let body = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        info!(
            path = %self.path.display(),
            added = signals.len(),
            total = stored.len(),
            "JsonFileSink: saved {} signals to {}",
            signals.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes one structured log line per signal.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, signals: &[Signal]) -> Result<(), SinkError> {
        for signal in signals {
            info!(
                symbol = %signal.symbol,
                market_type = %signal.market_type,
                strategy = %signal.strategy,
                direction = %signal.direction,
                price = signal.price,
                tp1 = signal.levels.tp1,
                tp2 = signal.levels.tp2,
                stop_loss = signal.levels.stop_loss,
                timeframe = %signal.timeframe,
                accuracy = %signal.accuracy,
                "Signal: {} {} {} @ {}",
                signal.strategy,
                signal.direction,
                signal.symbol,
                signal.price
            );
        }
        Ok(())
    }
}
