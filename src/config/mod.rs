//! Scanner configuration
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! environment overrides. The result is validated once before any scan.

pub mod engine;

pub use engine::{EngineConfig, SarParams, SarSmaParams, SuperTrendParams};

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::scheduler::cron_expression;
use crate::models::signal::StrategyKind;

pub const DEFAULT_CONFIG_FILE: &str = "scanner_config.json";

pub const SUPPORTED_TIMEFRAMES: [&str; 6] = ["1m", "5m", "15m", "1h", "4h", "1d"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

/// Get the current environment (APP_ENV), defaulting to "sandbox".
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub interval_minutes: u64,
    pub timeframe: String,
    /// Minimum 24h quote volume for a crypto pair to enter the universe.
    pub min_volume: f64,
    pub active_strategies: Vec<StrategyKind>,
    pub scan_crypto: bool,
    pub scan_forex: bool,
    pub crypto_top_coins: usize,
    pub forex_pairs: Vec<String>,
    pub concurrency: usize,
    pub crypto_delay_ms: u64,
    pub forex_delay_ms: u64,
    pub sar_sma_candles: usize,
    pub supertrend_candles: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            timeframe: "5m".to_string(),
            min_volume: 500_000.0,
            active_strategies: StrategyKind::ALL.to_vec(),
            scan_crypto: true,
            scan_forex: true,
            crypto_top_coins: 30,
            forex_pairs: [
                "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "USDCAD", "AUDUSD", "NZDUSD", "XAUUSD",
                "XAGUSD", "USOIL", "UKOUSD", "EURGBP", "EURJPY", "GBPJPY",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            concurrency: 4,
            crypto_delay_ms: 100,
            forex_delay_ms: 150,
            sar_sma_candles: 100,
            supertrend_candles: 150,
        }
    }
}

impl ScanSettings {
    /// Number of candles fetched per symbol for a strategy.
    pub fn candles_for(&self, strategy: StrategyKind) -> usize {
        match strategy {
            StrategyKind::SarSma => self.sar_sma_candles,
            StrategyKind::SupertrendMa => self.supertrend_candles,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        cron_expression(self.interval_minutes)
            .map_err(|e| ConfigError::invalid("interval_minutes", e.to_string()))?;
        if !SUPPORTED_TIMEFRAMES.contains(&self.timeframe.as_str()) {
            return Err(ConfigError::invalid(
                "timeframe",
                format!(
                    "'{}' is not one of {}",
                    self.timeframe,
                    SUPPORTED_TIMEFRAMES.join(", ")
                ),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency", "must be greater than zero"));
        }
        if self.active_strategies.is_empty() {
            return Err(ConfigError::invalid("active_strategies", "must name at least one strategy"));
        }
        if !self.min_volume.is_finite() || self.min_volume < 0.0 {
            return Err(ConfigError::invalid("min_volume", "must be a finite, non-negative number"));
        }
        if self.sar_sma_candles < StrategyKind::SarSma.min_candles() {
            return Err(ConfigError::invalid(
                "sar_sma_candles",
                format!("must be at least {}", StrategyKind::SarSma.min_candles()),
            ));
        }
        if self.supertrend_candles < StrategyKind::SupertrendMa.min_candles() {
            return Err(ConfigError::invalid(
                "supertrend_candles",
                format!("must be at least {}", StrategyKind::SupertrendMa.min_candles()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    /// JSON array file signals are appended to; `None` disables the file sink.
    pub signals_file: Option<PathBuf>,
    pub log_signals: bool,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            signals_file: Some(PathBuf::from("signals.json")),
            log_signals: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scan: ScanSettings,
    pub engine: EngineConfig,
    pub sink: SinkSettings,
}

impl ScannerConfig {
    /// Load defaults, the optional config file and process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("SCANNER_CONFIG").ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if explicit.is_some() || path.exists() {
            info!(path = %path.display(), "Config: loading {}", path.display());
            Self::from_file(&path)?
        } else {
            debug!("Config: no config file found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides looked up by key; the lookup is the process
    /// environment in production and a map in tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCAN_INTERVAL_MINUTES") {
            self.scan.interval_minutes = parse_env("SCAN_INTERVAL_MINUTES", &v)?;
        }
        if let Some(v) = lookup("SCAN_TIMEFRAME") {
            self.scan.timeframe = v.trim().to_string();
        }
        if let Some(v) = lookup("SCAN_CONCURRENCY") {
            self.scan.concurrency = parse_env("SCAN_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("SCAN_CRYPTO") {
            self.scan.scan_crypto = parse_bool("SCAN_CRYPTO", &v)?;
        }
        if let Some(v) = lookup("SCAN_FOREX") {
            self.scan.scan_forex = parse_bool("SCAN_FOREX", &v)?;
        }
        if let Some(v) = lookup("CRYPTO_TOP_COINS") {
            self.scan.crypto_top_coins = parse_env("CRYPTO_TOP_COINS", &v)?;
        }
        if let Some(v) = lookup("SIGNALS_FILE") {
            let v = v.trim();
            self.sink.signals_file = if v.is_empty() {
                None
            } else {
                Some(PathBuf::from(v))
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.engine.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key,
            value: value.to_string(),
        }),
    }
}
