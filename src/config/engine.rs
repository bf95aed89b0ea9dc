//! Indicator and strategy parameters shared read-only by every evaluation.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::models::indicators::MaKind;

/// Parabolic SAR acceleration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarParams {
    pub af_start: f64,
    pub af_increment: f64,
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_increment: 0.02,
            af_max: 0.2,
        }
    }
}

impl SarParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.af_start.is_finite() || self.af_start <= 0.0 {
            return Err(ConfigError::invalid("af_start", "must be a positive number"));
        }
        if !self.af_increment.is_finite() || self.af_increment < 0.0 {
            return Err(ConfigError::invalid("af_increment", "must not be negative"));
        }
        if !self.af_max.is_finite() || self.af_max < self.af_start {
            return Err(ConfigError::invalid("af_max", "must be at least af_start"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarSmaParams {
    pub af_start: f64,
    pub af_increment: f64,
    pub af_max: f64,
    pub sma_fast: usize,
    pub sma_slow: usize,
}

impl Default for SarSmaParams {
    fn default() -> Self {
        let sar = SarParams::default();
        Self {
            af_start: sar.af_start,
            af_increment: sar.af_increment,
            af_max: sar.af_max,
            sma_fast: 20,
            sma_slow: 40,
        }
    }
}

impl SarSmaParams {
    pub fn sar_params(&self) -> SarParams {
        SarParams {
            af_start: self.af_start,
            af_increment: self.af_increment,
            af_max: self.af_max,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sar_params().validate()?;
        if self.sma_fast == 0 {
            return Err(ConfigError::invalid("sma_fast", "must be greater than zero"));
        }
        if self.sma_fast >= self.sma_slow {
            return Err(ConfigError::invalid(
                "sma_fast",
                format!("must be below sma_slow ({})", self.sma_slow),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperTrendParams {
    pub ma_kind: MaKind,
    pub ma_length: usize,
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub use_standard_atr: bool,
}

impl Default for SuperTrendParams {
    fn default() -> Self {
        Self {
            ma_kind: MaKind::Ema,
            ma_length: 100,
            atr_period: 10,
            atr_multiplier: 0.5,
            use_standard_atr: true,
        }
    }
}

impl SuperTrendParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_length == 0 {
            return Err(ConfigError::invalid("ma_length", "must be greater than zero"));
        }
        if self.atr_period == 0 {
            return Err(ConfigError::invalid("atr_period", "must be greater than zero"));
        }
        if !self.atr_multiplier.is_finite() || self.atr_multiplier < 0.0 {
            return Err(ConfigError::invalid(
                "atr_multiplier",
                "must be a finite, non-negative number",
            ));
        }
        Ok(())
    }
}

/// Parameters for both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sar_sma: SarSmaParams,
    pub supertrend_ma: SuperTrendParams,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sar_sma.validate()?;
        self.supertrend_ma.validate()
    }
}
