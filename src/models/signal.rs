//! Signal records emitted by the strategy evaluators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::indicators::{MaKind, TrendDirection};

/// Market a symbol trades on; drives the target/stop convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketType {
    Crypto,
    Forex,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Crypto => write!(f, "CRYPTO"),
            MarketType::Forex => write!(f, "FOREX"),
        }
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRYPTO" => Ok(MarketType::Crypto),
            "FOREX" => Ok(MarketType::Forex),
            other => Err(format!("unknown market type '{}'", other)),
        }
    }
}

/// The two supported strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    SarSma,
    SupertrendMa,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::SarSma, StrategyKind::SupertrendMa];

    /// Static accuracy label attached to every signal of the strategy.
    pub fn accuracy(self) -> &'static str {
        match self {
            StrategyKind::SarSma => "60-65%",
            StrategyKind::SupertrendMa => "75-80%",
        }
    }

    /// Minimum series length below which no signal is produced.
    pub fn min_candles(self) -> usize {
        match self {
            StrategyKind::SarSma => 50,
            StrategyKind::SupertrendMa => 110,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::SarSma => write!(f, "SAR_SMA"),
            StrategyKind::SupertrendMa => write!(f, "SUPERTREND_MA"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAR_SMA" => Ok(StrategyKind::SarSma),
            "SUPERTREND_MA" => Ok(StrategyKind::SupertrendMa),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Long => write!(f, "LONG"),
            SignalDirection::Short => write!(f, "SHORT"),
        }
    }
}

/// Indicator readings on the candle that triggered the signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSnapshot {
    SarSma {
        sma_fast: f64,
        sma_slow: f64,
        sar: f64,
    },
    SupertrendMa {
        ma_value: f64,
        ma_kind: MaKind,
        trend: TrendDirection,
        active_band: f64,
    },
}

/// Human-readable description of the three conditions that held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConditions {
    pub condition_1: String,
    pub condition_2: String,
    pub condition_3: String,
}

/// Take-profit and stop-loss prices derived from the entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub tp1: f64,
    pub tp2: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub market_type: MarketType,
    pub strategy: StrategyKind,
    pub direction: SignalDirection,
    pub price: f64,
    #[serde(flatten)]
    pub levels: TradeLevels,
    pub indicators: IndicatorSnapshot,
    pub volume: f64,
    pub quote_volume: f64,
    pub timeframe: String,
    pub conditions: SignalConditions,
    pub accuracy: String,
    pub all_conditions_met: bool,
    /// Open time of the candle the predicate fired on.
    pub timestamp: DateTime<Utc>,
}
