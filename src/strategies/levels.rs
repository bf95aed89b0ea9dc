//! Take-profit and stop-loss levels
//!
//! Crypto levels are percentage offsets from the entry with the stop anchored
//! just beyond the strategy's trailing indicator (SAR or the active band).
//! Forex levels are fixed pip distances.

use crate::common::math::round_to;
use crate::models::signal::{MarketType, SignalDirection, StrategyKind, TradeLevels};

const CRYPTO_DECIMALS: u32 = 6;
const FOREX_DECIMALS: u32 = 5;

/// Multipliers applied to (entry, entry, anchor).
struct CryptoOffsets {
    tp1: f64,
    tp2: f64,
    stop: f64,
}

/// Pip counts for (tp1, tp2, stop distance from anchor).
struct PipOffsets {
    tp1: f64,
    tp2: f64,
    stop: f64,
}

fn crypto_offsets(strategy: StrategyKind, direction: SignalDirection) -> CryptoOffsets {
    match (strategy, direction) {
        (StrategyKind::SarSma, SignalDirection::Long) => CryptoOffsets {
            tp1: 1.015,
            tp2: 1.03,
            stop: 0.998,
        },
        (StrategyKind::SarSma, SignalDirection::Short) => CryptoOffsets {
            tp1: 0.985,
            tp2: 0.97,
            stop: 1.002,
        },
        (StrategyKind::SupertrendMa, SignalDirection::Long) => CryptoOffsets {
            tp1: 1.025,
            tp2: 1.05,
            stop: 0.995,
        },
        (StrategyKind::SupertrendMa, SignalDirection::Short) => CryptoOffsets {
            tp1: 0.975,
            tp2: 0.95,
            stop: 1.005,
        },
    }
}

fn pip_offsets(strategy: StrategyKind) -> PipOffsets {
    match strategy {
        StrategyKind::SarSma => PipOffsets {
            tp1: 20.0,
            tp2: 40.0,
            stop: 5.0,
        },
        StrategyKind::SupertrendMa => PipOffsets {
            tp1: 30.0,
            tp2: 60.0,
            stop: 10.0,
        },
    }
}

/// Pip size for a forex symbol. JPY pairs take precedence over gold.
pub fn pip_size(symbol: &str, strategy: StrategyKind) -> f64 {
    let symbol = symbol.to_ascii_uppercase();
    if symbol.contains("JPY") {
        0.01
    } else if symbol.contains("XAU") {
        match strategy {
            StrategyKind::SarSma => 0.5,
            StrategyKind::SupertrendMa => 0.75,
        }
    } else {
        0.0001
    }
}

/// Levels for an entry at `price`; `anchor` is the SAR value or active band.
pub fn trade_levels(
    market_type: MarketType,
    strategy: StrategyKind,
    symbol: &str,
    direction: SignalDirection,
    price: f64,
    anchor: f64,
) -> TradeLevels {
    match market_type {
        MarketType::Crypto => {
            let o = crypto_offsets(strategy, direction);
            TradeLevels {
                tp1: round_to(price * o.tp1, CRYPTO_DECIMALS),
                tp2: round_to(price * o.tp2, CRYPTO_DECIMALS),
                stop_loss: round_to(anchor * o.stop, CRYPTO_DECIMALS),
            }
        }
        MarketType::Forex => {
            let pip = pip_size(symbol, strategy);
            let o = pip_offsets(strategy);
            let sign = match direction {
                SignalDirection::Long => 1.0,
                SignalDirection::Short => -1.0,
            };
            TradeLevels {
                tp1: round_to(price + sign * o.tp1 * pip, FOREX_DECIMALS),
                tp2: round_to(price + sign * o.tp2 * pip, FOREX_DECIMALS),
                stop_loss: round_to(anchor - sign * o.stop * pip, FOREX_DECIMALS),
            }
        }
    }
}
