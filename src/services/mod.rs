//! External collaborators: market data sources and signal sinks.

pub mod binance;
pub mod market_data;
pub mod sink;
pub mod yahoo;

pub use binance::BinanceClient;
pub use market_data::{HttpMarketDataProvider, MarketDataError, MarketDataProvider};
pub use sink::{JsonFileSink, LogSink, SignalSink, SinkError};
pub use yahoo::YahooClient;
