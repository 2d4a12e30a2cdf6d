//! NavSignal Core — fund NAV signal engine.
//!
//! This crate contains the whole engine:
//! - Domain types (NAV observations and validated series)
//! - Indicator library (moving average, RSI, MACD, Bollinger, percentile, volatility)
//! - Signal model (`SignalType`, `StrategySignal` with clamped strength)
//! - Strategies behind one `Strategy` trait (MA cross, dynamic DCA, trend following)
//! - Strategy manager with copy-on-write registry, failure isolation and weighted consensus
//! - TOML engine configuration, CSV loading and seeded synthetic series

pub mod config;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod manager;
pub mod signal;
pub mod strategy;
pub mod synthetic;

pub use config::{ConfigError, EngineConfig, StrategyConfig};
pub use domain::{NavObservation, NavSeries, SeriesError};
pub use manager::{
    ConsensusConfig, Evaluation, ManagerError, SignalBatch, StrategyFailure, StrategyManager,
};
pub use signal::{IndicatorMap, IndicatorValue, SignalType, StrategySignal};
pub use strategy::{
    create_strategy, ParamError, ParamMap, SignalError, Strategy, StrategyDescription,
    StrategyKind,
};
