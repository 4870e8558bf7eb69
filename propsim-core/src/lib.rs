//! PropSim Core: domain types, indicator frame, entry strategies, risk
//! sizing and the bar-by-bar simulation loop.
//!
//! This crate is the engine of the intraday backtester:
//! - Domain types (bars, positions, trade records, the realized-equity account)
//! - Indicator pipeline producing one row of derived values per bar
//! - Signal Evaluator: an ordered cascade of entry strategies behind filters
//! - Risk Sizer with a drawdown throttle and optional loss guard
//! - Simulation Loop with a pluggable execution-noise stream
//! - Deterministic per-run RNG derivation for Monte Carlo
//!
//! No I/O happens here; loading data and writing reports live in the runner.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod rng;
pub mod strategy;

pub use error::ConfigError;
