//! Backtest runner: wires together data, indicators, engine, and metrics.
//!
//! Entry points:
//! - `run_single_backtest()`: loads bars per config, then runs. Used by the CLI.
//! - `run_backtest_from_bars()`: takes pre-loaded bars, no I/O.
//! - `run_monte_carlo_backtest()`: loads bars and runs the Monte Carlo driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use propsim_core::domain::{EquityPoint, Position, TradeRecord};
use propsim_core::engine::Simulator;
use propsim_core::indicators::IndicatorFrame;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError, LoadedBars};
use crate::metrics::PerformanceMetrics;
use crate::monte_carlo::{run_monte_carlo, McError, McReport};
use crate::reporting::monthly::{monthly_breakdown, MonthlyRow};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid simulation config: {0}")]
    Simulation(#[from] propsim_core::ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("monte carlo error: {0}")]
    MonteCarlo(#[from] McError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub config: BacktestConfig,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub monthly: Vec<MonthlyRow>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub bar_count: usize,
    /// First simulated bar; `None` when the data was too short.
    pub start_index: Option<usize>,
    pub signals_skipped: usize,
    pub halted_bars: usize,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub open_position: Option<Position>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Monte Carlo output plus the provenance needed to reproduce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub config: BacktestConfig,
    pub bar_count: usize,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub report: McReport,
}

/// Load bars as configured and run one deterministic backtest.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.data)?;
    run_backtest_from_bars(config, &loaded)
}

/// Run one deterministic backtest over pre-loaded bars.
pub fn run_backtest_from_bars(
    config: &BacktestConfig,
    loaded: &LoadedBars,
) -> Result<BacktestResult, RunError> {
    let run_id = config.run_id()?;
    let simulator = Simulator::new(config.simulation.clone())?;
    let bars = &loaded.bars;
    let frame = IndicatorFrame::compute(bars, &config.indicators);

    info!(
        run_id = %&run_id[..12],
        bars = bars.len(),
        strategies = ?simulator.evaluator().strategy_names(),
        "starting backtest"
    );
    let outcome = simulator.run(bars, &frame);
    let metrics = PerformanceMetrics::compute(&outcome, config.report.periods_per_year);
    let monthly = monthly_breakdown(&outcome.trades, &outcome.equity_curve, outcome.initial_balance);

    info!(
        trades = metrics.trade_count,
        final_balance = metrics.final_balance,
        return_pct = metrics.total_return_pct,
        max_drawdown_pct = metrics.max_drawdown_pct,
        "backtest finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        metrics,
        monthly,
        initial_balance: outcome.initial_balance,
        final_balance: outcome.final_balance,
        start_time: bars.first().map(|b| b.timestamp),
        end_time: bars.last().map(|b| b.timestamp),
        bar_count: bars.len(),
        start_index: outcome.start_index,
        signals_skipped: outcome.signals_skipped,
        halted_bars: outcome.halted_bars,
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.is_synthetic(),
        open_position: outcome.open_position,
        trades: outcome.trades,
        equity_curve: outcome.equity_curve,
    })
}

/// Load bars as configured and run the Monte Carlo driver.
pub fn run_monte_carlo_backtest(config: &BacktestConfig) -> Result<MonteCarloResult, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.data)?;
    run_monte_carlo_from_bars(config, &loaded)
}

pub fn run_monte_carlo_from_bars(
    config: &BacktestConfig,
    loaded: &LoadedBars,
) -> Result<MonteCarloResult, RunError> {
    let run_id = config.run_id()?;
    let simulator = Simulator::new(config.simulation.clone())?;
    let frame = IndicatorFrame::compute(&loaded.bars, &config.indicators);
    let report = run_monte_carlo(&loaded.bars, &frame, &simulator, &config.monte_carlo)?;

    Ok(MonteCarloResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        bar_count: loaded.bars.len(),
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.is_synthetic(),
        report,
    })
}
