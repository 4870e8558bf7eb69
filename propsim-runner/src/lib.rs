//! PropSim Runner: configuration, data loading, orchestration, reporting.
//!
//! This crate builds on `propsim-core` to provide:
//! - TOML backtest configuration with a deterministic run id
//! - CSV bar loading with a synthetic fallback
//! - Single-run orchestration with performance metrics and a monthly breakdown
//! - The Monte Carlo driver (per-run seeded streams, optionally rayon-parallel)
//! - CSV, JSON and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod monte_carlo;
pub mod reporting;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, ReportConfig};
pub use data_loader::{load_bars, DataConfig, DataSource, LoadError, LoadedBars};
pub use metrics::PerformanceMetrics;
pub use monte_carlo::{run_monte_carlo, McError, McReport, McRun, McSummary, MonteCarloConfig};
pub use reporting::MonthlyRow;
pub use runner::{
    run_backtest_from_bars, run_monte_carlo_backtest, run_monte_carlo_from_bars,
    run_single_backtest, BacktestResult, MonteCarloResult, RunError, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn results_are_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<MonteCarloResult>();
        assert_sync::<MonteCarloResult>();
        assert_send::<McReport>();
        assert_sync::<McReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<MonteCarloConfig>();
        assert_sync::<MonteCarloConfig>();
        assert_send::<DataConfig>();
        assert_sync::<DataConfig>();
    }

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }
}
