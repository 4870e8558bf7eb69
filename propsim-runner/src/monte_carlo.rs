//! Monte Carlo driver: repeats the Simulation Loop over the same price path
//! with randomized execution.
//!
//! Each run draws one slippage bias (applied adversely to entries and stop
//! exits) and misses signals with a fixed per-bar probability. Every run owns
//! an RNG seeded from `RngHierarchy::run_seed(index)`, so results do not
//! depend on run order and the sequential and rayon paths agree exactly.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use propsim_core::domain::Bar;
use propsim_core::engine::{SeededNoise, Simulator};
use propsim_core::indicators::IndicatorFrame;
use propsim_core::rng::RngHierarchy;
use propsim_core::ConfigError;

use crate::metrics;

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of simulated runs.
    pub runs: usize,
    /// Per-run slippage bias is drawn uniformly from `[low, high)` in price units.
    pub slippage_range: (f64, f64),
    /// Per-bar probability of skipping signal evaluation.
    pub missed_signal_probability: f64,
    /// Master seed for the per-run streams.
    pub seed: u64,
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            slippage_range: (0.0, 0.10),
            missed_signal_probability: 0.05,
            seed: 42,
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (low, high) = self.slippage_range;
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(ConfigError::Invalid {
                field: "slippage_range",
                reason: format!("({low}, {high}) is not an ordered finite range"),
            });
        }
        if !(0.0..=1.0).contains(&self.missed_signal_probability) {
            return Err(ConfigError::OutOfUnitRange {
                field: "missed_signal_probability",
                value: self.missed_signal_probability,
            });
        }
        Ok(())
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// One randomized run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McRun {
    pub index: usize,
    pub seed: u64,
    pub slippage_bias: f64,
    pub total_return_pct: f64,
    pub trade_count: usize,
    pub final_balance: f64,
    pub max_drawdown_pct: f64,
}

/// Distribution of terminal returns across all runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McSummary {
    pub run_count: usize,
    pub median_return_pct: f64,
    pub min_return_pct: f64,
    pub max_return_pct: f64,
    pub mean_return_pct: f64,
    pub p10_return_pct: f64,
    pub p90_return_pct: f64,
    /// Runs that finished with a strictly positive return.
    pub positive_runs: usize,
    /// `positive_runs` as a percentage of all runs.
    pub survival_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McReport {
    pub master_seed: u64,
    pub runs: Vec<McRun>,
    pub summary: McSummary,
}

#[derive(Debug, Error)]
pub enum McError {
    #[error("monte carlo requires at least one run")]
    NoRuns,
    #[error("invalid monte carlo config: {0}")]
    Config(#[from] ConfigError),
}

// ─── Driver ──────────────────────────────────────────────────────────

/// Run `config.runs` noisy passes of `simulator` over the same bars.
pub fn run_monte_carlo(
    bars: &[Bar],
    frame: &IndicatorFrame,
    simulator: &Simulator,
    config: &MonteCarloConfig,
) -> Result<McReport, McError> {
    config.validate()?;
    if config.runs == 0 {
        return Err(McError::NoRuns);
    }

    let hierarchy = RngHierarchy::new(config.seed);
    info!(
        runs = config.runs,
        seed = config.seed,
        parallel = config.parallel,
        "starting monte carlo"
    );

    let run_one = |index: usize| simulate_run(bars, frame, simulator, config, &hierarchy, index);
    let runs: Vec<McRun> = if config.parallel {
        (0..config.runs).into_par_iter().map(run_one).collect()
    } else {
        (0..config.runs).map(run_one).collect()
    };

    let summary = summarize(&runs);
    info!(
        median = summary.median_return_pct,
        min = summary.min_return_pct,
        positive = summary.positive_runs,
        "monte carlo finished"
    );

    Ok(McReport {
        master_seed: config.seed,
        runs,
        summary,
    })
}

fn simulate_run(
    bars: &[Bar],
    frame: &IndicatorFrame,
    simulator: &Simulator,
    config: &MonteCarloConfig,
    hierarchy: &RngHierarchy,
    index: usize,
) -> McRun {
    let run_index = index as u64;
    let mut noise = SeededNoise::new(
        hierarchy.rng_for_run(run_index),
        config.slippage_range,
        config.missed_signal_probability,
    );
    let outcome = simulator.run_with_noise(bars, frame, &mut noise);
    debug!(
        run = index,
        slippage = noise.slippage_bias(),
        trades = metrics::trade_count(&outcome.trades),
        return_pct = outcome.total_return_pct(),
        "monte carlo run"
    );

    McRun {
        index,
        seed: hierarchy.run_seed(run_index),
        slippage_bias: noise.slippage_bias(),
        total_return_pct: outcome.total_return_pct(),
        trade_count: metrics::trade_count(&outcome.trades),
        final_balance: outcome.final_balance,
        max_drawdown_pct: outcome.max_drawdown_pct(),
    }
}

// ─── Summary statistics ──────────────────────────────────────────────

pub fn summarize(runs: &[McRun]) -> McSummary {
    let mut returns: Vec<f64> = runs.iter().map(|r| r.total_return_pct).collect();
    returns.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = returns.len();
    let positive_runs = returns.iter().filter(|&&r| r > 0.0).count();
    let mean = if n == 0 {
        0.0
    } else {
        returns.iter().sum::<f64>() / n as f64
    };

    McSummary {
        run_count: n,
        median_return_pct: percentile_sorted(&returns, 50.0),
        min_return_pct: returns.first().copied().unwrap_or(0.0),
        max_return_pct: returns.last().copied().unwrap_or(0.0),
        mean_return_pct: mean,
        p10_return_pct: percentile_sorted(&returns, 10.0),
        p90_return_pct: percentile_sorted(&returns, 90.0),
        positive_runs,
        survival_rate: if n == 0 {
            0.0
        } else {
            positive_runs as f64 / n as f64 * 100.0
        },
    }
}

/// Percentile of a sorted slice using linear interpolation.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
