//! Monte Carlo driver: reproducibility, isolation of runs, summary consistency.

use propsim_core::domain::Bar;
use propsim_core::engine::{SimConfig, Simulator};
use propsim_core::indicators::{IndicatorFrame, IndicatorSettings};
use propsim_runner::config::BacktestConfig;
use propsim_runner::data_loader::{load_bars, DataConfig};
use propsim_runner::metrics::trade_count;
use propsim_runner::monte_carlo::{run_monte_carlo, McError, MonteCarloConfig};
use propsim_runner::runner::run_monte_carlo_backtest;

fn fixture() -> (Vec<Bar>, IndicatorFrame, Simulator) {
    let data = DataConfig {
        synthetic_bars: 1_500,
        ..DataConfig::default()
    };
    let bars = load_bars(&data).unwrap().bars;
    let frame = IndicatorFrame::compute(&bars, &IndicatorSettings::default());

    let sim = SimConfig {
        drawdown_risk_steps: Vec::new(),
        enable_htf_filter: false,
        enable_adx_filter: false,
        ..SimConfig::default()
    };
    (bars, frame, Simulator::new(sim).unwrap())
}

fn mc_config(parallel: bool) -> MonteCarloConfig {
    MonteCarloConfig {
        runs: 24,
        parallel,
        ..MonteCarloConfig::default()
    }
}

#[test]
fn parallel_and_sequential_agree() {
    let (bars, frame, sim) = fixture();
    let sequential = run_monte_carlo(&bars, &frame, &sim, &mc_config(false)).unwrap();
    let parallel = run_monte_carlo(&bars, &frame, &sim, &mc_config(true)).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn same_seed_reproduces() {
    let (bars, frame, sim) = fixture();
    let a = run_monte_carlo(&bars, &frame, &sim, &mc_config(true)).unwrap();
    let b = run_monte_carlo(&bars, &frame, &sim, &mc_config(true)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seed_changes_runs() {
    let (bars, frame, sim) = fixture();
    let a = run_monte_carlo(&bars, &frame, &sim, &mc_config(false)).unwrap();
    let other = MonteCarloConfig {
        seed: 43,
        ..mc_config(false)
    };
    let b = run_monte_carlo(&bars, &frame, &sim, &other).unwrap();
    let biases_a: Vec<f64> = a.runs.iter().map(|r| r.slippage_bias).collect();
    let biases_b: Vec<f64> = b.runs.iter().map(|r| r.slippage_bias).collect();
    assert_ne!(biases_a, biases_b);
}

#[test]
fn runs_are_indexed_and_independent() {
    let (bars, frame, sim) = fixture();
    let report = run_monte_carlo(&bars, &frame, &sim, &mc_config(true)).unwrap();
    assert_eq!(report.runs.len(), 24);
    for (i, run) in report.runs.iter().enumerate() {
        assert_eq!(run.index, i);
        assert!((0.0..0.10).contains(&run.slippage_bias));
    }
    // Each run has its own seed, so slippage draws differ.
    let first = report.runs[0].slippage_bias;
    assert!(report.runs.iter().any(|r| r.slippage_bias != first));

    // A shorter batch reproduces the prefix of a longer one.
    let short = MonteCarloConfig {
        runs: 5,
        ..mc_config(true)
    };
    let prefix = run_monte_carlo(&bars, &frame, &sim, &short).unwrap();
    assert_eq!(prefix.runs[..], report.runs[..5]);
}

#[test]
fn summary_matches_runs() {
    let (bars, frame, sim) = fixture();
    let report = run_monte_carlo(&bars, &frame, &sim, &mc_config(true)).unwrap();
    let s = &report.summary;
    let returns: Vec<f64> = report.runs.iter().map(|r| r.total_return_pct).collect();

    assert_eq!(s.run_count, 24);
    assert_eq!(s.positive_runs, returns.iter().filter(|&&r| r > 0.0).count());
    assert_eq!(s.min_return_pct, returns.iter().cloned().fold(f64::INFINITY, f64::min));
    assert_eq!(s.max_return_pct, returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    assert!(s.min_return_pct <= s.p10_return_pct);
    assert!(s.p10_return_pct <= s.median_return_pct);
    assert!(s.median_return_pct <= s.p90_return_pct);
    assert!(s.p90_return_pct <= s.max_return_pct);
}

#[test]
fn zero_noise_matches_deterministic_run() {
    let (bars, frame, sim) = fixture();
    let quiet = MonteCarloConfig {
        runs: 3,
        slippage_range: (0.0, 0.0),
        missed_signal_probability: 0.0,
        ..MonteCarloConfig::default()
    };
    let report = run_monte_carlo(&bars, &frame, &sim, &quiet).unwrap();
    let baseline = sim.run(&bars, &frame);
    for run in &report.runs {
        assert_eq!(run.final_balance, baseline.final_balance);
        assert_eq!(run.trade_count, trade_count(&baseline.trades));
    }
}

#[test]
fn zero_runs_is_an_error() {
    let (bars, frame, sim) = fixture();
    let none = MonteCarloConfig {
        runs: 0,
        ..MonteCarloConfig::default()
    };
    assert!(matches!(
        run_monte_carlo(&bars, &frame, &sim, &none),
        Err(McError::NoRuns)
    ));
}

#[test]
fn end_to_end_from_config() {
    let mut config = BacktestConfig::default();
    config.data.synthetic_bars = 800;
    config.monte_carlo.runs = 8;
    let result = run_monte_carlo_backtest(&config).unwrap();
    assert_eq!(result.report.runs.len(), 8);
    assert_eq!(result.report.master_seed, 42);
    assert_eq!(result.bar_count, 800);
    assert!(result.has_synthetic);
}
