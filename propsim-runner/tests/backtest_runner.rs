//! Integration tests for the runner: the full pipeline on synthetic and CSV bars.

use std::io::Write;

use chrono::{Duration, TimeZone, Utc};

use propsim_core::domain::Bar;
use propsim_core::engine::{SimConfig, Simulator};
use propsim_core::indicators::{IndicatorFrame, IndicatorRow};

use propsim_runner::config::BacktestConfig;
use propsim_runner::data_loader::{load_bars, synthetic_bars, DataSource, LoadedBars};
use propsim_runner::metrics::{trade_count, PerformanceMetrics};
use propsim_runner::reporting::monthly_breakdown;
use propsim_runner::runner::{run_backtest_from_bars, run_single_backtest, RunError};

/// Filters and throttle off so the synthetic walk produces plenty of trades.
fn permissive_config() -> BacktestConfig {
    let mut config = BacktestConfig::default();
    config.data.synthetic_bars = 2_000;
    config.simulation.drawdown_risk_steps = Vec::new();
    config.simulation.enable_htf_filter = false;
    config.simulation.enable_adx_filter = false;
    config
}

#[test]
fn synthetic_run_produces_trades_and_consistent_books() {
    let config = permissive_config();
    let result = run_single_backtest(&config).unwrap();

    assert!(result.has_synthetic);
    assert_eq!(result.bar_count, 2_000);
    assert!(!result.trades.is_empty());

    let start = result.start_index.unwrap();
    assert!(start >= config.simulation.warmup_bars);
    assert_eq!(result.equity_curve.len(), result.bar_count - start);

    // Balance identity: initial + sum(pnl) == final.
    let pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
    assert!((result.initial_balance + pnl - result.final_balance).abs() < 1e-6);
    assert_eq!(result.metrics.trade_count, trade_count(&result.trades));
    assert_eq!(result.metrics.final_balance, result.final_balance);

    // Trades never overlap.
    for pair in result.trades.windows(2) {
        assert!(pair[1].entry_bar >= pair[0].exit_bar);
    }

    // Monthly rows account for every trade.
    let monthly_trades: usize = result.monthly.iter().map(|m| m.trades).sum();
    assert_eq!(monthly_trades, trade_count(&result.trades));
    let monthly_profit: f64 = result.monthly.iter().map(|m| m.net_profit).sum();
    assert!((monthly_profit - pnl).abs() < 1e-6);
}

#[test]
fn identical_configs_give_identical_results() {
    let config = permissive_config();
    let a = run_single_backtest(&config).unwrap();
    let b = run_single_backtest(&config).unwrap();
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.trades, b.trades);
    assert_eq!(a.equity_curve, b.equity_curve);
    assert_eq!(a.dataset_hash, b.dataset_hash);
}

#[test]
fn default_throttle_never_opens_at_halt_drawdown() {
    let mut config = BacktestConfig::default();
    config.data.synthetic_bars = 2_000;
    let result = run_single_backtest(&config).unwrap();
    let Some(start) = result.start_index else {
        panic!("2,000 bars should be enough to simulate");
    };

    let mut peak = result.initial_balance;
    let drawdowns: Vec<f64> = result
        .equity_curve
        .iter()
        .map(|p| {
            peak = f64::max(peak, p.balance);
            (peak - p.balance) / peak * 100.0
        })
        .collect();

    // Entries on bar i are sized from the balance carried out of bar i - 1.
    for trade in result.trades.iter().filter(|t| t.entry_bar > start) {
        assert!(drawdowns[trade.entry_bar - 1 - start] < 2.0);
    }
}

#[test]
fn too_few_bars_yield_empty_result() {
    let mut config = BacktestConfig::default();
    config.data.synthetic_bars = 30;
    let result = run_single_backtest(&config).unwrap();
    assert_eq!(result.start_index, None);
    assert!(result.trades.is_empty());
    assert!(result.equity_curve.is_empty());
    assert_eq!(result.final_balance, result.initial_balance);
    assert!(result.monthly.is_empty());
}

#[test]
fn runs_from_csv_file() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = synthetic_bars(400, 11, 1_900.0, start);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timestamp,open,high,low,close").unwrap();
    for bar in &bars {
        writeln!(
            file,
            "{},{},{},{},{}",
            bar.timestamp.to_rfc3339(),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        )
        .unwrap();
    }
    file.flush().unwrap();

    let mut config = permissive_config();
    config.data.path = Some(file.path().to_path_buf());

    let loaded = load_bars(&config.data).unwrap();
    assert_eq!(loaded.source, DataSource::Csv(file.path().to_path_buf()));
    assert_eq!(loaded.bars.len(), 400);

    let from_file = run_single_backtest(&config).unwrap();
    let in_memory =
        run_backtest_from_bars(&config, &LoadedBars::new(bars, DataSource::Synthetic)).unwrap();
    assert!(!from_file.has_synthetic);
    assert_eq!(from_file.dataset_hash, in_memory.dataset_hash);
    assert_eq!(from_file.trades, in_memory.trades);
}

#[test]
fn missing_csv_is_a_data_error() {
    let mut config = BacktestConfig::default();
    config.data.path = Some("/definitely/not/here.csv".into());
    assert!(matches!(run_single_backtest(&config), Err(RunError::Data(_))));
}

#[test]
fn invalid_config_is_rejected_before_loading() {
    let mut config = BacktestConfig::default();
    config.simulation.stop_atr_multiplier = 0.0;
    config.data.path = Some("/definitely/not/here.csv".into());
    assert!(matches!(run_single_backtest(&config), Err(RunError::Config(_))));
}

/// Long entry at bar 2, stopped out by the bar-3 crash, re-entered at bar 3
/// and closed at bar 4 with the throttle fully shut.
fn stop_out_then_throttled_exit() -> (Vec<Bar>, IndicatorFrame) {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
    let bar = |i: i64, open, high, low, close| {
        Bar::new(start + Duration::hours(i), open, high, low, close)
    };
    let mut bars = vec![
        bar(0, 2000.0, 2001.1, 1999.9, 2001.0),
        bar(1, 2001.0, 2002.1, 2000.9, 2002.0),
        bar(2, 2002.0, 2003.1, 2001.9, 2003.0),
        bar(3, 2003.0, 2003.1, 1993.0, 1998.0),
        bar(4, 1998.0, 1999.0, 1997.0, 1998.5),
    ];
    let mut close = 1998.5;
    for i in 5..30 {
        let open = close;
        close = open + 1.0;
        bars.push(bar(i, open, close + 0.1, open - 0.1, close));
    }
    let row = IndicatorRow {
        atr: 1.0,
        sma: 2000.0,
        std_dev: 400.0,
        upper_band: 3000.0,
        lower_band: 1000.0,
        ema_fast: 2000.0,
        ema_slow: 2000.0,
        ema_trend: 10.0,
        rsi: 50.0,
        adx: 30.0,
    };
    let frame = IndicatorFrame::from_rows(vec![row; bars.len()]);
    (bars, frame)
}

#[test]
fn throttled_exit_is_booked_but_not_counted() {
    let (bars, frame) = stop_out_then_throttled_exit();
    let config = SimConfig {
        risk_percent: 0.03,
        warmup_bars: 2,
        ..SimConfig::default()
    };
    let outcome = Simulator::new(config).unwrap().run(&bars, &frame);

    assert_eq!(outcome.trades.len(), 2);
    assert_eq!(outcome.trades[1].size, 0.0);
    assert!(outcome.trades[1].pnl.is_sign_positive());

    let metrics = PerformanceMetrics::compute(&outcome, 252.0 * 23.0);
    assert_eq!(metrics.trade_count, 1);
    assert!((metrics.avg_lots - 20.0).abs() < 1e-9);
    assert_eq!(metrics.win_rate, 0.0);

    let monthly = monthly_breakdown(&outcome.trades, &outcome.equity_curve, outcome.initial_balance);
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].trades, 1);
    assert_eq!(monthly[0].losses, 1);
    assert!((monthly[0].avg_lots - 20.0).abs() < 1e-9);
}
