//! PropSim CLI: single backtests and Monte Carlo batches.
//!
//! Commands:
//! - `run`: one deterministic pass over the bars, with a full artifact set
//! - `monte-carlo`: N noisy passes over the same bars, with a distribution report
//!
//! Both read an optional TOML config; flags override the matching fields.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use propsim_runner::reporting::{save_artifacts, save_mc_artifacts};
use propsim_runner::{
    run_monte_carlo_backtest, run_single_backtest, BacktestConfig, BacktestResult,
    MonteCarloResult,
};

#[derive(Parser)]
#[command(
    name = "propsim",
    about = "PropSim CLI: intraday prop-firm strategy backtester"
)]
struct Cli {
    /// Log at debug level (every position open and close).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one deterministic backtest.
    Run {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run the Monte Carlo driver.
    MonteCarlo {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of runs (overrides the config).
        #[arg(long)]
        runs: Option<usize>,

        /// Master seed (overrides the config).
        #[arg(long)]
        seed: Option<u64>,

        /// Run sequentially instead of on the rayon pool.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV file of bars (overrides `[data] path`).
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Ignore any configured data file and use synthetic bars.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Output directory for artifacts (overrides `[report] output_dir`).
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl CommonArgs {
    fn load_config(&self) -> Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => BacktestConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => BacktestConfig::default(),
        };
        if let Some(data) = &self.data {
            config.data.path = Some(data.clone());
        }
        if self.synthetic {
            config.data.path = None;
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { common } => run_backtest_cmd(&common),
        Commands::MonteCarlo {
            common,
            runs,
            seed,
            sequential,
        } => run_monte_carlo_cmd(&common, runs, seed, sequential),
    }
}

fn run_backtest_cmd(common: &CommonArgs) -> Result<()> {
    let config = common.load_config()?;
    let result = run_single_backtest(&config).context("backtest failed")?;

    print_summary(&result);

    let run_dir = save_artifacts(&result, &config.report.output_dir)?;
    info!(dir = %run_dir.display(), "artifacts saved");
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_monte_carlo_cmd(
    common: &CommonArgs,
    runs: Option<usize>,
    seed: Option<u64>,
    sequential: bool,
) -> Result<()> {
    let mut config = common.load_config()?;
    if let Some(runs) = runs {
        config.monte_carlo.runs = runs;
    }
    if let Some(seed) = seed {
        config.monte_carlo.seed = seed;
    }
    if sequential {
        config.monte_carlo.parallel = false;
    }

    let result = run_monte_carlo_backtest(&config).context("monte carlo failed")?;

    print_mc_summary(&result);

    let run_dir = save_mc_artifacts(&result, &config.report.output_dir)?;
    info!(dir = %run_dir.display(), "artifacts saved");
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    if let (Some(start), Some(end)) = (result.start_time, result.end_time) {
        println!(
            "Period:         {} to {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        );
    }
    match result.start_index {
        Some(start) => println!("Bars:           {} ({} warmup)", result.bar_count, start),
        None => println!("Bars:           {} (too few to simulate)", result.bar_count),
    }
    println!("Trades:         {}", m.trade_count);
    println!("Halted Bars:    {}", result.halted_bars);
    println!();
    println!("--- Performance ---");
    println!("Final Balance:  ${:.2}", m.final_balance);
    println!("Total Return:   {:.2}%", m.total_return_pct);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown_pct);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", m.profit_factor);
    println!("Avg Lots:       {:.2}", m.avg_lots);

    if !result.monthly.is_empty() {
        println!();
        println!("--- Monthly ---");
        for row in &result.monthly {
            println!(
                "{}  {:>+10.2}  {:>+6.2}%  dd {:>5.2}%  {:>3} trades",
                row.month, row.net_profit, row.return_pct, row.max_drawdown_pct, row.trades
            );
        }
    }
    if result.open_position.is_some() {
        println!();
        println!("NOTE: a position was still open at the last bar");
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
}

fn print_mc_summary(result: &MonteCarloResult) {
    let s = &result.report.summary;
    println!();
    println!("=== Monte Carlo Result ===");
    println!("Runs:           {}", s.run_count);
    println!("Master Seed:    {}", result.report.master_seed);
    println!();
    println!("--- Total Return ---");
    println!("Median:         {:.2}%", s.median_return_pct);
    println!("Mean:           {:.2}%", s.mean_return_pct);
    println!("Min:            {:.2}%", s.min_return_pct);
    println!("P10 / P90:      {:.2}% / {:.2}%", s.p10_return_pct, s.p90_return_pct);
    println!("Max:            {:.2}%", s.max_return_pct);
    println!(
        "Positive Runs:  {} of {} ({:.1}%)",
        s.positive_runs, s.run_count, s.survival_rate
    );
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
}
