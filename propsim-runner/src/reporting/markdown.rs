//! Markdown reports for single runs and Monte Carlo batches.

use crate::metrics::sized_trades;
use crate::runner::{BacktestResult, MonteCarloResult};

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# Backtest Report\n\n");
    md.push_str(&format!("Run ID: `{}`\n\n", result.run_id));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    if let (Some(start), Some(end)) = (result.start_time, result.end_time) {
        md.push_str(&format!(
            "| Period | {} to {} |\n",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        ));
    }
    md.push_str(&format!(
        "| Initial Balance | ${:.2} |\n",
        result.initial_balance
    ));
    match result.start_index {
        Some(start) => md.push_str(&format!(
            "| Bars | {} ({} warmup) |\n",
            result.bar_count, start
        )),
        None => md.push_str(&format!(
            "| Bars | {} (too few to simulate) |\n",
            result.bar_count
        )),
    }
    md.push_str(&format!("| Halted Bars | {} |\n", result.halted_bars));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let m = &result.metrics;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Final Balance | ${:.2} |\n", m.final_balance));
    md.push_str(&format!("| Total Return | {:+.2}% |\n", m.total_return_pct));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", m.max_drawdown_pct));
    md.push_str(&format!("| Sharpe | {:.3} |\n", m.sharpe));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", m.win_rate * 100.0));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", m.profit_factor));
    md.push_str(&format!("| Avg Win | ${:.2} |\n", m.avg_win));
    md.push_str(&format!("| Avg Loss | ${:.2} |\n", m.avg_loss));
    md.push_str(&format!("| Avg Lots | {:.2} |\n", m.avg_lots));
    md.push_str(&format!("| Trades | {} |\n", m.trade_count));
    md.push('\n');

    if !result.monthly.is_empty() {
        md.push_str("## Monthly Breakdown\n\n");
        md.push_str("| Month | Net Profit | Return | Max DD | Trades | Wins | Losses | Win Rate | Avg Lots |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for row in &result.monthly {
            md.push_str(&format!(
                "| {} | ${:+.2} | {:+.2}% | {:.2}% | {} | {} | {} | {:.1}% | {:.2} |\n",
                row.month,
                row.net_profit,
                row.return_pct,
                row.max_drawdown_pct,
                row.trades,
                row.wins,
                row.losses,
                row.win_rate,
                row.avg_lots
            ));
        }
        md.push('\n');
    }

    let mut sorted: Vec<_> = sized_trades(&result.trades).collect();
    if !sorted.is_empty() {
        sorted.sort_by(|a, b| b.pnl.partial_cmp(&a.pnl).unwrap_or(std::cmp::Ordering::Equal));

        md.push_str("## Trade Tape\n\n");
        md.push_str("### Top Winners\n\n");
        md.push_str("| Direction | Strategy | Entry | Exit | Lots | PnL |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for t in sorted.iter().take(5).filter(|t| t.pnl > 0.0) {
            md.push_str(&trade_row(t));
        }

        md.push_str("\n### Top Losers\n\n");
        md.push_str("| Direction | Strategy | Entry | Exit | Lots | PnL |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for t in sorted.iter().rev().take(5).filter(|t| t.pnl <= 0.0) {
            md.push_str(&trade_row(t));
        }
        md.push('\n');
    }

    if let Some(ref position) = result.open_position {
        md.push_str("## Open Position\n\n");
        md.push_str(&format!(
            "{} ({}) from {:.2} at {}, stop {:.2}, target {:.2}. Not included in the figures above.\n",
            position.direction,
            position.strategy,
            position.entry_price,
            position.entry_time.format("%Y-%m-%d %H:%M"),
            position.stop_price(),
            position.target_price()
        ));
    }

    md
}

fn trade_row(t: &propsim_core::domain::TradeRecord) -> String {
    format!(
        "| {} | {} | {:.2} @ {} | {:.2} @ {} | {:.2} | ${:+.2} |\n",
        t.direction,
        t.strategy,
        t.entry_price,
        t.entry_time.format("%Y-%m-%d %H:%M"),
        t.exit_price,
        t.exit_time.format("%Y-%m-%d %H:%M"),
        t.lots,
        t.pnl
    )
}

/// Generate a Markdown report for a Monte Carlo batch.
pub fn generate_mc_report(result: &MonteCarloResult) -> String {
    let s = &result.report.summary;
    let mc = &result.config.monte_carlo;
    let mut md = String::with_capacity(2048);

    md.push_str("# Monte Carlo Report\n\n");
    md.push_str(&format!("Run ID: `{}`\n\n", result.run_id));

    md.push_str("## Setup\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Runs | {} |\n", s.run_count));
    md.push_str(&format!("| Master Seed | {} |\n", result.report.master_seed));
    md.push_str(&format!(
        "| Slippage Range | {:.3} to {:.3} |\n",
        mc.slippage_range.0, mc.slippage_range.1
    ));
    md.push_str(&format!(
        "| Missed Signal Probability | {:.1}% |\n",
        mc.missed_signal_probability * 100.0
    ));
    md.push_str(&format!("| Bars | {} |\n", result.bar_count));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Return Distribution\n\n");
    md.push_str("| Statistic | Return |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Median | {:+.2}% |\n", s.median_return_pct));
    md.push_str(&format!("| Mean | {:+.2}% |\n", s.mean_return_pct));
    md.push_str(&format!("| Min | {:+.2}% |\n", s.min_return_pct));
    md.push_str(&format!("| P10 | {:+.2}% |\n", s.p10_return_pct));
    md.push_str(&format!("| P90 | {:+.2}% |\n", s.p90_return_pct));
    md.push_str(&format!("| Max | {:+.2}% |\n", s.max_return_pct));
    md.push('\n');
    md.push_str(&format!(
        "Positive runs: {} of {} ({:.1}%)\n",
        s.positive_runs, s.run_count, s.survival_rate
    ));

    if let Some(worst) = result
        .report
        .runs
        .iter()
        .max_by(|a, b| {
            a.max_drawdown_pct
                .partial_cmp(&b.max_drawdown_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        md.push_str(&format!(
            "\nDeepest drawdown: {:.2}% (run {}, seed {}, slippage {:.4})\n",
            worst.max_drawdown_pct, worst.index, worst.seed, worst.slippage_bias
        ));
    }

    md
}
