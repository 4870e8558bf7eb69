//! Performance metrics: pure functions over a finished simulation.
//!
//! Balances go in, scalars come out. Percentages are expressed in percent
//! (`2.5` = 2.5%), matching the drawdown figures the engine works in.
//!
//! Trade statistics only count sized trades: an exit booked while the
//! throttle was fully closed carries no size and no PnL, and is left out.

use serde::{Deserialize, Serialize};

use propsim_core::domain::TradeRecord;
use propsim_core::engine::SimOutcome;

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_lots: f64,
    pub trade_count: usize,
    pub final_balance: f64,
}

impl PerformanceMetrics {
    /// `periods_per_year` annualizes the per-bar Sharpe ratio.
    pub fn compute(outcome: &SimOutcome, periods_per_year: f64) -> Self {
        let balances = balance_series(outcome);
        Self {
            total_return_pct: outcome.total_return_pct(),
            max_drawdown_pct: max_drawdown_pct(&balances),
            sharpe: sharpe_ratio(&balances, periods_per_year),
            win_rate: win_rate(&outcome.trades),
            profit_factor: profit_factor(&outcome.trades),
            avg_win: avg_win(&outcome.trades),
            avg_loss: avg_loss(&outcome.trades),
            avg_lots: avg_lots(&outcome.trades),
            trade_count: trade_count(&outcome.trades),
            final_balance: outcome.final_balance,
        }
    }
}

/// Initial balance followed by every equity snapshot.
pub fn balance_series(outcome: &SimOutcome) -> Vec<f64> {
    std::iter::once(outcome.initial_balance)
        .chain(outcome.equity_curve.iter().map(|p| p.balance))
        .collect()
}

// ─── Individual metric functions ────────────────────────────────────

/// Deepest peak-to-trough decline, in percent (positive number).
pub fn max_drawdown_pct(balances: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &balance in balances {
        peak = peak.max(balance);
        if peak > 0.0 {
            worst = worst.max((peak - balance) / peak * 100.0);
        }
    }
    worst
}

/// Annualized Sharpe ratio from per-bar returns (zero risk-free rate).
///
/// Returns 0.0 with fewer than two returns or zero variance.
pub fn sharpe_ratio(balances: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(balances);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean / std * periods_per_year.max(0.0).sqrt()
}

/// Trades that carried size.
pub fn sized_trades(trades: &[TradeRecord]) -> impl Iterator<Item = &TradeRecord> {
    trades.iter().filter(|t| t.is_sized())
}

pub fn trade_count(trades: &[TradeRecord]) -> usize {
    sized_trades(trades).count()
}

/// Fraction of sized trades with positive PnL.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    let count = trade_count(trades);
    if count == 0 {
        return 0.0;
    }
    let winners = sized_trades(trades).filter(|t| t.is_winner()).count();
    winners as f64 / count as f64
}

/// Gross profit / gross loss, capped at 100.0 when there are no losses.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trade_count(trades) == 0 {
        return 0.0;
    }
    let gross_profit: f64 = sized_trades(trades).filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = sized_trades(trades)
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Mean PnL of winning trades.
pub fn avg_win(trades: &[TradeRecord]) -> f64 {
    let wins: Vec<f64> = sized_trades(trades).filter(|t| t.pnl > 0.0).map(|t| t.pnl).collect();
    mean_f64(&wins)
}

/// Mean PnL of losing trades (negative number).
pub fn avg_loss(trades: &[TradeRecord]) -> f64 {
    let losses: Vec<f64> = sized_trades(trades).filter(|t| t.pnl < 0.0).map(|t| t.pnl).collect();
    mean_f64(&losses)
}

pub fn avg_lots(trades: &[TradeRecord]) -> f64 {
    let lots: Vec<f64> = sized_trades(trades).map(|t| t.lots).collect();
    mean_f64(&lots)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive balances.
pub fn period_returns(balances: &[f64]) -> Vec<f64> {
    balances
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
