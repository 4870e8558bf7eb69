//! Month-by-month breakdown of a run.
//!
//! Trades are bucketed by the calendar month (UTC) of their exit. Each month's
//! return is measured against the balance at the start of that month, and its
//! drawdown against the peak of the equity snapshots inside it. Zero-size
//! exits carry no PnL and are not counted as trades.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use propsim_core::domain::{EquityPoint, TradeRecord};

use crate::metrics::sized_trades;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    /// `YYYY-MM`.
    pub month: String,
    pub net_profit: f64,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent of trades that won.
    pub win_rate: f64,
    pub return_pct: f64,
    pub max_drawdown_pct: f64,
    pub avg_lots: f64,
}

type MonthKey = (i32, u32);

fn month_key(timestamp: DateTime<Utc>) -> MonthKey {
    (timestamp.year(), timestamp.month())
}

/// One row per month that closed at least one sized trade, in chronological order.
pub fn monthly_breakdown(
    trades: &[TradeRecord],
    equity_curve: &[EquityPoint],
    initial_balance: f64,
) -> Vec<MonthlyRow> {
    let mut by_month: BTreeMap<MonthKey, Vec<&TradeRecord>> = BTreeMap::new();
    for trade in sized_trades(trades) {
        by_month.entry(month_key(trade.exit_time)).or_default().push(trade);
    }

    let mut snapshots: BTreeMap<MonthKey, Vec<f64>> = BTreeMap::new();
    for point in equity_curve {
        snapshots
            .entry(month_key(point.timestamp))
            .or_default()
            .push(point.balance);
    }

    let mut running_balance = initial_balance;
    let mut rows = Vec::with_capacity(by_month.len());

    for ((year, month), month_trades) in by_month {
        let net_profit: f64 = month_trades.iter().map(|t| t.pnl).sum();
        let wins = month_trades.iter().filter(|t| t.is_winner()).count();
        let count = month_trades.len();

        let return_pct = if running_balance > 0.0 {
            net_profit / running_balance * 100.0
        } else {
            0.0
        };

        let mut peak = running_balance;
        let mut max_drawdown_pct = 0.0_f64;
        for &balance in snapshots.get(&(year, month)).map(Vec::as_slice).unwrap_or(&[]) {
            peak = peak.max(balance);
            if peak > 0.0 {
                max_drawdown_pct = max_drawdown_pct.max((peak - balance) / peak * 100.0);
            }
        }

        rows.push(MonthlyRow {
            month: format!("{year:04}-{month:02}"),
            net_profit,
            trades: count,
            wins,
            losses: count - wins,
            win_rate: wins as f64 / count as f64 * 100.0,
            return_pct,
            max_drawdown_pct,
            avg_lots: month_trades.iter().map(|t| t.lots).sum::<f64>() / count as f64,
        });

        running_balance += net_profit;
    }

    rows
}
