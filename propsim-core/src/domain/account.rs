//! Account: realized balance, high-water-mark and the equity curve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One equity-curve snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
}

/// Realized-equity account.
///
/// The open position is never marked to market: `balance` only changes when
/// a trade closes. The high-water-mark is non-decreasing for the life of the
/// account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    balance: f64,
    high_water_mark: f64,
    equity_curve: Vec<EquityPoint>,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            high_water_mark: initial_balance,
            equity_curve: Vec::new(),
        }
    }

    pub fn with_capacity(initial_balance: f64, bars: usize) -> Self {
        Self {
            equity_curve: Vec::with_capacity(bars),
            ..Self::new(initial_balance)
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn high_water_mark(&self) -> f64 {
        self.high_water_mark
    }

    /// Raise the high-water-mark to the current balance if it is higher.
    pub fn mark_high_water(&mut self) {
        if self.balance > self.high_water_mark {
            self.high_water_mark = self.balance;
        }
    }

    /// Current drawdown from the high-water-mark, in percent (0.0 at the peak).
    pub fn drawdown_pct(&self) -> f64 {
        if self.high_water_mark <= 0.0 {
            return 0.0;
        }
        ((self.high_water_mark - self.balance) / self.high_water_mark * 100.0).max(0.0)
    }

    /// Book a realized PnL and return the new balance.
    pub fn apply_pnl(&mut self, pnl: f64) -> f64 {
        self.balance += pnl;
        self.balance
    }

    /// Append a (timestamp, balance) snapshot.
    pub fn snapshot(&mut self, timestamp: DateTime<Utc>) {
        self.equity_curve.push(EquityPoint {
            timestamp,
            balance: self.balance,
        });
    }

    pub fn into_equity_curve(self) -> Vec<EquityPoint> {
        self.equity_curve
    }
}
