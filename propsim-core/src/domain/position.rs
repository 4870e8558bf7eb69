//! The single open position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{Direction, StrategyKind};

/// Open-trade state. At most one exists at any bar; "flat" is the absence of
/// a `Position` (`Option<Position>::None` in the loop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub strategy: StrategyKind,
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    /// Fill price including spread and any entry slippage.
    pub entry_price: f64,
    pub stop_distance: f64,
    pub target_distance: f64,
}

impl Position {
    /// Absolute stop-loss price.
    pub fn stop_price(&self) -> f64 {
        self.entry_price - self.direction.sign() * self.stop_distance
    }

    /// Absolute take-profit price.
    pub fn target_price(&self) -> f64 {
        self.entry_price + self.direction.sign() * self.target_distance
    }

    /// Signed price move from entry to `exit_price` in the position's favour.
    pub fn favourable_move(&self, exit_price: f64) -> f64 {
        self.direction.sign() * (exit_price - self.entry_price)
    }
}
