//! TradeRecord: a completed round-trip trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{Direction, StrategyKind};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
        }
    }
}

/// A complete round-trip trade record: entry → exit.
///
/// Created once when the position closes and never mutated afterwards.
/// `pnl` is already reflected in `balance_after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    pub direction: Direction,
    pub strategy: StrategyKind,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    /// Stop distance fixed at entry, in price units.
    #[serde(default)]
    pub stop_distance: f64,
    /// Position size in units (currency per point of price move).
    pub size: f64,
    /// `size` expressed in standard lots.
    pub lots: f64,

    // ── PnL ──
    pub pnl: f64,
    pub balance_after: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Whether the exit carried any size. Exits booked while the throttle
    /// was fully closed have zero size and stay out of trade statistics.
    pub fn is_sized(&self) -> bool {
        self.size > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}
