//! Risk sizer: converts an account-risk fraction and a stop distance into a
//! trade size.
//!
//! # Formula
//! ```text
//! risk_amount = balance * risk_percent * risk_modifier
//! size        = risk_amount / stop_distance      (units per point of price)
//! lots        = size / contract_size
//! ```
//!
//! # Example
//! - Balance: 100,000
//! - risk_percent: 0.0075 (0.75%) → 750 at full risk
//! - Stop distance: 1.5 (1.5 x ATR of 1.0)
//! - Size: 750 / 1.5 = 500 units = 5 lots at 100 units per lot

use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSizer {
    /// Fraction of balance risked per trade at full modifier.
    risk_percent: f64,
}

impl RiskSizer {
    pub fn new(risk_percent: f64) -> Self {
        Self { risk_percent }
    }

    /// Currency amount at risk for the current balance and modifier.
    pub fn risk_amount(&self, balance: f64, risk_modifier: f64) -> f64 {
        balance * self.risk_percent * risk_modifier
    }

    /// Trade size in units, or `None` when no trade should be sized.
    ///
    /// Short-circuits on a non-positive stop distance, a zero (or negative)
    /// modifier, or a non-positive balance instead of dividing by zero.
    pub fn size(&self, balance: f64, stop_distance: f64, risk_modifier: f64) -> Option<f64> {
        if !(stop_distance > 0.0) || !(risk_modifier > 0.0) || !(balance > 0.0) {
            return None;
        }
        let size = self.risk_amount(balance, risk_modifier) / stop_distance;
        (size.is_finite() && size > 0.0).then_some(size)
    }

    /// Convert units into standard lots.
    pub fn lots(units: f64, contract_size: f64) -> f64 {
        if contract_size <= 0.0 {
            return 0.0;
        }
        units / contract_size
    }
}

/// Broker-style point valuation for lot sizing by stop distance in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointValue {
    pub tick_value: f64,
    pub tick_size: f64,
    pub point: f64,
}

impl Default for PointValue {
    fn default() -> Self {
        Self {
            tick_value: 1.0,
            tick_size: 0.01,
            point: 0.01,
        }
    }
}

impl PointValue {
    /// Currency value of a one-point move for one lot.
    pub fn value_per_point(&self) -> f64 {
        if self.tick_size == 0.0 {
            return 0.0;
        }
        self.tick_value * (self.point / self.tick_size)
    }

    /// Lots risking `risk_pct` percent of `equity` over `sl_points`, rounded
    /// to two decimals. Zero when the stop or point value is zero.
    pub fn lot_size(&self, equity: f64, risk_pct: f64, sl_points: f64) -> f64 {
        let value_per_point = self.value_per_point();
        if value_per_point == 0.0 || sl_points == 0.0 {
            return 0.0;
        }
        let risk_amount = equity * (risk_pct / 100.0);
        let lots = risk_amount / (sl_points * value_per_point);
        (lots * 100.0).round() / 100.0
    }

    /// Broker lots risking the same amount over the same stop as `trade`.
    pub fn trade_lots(&self, trade: &TradeRecord) -> f64 {
        let balance_before = trade.balance_after - trade.pnl;
        if !(balance_before > 0.0) || !(self.point > 0.0) {
            return 0.0;
        }
        let risk_pct = trade.size * trade.stop_distance / balance_before * 100.0;
        self.lot_size(balance_before, risk_pct, trade.stop_distance / self.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, ExitReason, StrategyKind};
    use chrono::{TimeZone, Utc};

    #[test]
    fn size_formula() {
        let sizer = RiskSizer::new(0.5);
        assert_eq!(sizer.size(100_000.0, 200.0, 1.0), Some(250.0));
        assert_eq!(sizer.size(100_000.0, 200.0, 0.5), Some(125.0));
    }

    #[test]
    fn default_risk_example() {
        let sizer = RiskSizer::new(0.0075);
        let size = sizer.size(100_000.0, 1.5, 1.0).unwrap();
        assert!((size - 500.0).abs() < 1e-9);
        assert!((RiskSizer::lots(size, 100.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_stop_is_no_trade() {
        let sizer = RiskSizer::new(0.0075);
        assert_eq!(sizer.size(100_000.0, 0.0, 1.0), None);
        assert_eq!(sizer.size(100_000.0, f64::NAN, 1.0), None);
    }

    #[test]
    fn zero_modifier_is_no_trade() {
        let sizer = RiskSizer::new(0.0075);
        assert_eq!(sizer.size(100_000.0, 1.5, 0.0), None);
    }

    #[test]
    fn broke_account_is_no_trade() {
        let sizer = RiskSizer::new(0.0075);
        assert_eq!(sizer.size(0.0, 1.5, 1.0), None);
    }

    #[test]
    fn lots_guard_contract_size() {
        assert_eq!(RiskSizer::lots(500.0, 0.0), 0.0);
    }

    #[test]
    fn point_value_lot_sizing() {
        let pv = PointValue::default();
        assert!((pv.lot_size(100_000.0, 0.5, 200.0) - 2.5).abs() < 1e-12);
        assert!((pv.lot_size(50_000.0, 0.5, 200.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn point_value_zero_stop() {
        assert_eq!(PointValue::default().lot_size(100_000.0, 0.5, 0.0), 0.0);
    }

    fn trade(size: f64, pnl: f64) -> TradeRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        TradeRecord {
            direction: Direction::Long,
            strategy: StrategyKind::Momentum,
            entry_bar: 10,
            entry_time: at,
            entry_price: 2000.0,
            exit_bar: 12,
            exit_time: at,
            exit_price: 2001.5,
            exit_reason: ExitReason::TakeProfit,
            stop_distance: 1.5,
            size,
            lots: size / 100.0,
            pnl,
            balance_after: 100_000.0 + pnl,
        }
    }

    #[test]
    fn trade_lots_match_unit_lots_at_default_valuation() {
        // 750 at risk over 150 points worth 1.0 each.
        let pv = PointValue::default();
        assert!((pv.trade_lots(&trade(500.0, 750.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn trade_lots_scale_with_point_value() {
        let pv = PointValue {
            tick_value: 2.0,
            ..PointValue::default()
        };
        assert!((pv.trade_lots(&trade(500.0, 750.0)) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn zero_size_trade_has_no_broker_lots() {
        assert_eq!(PointValue::default().trade_lots(&trade(0.0, 0.0)), 0.0);
    }
}
