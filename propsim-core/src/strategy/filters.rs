//! Cross-cutting entry filters.
//!
//! - Higher-timeframe trend: longs need `prev.close > ema_trend`, shorts need
//!   `prev.close < ema_trend`. An RSI extreme on the matching side bypasses it
//!   (oversold longs, overbought shorts).
//! - Trend strength: trend-following strategies need `adx >= threshold`
//!   unless RSI is extreme on either side.
//!
//! Undefined inputs (NaN) fail the comparisons and therefore block entries.

use serde::{Deserialize, Serialize};

use super::SignalContext;
use crate::domain::Direction;

/// RSI zone boundaries; below `low` is oversold, above `high` overbought.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiExtremes {
    pub low: f64,
    pub high: f64,
}

impl Default for RsiExtremes {
    fn default() -> Self {
        Self {
            low: 25.0,
            high: 75.0,
        }
    }
}

impl RsiExtremes {
    pub fn is_oversold(&self, rsi: f64) -> bool {
        rsi < self.low
    }

    pub fn is_overbought(&self, rsi: f64) -> bool {
        rsi > self.high
    }

    pub fn is_extreme(&self, rsi: f64) -> bool {
        self.is_oversold(rsi) || self.is_overbought(rsi)
    }
}

/// Per-bar permissions derived from the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryGates {
    pub can_long: bool,
    pub can_short: bool,
    /// Trend-strength gate for trend-following strategies.
    pub trend_ok: bool,
}

impl EntryGates {
    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Long => self.can_long,
            Direction::Short => self.can_short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryFilters {
    pub htf_filter: bool,
    pub adx_filter: bool,
    pub rsi_extremes: RsiExtremes,
    pub adx_threshold: f64,
}

impl EntryFilters {
    pub fn gates(&self, ctx: &SignalContext<'_>) -> EntryGates {
        let close = ctx.prev.close;
        let ind = ctx.ind;
        let extremes = &self.rsi_extremes;

        let (can_long, can_short) = if self.htf_filter {
            (
                extremes.is_oversold(ind.rsi) || close > ind.ema_trend,
                extremes.is_overbought(ind.rsi) || close < ind.ema_trend,
            )
        } else {
            (true, true)
        };

        let trend_ok =
            !self.adx_filter || extremes.is_extreme(ind.rsi) || ind.adx >= self.adx_threshold;

        EntryGates {
            can_long,
            can_short,
            trend_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorRow;
    use crate::strategy::{make_bar, make_row};

    fn filters() -> EntryFilters {
        EntryFilters {
            htf_filter: true,
            adx_filter: true,
            rsi_extremes: RsiExtremes::default(),
            adx_threshold: 20.0,
        }
    }

    fn gates_for(close: f64, row: IndicatorRow, f: EntryFilters) -> EntryGates {
        let prev = make_bar(close, close + 1.0, close - 1.0, close);
        let prev2 = prev.clone();
        f.gates(&SignalContext { prev: &prev, prev2: &prev2, ind: &row })
    }

    #[test]
    fn htf_allows_only_with_trend() {
        // ema_trend = 1990
        let above = gates_for(2000.0, make_row(), filters());
        assert!(above.can_long && !above.can_short);

        let below = gates_for(1980.0, make_row(), filters());
        assert!(!below.can_long && below.can_short);
    }

    #[test]
    fn oversold_rsi_bypasses_htf_for_longs() {
        let row = IndicatorRow { rsi: 20.0, ..make_row() };
        let g = gates_for(1980.0, row, filters());
        assert!(g.can_long);
        assert!(g.can_short);
    }

    #[test]
    fn overbought_rsi_bypasses_htf_for_shorts() {
        let row = IndicatorRow { rsi: 80.0, ..make_row() };
        let g = gates_for(2000.0, row, filters());
        assert!(g.can_short);
        assert!(g.can_long);
    }

    #[test]
    fn htf_disabled_allows_both() {
        let f = EntryFilters { htf_filter: false, ..filters() };
        let g = gates_for(1980.0, make_row(), f);
        assert!(g.can_long && g.can_short);
    }

    #[test]
    fn weak_adx_fails_trend_gate() {
        let row = IndicatorRow { adx: 15.0, ..make_row() };
        assert!(!gates_for(2000.0, row, filters()).trend_ok);

        let at_threshold = IndicatorRow { adx: 20.0, ..make_row() };
        assert!(gates_for(2000.0, at_threshold, filters()).trend_ok);
    }

    #[test]
    fn rsi_extreme_bypasses_adx() {
        let row = IndicatorRow { adx: 10.0, rsi: 80.0, ..make_row() };
        assert!(gates_for(2000.0, row, filters()).trend_ok);
    }

    #[test]
    fn adx_disabled_always_ok() {
        let f = EntryFilters { adx_filter: false, ..filters() };
        let row = IndicatorRow { adx: 5.0, ..make_row() };
        assert!(gates_for(2000.0, row, f).trend_ok);
    }

    #[test]
    fn allows_matches_direction() {
        let g = EntryGates { can_long: true, can_short: false, trend_ok: true };
        assert!(g.allows(Direction::Long));
        assert!(!g.allows(Direction::Short));
    }
}
