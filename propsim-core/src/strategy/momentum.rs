//! Momentum breakout: an up bar closing above the high two bars back.
//!
//! Long when `prev.close > prev2.high` and `prev.close > prev.open`.
//! Short when `prev.close < prev2.low` and `prev.close < prev.open`.
//!
//! Skipped entirely while `atr < min_atr`: quiet markets make breakouts
//! unreliable, and the cascade falls through to the next strategy.

use crate::domain::{Direction, StrategyKind};

use super::{EntryStrategy, SignalContext};

#[derive(Debug, Clone)]
pub struct Momentum {
    /// Minimum ATR of the signal bar.
    pub min_atr: f64,
}

impl Momentum {
    pub fn new(min_atr: f64) -> Self {
        Self { min_atr }
    }
}

impl EntryStrategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn trend_following(&self) -> bool {
        true
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Option<Direction> {
        if !(ctx.ind.atr >= self.min_atr) {
            return None;
        }
        let prev = ctx.prev;
        if prev.close > ctx.prev2.high && prev.is_bullish() {
            Some(Direction::Long)
        } else if prev.close < ctx.prev2.low && prev.is_bearish() {
            Some(Direction::Short)
        } else {
            None
        }
    }
}
