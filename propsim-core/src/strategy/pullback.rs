//! Trend pullback: a dip to the fast EMA that closes back with the trend.
//!
//! Trend is `ema_fast` vs `ema_slow`. In an uptrend, long when
//! `prev.low <= ema_fast` and `prev.close > ema_fast`. In a downtrend, short
//! when `prev.high >= ema_fast` and `prev.close < ema_fast`. Equal EMAs mean
//! no trend and no signal.

use crate::domain::{Direction, StrategyKind};

use super::{EntryStrategy, SignalContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct Pullback;

impl EntryStrategy for Pullback {
    fn name(&self) -> &str {
        "pullback"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Pullback
    }

    fn trend_following(&self) -> bool {
        true
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Option<Direction> {
        let (fast, slow) = (ctx.ind.ema_fast, ctx.ind.ema_slow);
        let prev = ctx.prev;
        if fast > slow {
            (prev.low <= fast && prev.close > fast).then_some(Direction::Long)
        } else if fast < slow {
            (prev.high >= fast && prev.close < fast).then_some(Direction::Short)
        } else {
            None
        }
    }
}
