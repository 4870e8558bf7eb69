//! Mean reversion: fade closes outside the Bollinger bands.
//!
//! Short when `prev.close > upper_band`, long when `prev.close < lower_band`.
//! Not gated by the volatility floor or the ADX gate.

use crate::domain::{Direction, StrategyKind};

use super::{EntryStrategy, SignalContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl EntryStrategy for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn trend_following(&self) -> bool {
        false
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Option<Direction> {
        let close = ctx.prev.close;
        if close > ctx.ind.upper_band {
            Some(Direction::Short)
        } else if close < ctx.ind.lower_band {
            Some(Direction::Long)
        } else {
            None
        }
    }
}
