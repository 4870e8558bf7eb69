//! Position Manager exit check.
//!
//! The bar's range is compared with the absolute stop and target prices.
//! Without intrabar path information a bar spanning both is resolved to the
//! stop.

use crate::domain::{Bar, Direction, ExitReason, Position};

/// Where and why a position leaves the market on a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFill {
    pub price: f64,
    pub reason: ExitReason,
}

/// Check `bar` against the position's stop and target. Stop first.
pub fn check_exit(position: &Position, bar: &Bar) -> Option<ExitFill> {
    let stop = position.stop_price();
    let target = position.target_price();

    let (stop_hit, target_hit) = match position.direction {
        Direction::Long => (bar.low <= stop, bar.high >= target),
        Direction::Short => (bar.high >= stop, bar.low <= target),
    };

    if stop_hit {
        Some(ExitFill {
            price: stop,
            reason: ExitReason::StopLoss,
        })
    } else if target_hit {
        Some(ExitFill {
            price: target,
            reason: ExitReason::TakeProfit,
        })
    } else {
        None
    }
}
