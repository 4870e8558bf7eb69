//! Entry strategies: the Signal Evaluator's ordered cascade.
//!
//! Each strategy looks only at fully closed information: the bar before the
//! current one (`prev`), the bar before that (`prev2`), and the indicator row
//! of `prev`. Strategies never see account or position state.
//!
//! The [`SignalEvaluator`] tries strategies in priority order and the first
//! permitted direction wins.

pub mod evaluator;
pub mod filters;
pub mod mean_reversion;
pub mod momentum;
pub mod pullback;

pub use evaluator::SignalEvaluator;
pub use filters::{EntryFilters, EntryGates, RsiExtremes};
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use pullback::Pullback;

use crate::domain::{Bar, Direction, StrategyKind};
use crate::indicators::IndicatorRow;

/// Closed-bar inputs for one entry decision.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    /// The bar immediately before the bar being traded.
    pub prev: &'a Bar,
    /// The bar two bars back.
    pub prev2: &'a Bar,
    /// Indicators as of `prev`.
    pub ind: &'a IndicatorRow,
}

/// One entry rule in the cascade.
///
/// # Architecture invariant
/// `evaluate` reports the raw pattern only. Direction permissions (trend
/// filter, ADX gate) are applied by the evaluator, so a strategy that returns
/// a blocked direction does not stop the cascade.
pub trait EntryStrategy: Send + Sync {
    /// Human-readable name (e.g., "momentum").
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// Whether the trend-strength (ADX) gate applies to this strategy.
    fn trend_following(&self) -> bool;

    /// Direction suggested by the pattern, if any.
    fn evaluate(&self, ctx: &SignalContext<'_>) -> Option<Direction>;
}

/// Neutral indicator row for strategy tests.
#[cfg(test)]
pub(crate) fn make_row() -> IndicatorRow {
    IndicatorRow {
        atr: 1.0,
        sma: 2000.0,
        std_dev: 2.0,
        upper_band: 2005.0,
        lower_band: 1995.0,
        ema_fast: 2000.0,
        ema_slow: 1999.0,
        ema_trend: 1990.0,
        rsi: 50.0,
        adx: 30.0,
    }
}

#[cfg(test)]
pub(crate) fn make_bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
    use chrono::{TimeZone, Utc};
    Bar::new(
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        open,
        high,
        low,
        close,
    )
}
