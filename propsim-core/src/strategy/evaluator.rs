//! Signal Evaluator: ordered strategy cascade plus stop/target distances.

use std::fmt;

use crate::domain::Signal;
use crate::engine::SimConfig;

use super::{EntryFilters, EntryStrategy, MeanReversion, Momentum, Pullback, SignalContext};

/// Tries each strategy in priority order; the first permitted direction wins.
///
/// A strategy whose pattern fires in a direction the filters block does not
/// end the cascade: the next strategy is tried on the same bar.
pub struct SignalEvaluator {
    strategies: Vec<Box<dyn EntryStrategy>>,
    filters: EntryFilters,
    min_atr_floor: f64,
    stop_atr_multiplier: f64,
    target_atr_multiplier: f64,
}

impl SignalEvaluator {
    pub fn new(
        strategies: Vec<Box<dyn EntryStrategy>>,
        filters: EntryFilters,
        min_atr_floor: f64,
        stop_atr_multiplier: f64,
        target_atr_multiplier: f64,
    ) -> Self {
        Self {
            strategies,
            filters,
            min_atr_floor,
            stop_atr_multiplier,
            target_atr_multiplier,
        }
    }

    /// Momentum, then mean reversion and pullback when enabled.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut strategies: Vec<Box<dyn EntryStrategy>> =
            vec![Box::new(Momentum::new(config.min_atr_floor))];
        if config.enable_mean_reversion {
            strategies.push(Box::new(MeanReversion));
        }
        if config.enable_pullback {
            strategies.push(Box::new(Pullback));
        }

        let filters = EntryFilters {
            htf_filter: config.enable_htf_filter,
            adx_filter: config.enable_adx_filter,
            rsi_extremes: config.rsi_extremes,
            adx_threshold: config.adx_trend_threshold,
        };

        Self::new(
            strategies,
            filters,
            config.min_atr_floor,
            config.stop_atr_multiplier,
            config.target_atr_multiplier,
        )
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// ATR used for distances, floored at the configured minimum.
    pub fn trade_atr(&self, atr: f64) -> f64 {
        if atr > self.min_atr_floor {
            atr
        } else {
            self.min_atr_floor
        }
    }

    pub fn evaluate(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        let gates = self.filters.gates(ctx);

        let (strategy, direction) = self.strategies.iter().find_map(|strategy| {
            if strategy.trend_following() && !gates.trend_ok {
                return None;
            }
            strategy
                .evaluate(ctx)
                .filter(|d| gates.allows(*d))
                .map(|d| (strategy.kind(), d))
        })?;

        let atr = self.trade_atr(ctx.ind.atr);
        Some(Signal {
            direction,
            strategy,
            stop_distance: atr * self.stop_atr_multiplier,
            target_distance: atr * self.target_atr_multiplier,
        })
    }
}

impl fmt::Debug for SignalEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEvaluator")
            .field("strategies", &self.strategy_names())
            .field("filters", &self.filters)
            .field("min_atr_floor", &self.min_atr_floor)
            .field("stop_atr_multiplier", &self.stop_atr_multiplier)
            .field("target_atr_multiplier", &self.target_atr_multiplier)
            .finish()
    }
}
