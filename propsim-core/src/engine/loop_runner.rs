//! Bar-by-bar Simulation Loop.
//!
//! Per bar, in order:
//! 1. Raise the high-water-mark, derive drawdown and the risk modifier
//! 2. If a position is open, check stop/target and book the exit
//! 3. If flat and entries are allowed, evaluate the signal cascade on the
//!    previous bar and open at this bar's open
//! 4. Snapshot (timestamp, balance) into the equity curve
//!
//! A position closed in step 2 can be replaced in step 3 of the same bar.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Account, Bar, EquityPoint, ExitReason, Position, TradeRecord};
use crate::error::ConfigError;
use crate::indicators::IndicatorFrame;
use crate::risk::{DrawdownThrottle, LossGuard, RiskSizer};
use crate::strategy::{SignalContext, SignalEvaluator};

use super::config::SimConfig;
use super::exits::{check_exit, ExitFill};
use super::noise::{ExecutionNoise, NoNoise};
use super::warmup::start_index;

/// Everything one pass of the loop produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutcome {
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub initial_balance: f64,
    pub final_balance: f64,
    /// First processed bar; `None` when the input was too short to run.
    pub start_index: Option<usize>,
    pub bars_processed: usize,
    /// Bars whose signal evaluation was missed by execution noise.
    pub signals_skipped: usize,
    /// Flat bars on which entries were blocked by the throttle or loss guard.
    pub halted_bars: usize,
    /// Position still open after the last bar (unrealized, not in `trades`).
    pub open_position: Option<Position>,
}

impl SimOutcome {
    fn empty(initial_balance: f64) -> Self {
        Self {
            trades: Vec::new(),
            equity_curve: Vec::new(),
            initial_balance,
            final_balance: initial_balance,
            start_index: None,
            bars_processed: 0,
            signals_skipped: 0,
            halted_bars: 0,
            open_position: None,
        }
    }

    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    pub fn total_return_pct(&self) -> f64 {
        if self.initial_balance <= 0.0 {
            return 0.0;
        }
        (self.final_balance - self.initial_balance) / self.initial_balance * 100.0
    }

    /// Deepest peak-to-trough decline of the equity curve, in percent.
    pub fn max_drawdown_pct(&self) -> f64 {
        let mut peak = self.initial_balance;
        let mut worst = 0.0_f64;
        for point in &self.equity_curve {
            peak = peak.max(point.balance);
            if peak > 0.0 {
                worst = worst.max((peak - point.balance) / peak * 100.0);
            }
        }
        worst
    }
}

/// The Simulation Loop bound to one validated configuration.
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    evaluator: SignalEvaluator,
    throttle: DrawdownThrottle,
    sizer: RiskSizer,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            evaluator: SignalEvaluator::from_config(&config),
            throttle: DrawdownThrottle::new(config.drawdown_risk_steps.clone()),
            sizer: RiskSizer::new(config.risk_percent),
            config,
        })
    }

    pub fn evaluator(&self) -> &SignalEvaluator {
        &self.evaluator
    }

    /// Run without execution noise.
    pub fn run(&self, bars: &[Bar], frame: &IndicatorFrame) -> SimOutcome {
        self.run_with_noise(bars, frame, &mut NoNoise)
    }

    /// Run one pass over `bars`, drawing fills and missed signals from `noise`.
    pub fn run_with_noise<N: ExecutionNoise + ?Sized>(
        &self,
        bars: &[Bar],
        frame: &IndicatorFrame,
        noise: &mut N,
    ) -> SimOutcome {
        let config = &self.config;

        if bars.len() != frame.len() {
            warn!(
                bars = bars.len(),
                rows = frame.len(),
                "indicator frame not aligned with bars; nothing simulated"
            );
            return SimOutcome::empty(config.initial_balance);
        }
        let start = match start_index(frame, config.warmup_bars) {
            Some(start) if start < bars.len() => start,
            _ => {
                warn!(
                    bars = bars.len(),
                    warmup = config.warmup_bars,
                    "not enough bars to cover indicator warmup; nothing simulated"
                );
                return SimOutcome::empty(config.initial_balance);
            }
        };

        let mut account = Account::with_capacity(config.initial_balance, bars.len() - start);
        let mut guard = config
            .loss_limits
            .map(|limits| LossGuard::new(limits, config.initial_balance));
        let mut position: Option<Position> = None;
        let mut trades = Vec::new();
        let mut signals_skipped = 0;
        let mut halted_bars = 0;

        debug!(bars = bars.len(), start, "simulation started");

        for i in start..bars.len() {
            let bar = &bars[i];

            account.mark_high_water();
            let modifier = self.throttle.modifier(account.drawdown_pct());
            if let Some(guard) = guard.as_mut() {
                guard.observe(bar.timestamp, account.balance());
            }

            if let Some(open) = position.take() {
                match check_exit(&open, bar) {
                    Some(fill) => {
                        let trade = self.close(&mut account, open, fill, i, bar, modifier, noise);
                        trades.push(trade);
                    }
                    None => position = Some(open),
                }
            }

            if position.is_none() {
                let halted = modifier <= 0.0 || guard.as_ref().is_some_and(LossGuard::is_halted);
                if halted {
                    halted_bars += 1;
                } else if noise.skip_signal() {
                    signals_skipped += 1;
                } else {
                    position = self.try_open(&account, bars, frame, i, modifier, noise);
                }
            }

            account.snapshot(bar.timestamp);
        }

        let final_balance = account.balance();
        debug!(
            trades = trades.len(),
            final_balance,
            still_open = position.is_some(),
            "simulation finished"
        );

        SimOutcome {
            trades,
            equity_curve: account.into_equity_curve(),
            initial_balance: config.initial_balance,
            final_balance,
            start_index: Some(start),
            bars_processed: bars.len() - start,
            signals_skipped,
            halted_bars,
            open_position: position,
        }
    }

    /// Evaluate the cascade on bar `i - 1` and build the position to open at
    /// bar `i`, if any.
    fn try_open<N: ExecutionNoise + ?Sized>(
        &self,
        account: &Account,
        bars: &[Bar],
        frame: &IndicatorFrame,
        i: usize,
        modifier: f64,
        noise: &mut N,
    ) -> Option<Position> {
        let ctx = SignalContext {
            prev: &bars[i - 1],
            prev2: &bars[i - 2],
            ind: &frame[i - 1],
        };
        let signal = self.evaluator.evaluate(&ctx)?;

        // Degenerate sizing means no trade.
        self.sizer
            .size(account.balance(), signal.stop_distance, modifier)?;

        let bar = &bars[i];
        let friction = self.config.spread_cost + noise.entry_slippage();
        let position = Position {
            direction: signal.direction,
            strategy: signal.strategy,
            entry_bar: i,
            entry_time: bar.timestamp,
            entry_price: bar.open + signal.direction.sign() * friction,
            stop_distance: signal.stop_distance,
            target_distance: signal.target_distance,
        };
        debug!(
            bar = i,
            direction = %position.direction,
            strategy = %position.strategy,
            entry = position.entry_price,
            stop = position.stop_price(),
            target = position.target_price(),
            "position opened"
        );
        Some(position)
    }

    /// Book the exit of `position` and return its trade record.
    ///
    /// Size comes from the risk budget at the exit bar; a zero modifier books
    /// a zero-size record with a PnL of exactly `0.0`.
    #[allow(clippy::too_many_arguments)]
    fn close<N: ExecutionNoise + ?Sized>(
        &self,
        account: &mut Account,
        position: Position,
        fill: ExitFill,
        i: usize,
        bar: &Bar,
        modifier: f64,
        noise: &mut N,
    ) -> TradeRecord {
        let exit_price = match fill.reason {
            ExitReason::StopLoss => fill.price - position.direction.sign() * noise.stop_slippage(),
            ExitReason::TakeProfit => fill.price,
        };
        let size = self
            .sizer
            .size(account.balance(), position.stop_distance, modifier)
            .unwrap_or(0.0);
        let pnl = if size > 0.0 {
            position.favourable_move(exit_price) * size
        } else {
            0.0
        };
        let balance_after = account.apply_pnl(pnl);

        debug!(
            bar = i,
            direction = %position.direction,
            reason = ?fill.reason,
            exit = exit_price,
            size,
            pnl,
            balance = balance_after,
            "position closed"
        );

        TradeRecord {
            direction: position.direction,
            strategy: position.strategy,
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar: i,
            exit_time: bar.timestamp,
            exit_price,
            exit_reason: fill.reason,
            stop_distance: position.stop_distance,
            size,
            lots: RiskSizer::lots(size, self.config.contract_size),
            pnl,
            balance_after,
        }
    }
}
