//! Simulation configuration: one immutable value per run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::risk::{default_risk_steps, validate_risk_steps, LossLimits, RiskStep};
use crate::strategy::RsiExtremes;

/// Parameters of the Simulation Loop, the Signal Evaluator and the Risk Sizer.
///
/// Missing fields deserialize to their defaults, so a TOML `[simulation]`
/// section only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub initial_balance: f64,
    /// Fraction of balance risked per trade at full modifier (0.0075 = 0.75%).
    pub risk_percent: f64,
    /// Price added to long entries and subtracted from short entries.
    pub spread_cost: f64,
    pub stop_atr_multiplier: f64,
    pub target_atr_multiplier: f64,
    /// Floor for the ATR used in stop/target distances; also the momentum
    /// volatility filter.
    pub min_atr_floor: f64,
    /// Minimum index of the first processed bar.
    pub warmup_bars: usize,
    /// Units per standard lot.
    pub contract_size: f64,
    pub drawdown_risk_steps: Vec<RiskStep>,
    pub enable_mean_reversion: bool,
    pub enable_pullback: bool,
    pub enable_htf_filter: bool,
    pub enable_adx_filter: bool,
    pub rsi_extremes: RsiExtremes,
    pub adx_trend_threshold: f64,
    /// Daily/total loss limits; `None` disables the loss guard.
    pub loss_limits: Option<LossLimits>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100_000.0,
            risk_percent: 0.0075,
            spread_cost: 0.20,
            stop_atr_multiplier: 1.5,
            target_atr_multiplier: 2.5,
            min_atr_floor: 1.0,
            warmup_bars: 55,
            contract_size: 100.0,
            drawdown_risk_steps: default_risk_steps(),
            enable_mean_reversion: true,
            enable_pullback: true,
            enable_htf_filter: true,
            enable_adx_filter: true,
            rsi_extremes: RsiExtremes::default(),
            adx_trend_threshold: 20.0,
            loss_limits: None,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be zero or positive"),
        })
    }
}

impl SimConfig {
    /// Reject configurations the loop cannot run meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("initial_balance", self.initial_balance)?;
        positive("risk_percent", self.risk_percent)?;
        if self.risk_percent > 1.0 {
            return Err(ConfigError::OutOfUnitRange {
                field: "risk_percent",
                value: self.risk_percent,
            });
        }
        non_negative("spread_cost", self.spread_cost)?;
        positive("stop_atr_multiplier", self.stop_atr_multiplier)?;
        positive("target_atr_multiplier", self.target_atr_multiplier)?;
        non_negative("min_atr_floor", self.min_atr_floor)?;
        positive("contract_size", self.contract_size)?;
        non_negative("adx_trend_threshold", self.adx_trend_threshold)?;

        let RsiExtremes { low, high } = self.rsi_extremes;
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
            return Err(ConfigError::Invalid {
                field: "rsi_extremes",
                reason: format!("need 0 <= low < high <= 100, got low={low} high={high}"),
            });
        }

        validate_risk_steps(&self.drawdown_risk_steps)?;

        if let Some(limits) = &self.loss_limits {
            limits.validate()?;
        }
        Ok(())
    }
}
