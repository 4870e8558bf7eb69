//! Loss guard: daily and trailing total loss limits.
//!
//! The daily limit is measured against the equity at the first bar of each
//! calendar day (UTC) and resets when the day changes. The total limit trails
//! the highest equity seen and stays tripped for the rest of the run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossLimits {
    /// Maximum loss from start-of-day equity, in percent.
    pub max_daily_loss_pct: f64,
    /// Maximum loss from the trailing high-water-mark, in percent.
    pub max_total_loss_pct: f64,
}

impl Default for LossLimits {
    fn default() -> Self {
        Self {
            max_daily_loss_pct: 4.0,
            max_total_loss_pct: 9.0,
        }
    }
}

impl LossLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_daily_loss_pct", self.max_daily_loss_pct),
            ("max_total_loss_pct", self.max_total_loss_pct),
        ] {
            if !(value > 0.0 && value < 100.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not a percentage in (0, 100)"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LossGuard {
    limits: LossLimits,
    day: Option<NaiveDate>,
    day_start_equity: f64,
    high_water_mark: f64,
    daily_limit_hit: bool,
    total_limit_hit: bool,
}

impl LossGuard {
    pub fn new(limits: LossLimits, starting_equity: f64) -> Self {
        Self {
            limits,
            day: None,
            day_start_equity: starting_equity,
            high_water_mark: starting_equity,
            daily_limit_hit: false,
            total_limit_hit: false,
        }
    }

    /// Feed the equity at `timestamp` and update both flags.
    pub fn observe(&mut self, timestamp: DateTime<Utc>, equity: f64) {
        let today = timestamp.date_naive();
        if self.day != Some(today) {
            self.day = Some(today);
            self.day_start_equity = equity;
            self.daily_limit_hit = false;
        }

        let daily_floor = self.day_start_equity * (1.0 - self.limits.max_daily_loss_pct / 100.0);
        if !self.daily_limit_hit && equity <= daily_floor {
            self.daily_limit_hit = true;
            warn!(%timestamp, equity, limit = daily_floor, "daily loss limit hit");
        }

        if equity > self.high_water_mark {
            self.high_water_mark = equity;
        }
        let total_floor = self.high_water_mark * (1.0 - self.limits.max_total_loss_pct / 100.0);
        if !self.total_limit_hit && equity <= total_floor {
            self.total_limit_hit = true;
            warn!(%timestamp, equity, limit = total_floor, "total loss limit hit");
        }
    }

    pub fn daily_limit_hit(&self) -> bool {
        self.daily_limit_hit
    }

    pub fn total_limit_hit(&self) -> bool {
        self.total_limit_hit
    }

    /// No new positions while either limit is tripped.
    pub fn is_halted(&self) -> bool {
        self.daily_limit_hit || self.total_limit_hit
    }

    pub fn high_water_mark(&self) -> f64 {
        self.high_water_mark
    }
}
