//! Backtest configuration file.
//!
//! One TOML document describes a complete, reproducible run:
//!
//! ```toml
//! [data]
//! path = "data/gold_1h.csv"
//!
//! [simulation]
//! risk_percent = 0.0075
//! spread_cost = 0.20
//!
//! [indicators]
//! atr_period = 14
//!
//! [monte_carlo]
//! runs = 100
//! seed = 42
//!
//! [report]
//! output_dir = "reports"
//!
//! [report.point_value]
//! tick_value = 1.0
//! tick_size = 0.01
//! point = 0.01
//! ```
//!
//! Every section and every field is optional; omitted values take their
//! defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use propsim_core::engine::SimConfig;
use propsim_core::indicators::IndicatorSettings;
use propsim_core::risk::PointValue;

use crate::data_loader::DataConfig;
use crate::monte_carlo::MonteCarloConfig;

/// Errors reading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] propsim_core::ConfigError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `[report]` section: where and at what rate to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// Bars per year, used to annualize the Sharpe ratio.
    pub periods_per_year: f64,
    /// Broker valuation for the `broker_lots` column of the trade log.
    pub point_value: PointValue,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            // Hourly bars, roughly 23 trading hours over 252 sessions.
            periods_per_year: 252.0 * 23.0,
            point_value: PointValue::default(),
        }
    }
}

/// Serializable configuration for a backtest (single run or Monte Carlo).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub data: DataConfig,
    pub simulation: SimConfig,
    pub indicators: IndicatorSettings,
    pub monte_carlo: MonteCarloConfig,
    pub report: ReportConfig,
}

impl BacktestConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.indicators.validate()?;
        self.monte_carlo.validate()?;
        if !(self.report.periods_per_year > 0.0 && self.report.periods_per_year.is_finite()) {
            return Err(propsim_core::ConfigError::NonPositive {
                field: "periods_per_year",
                value: self.report.periods_per_year,
            }
            .into());
        }
        let pv = &self.report.point_value;
        for (field, value) in [
            ("point_value.tick_value", pv.tick_value),
            ("point_value.tick_size", pv.tick_size),
            ("point_value.point", pv.point),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(propsim_core::ConfigError::NonPositive { field, value }.into());
            }
        }
        Ok(())
    }

    /// Deterministic content hash of the configuration.
    ///
    /// Two runs with identical configs share a run id.
    pub fn run_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
