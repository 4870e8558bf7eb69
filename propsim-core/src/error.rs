//! Configuration errors.
//!
//! The simulation loop itself never fails: short input, degenerate sizing and
//! undefined indicator values are handled locally. Only an invalid
//! configuration is reported, before any bar is processed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must be >= 1")]
    ZeroPeriod { field: &'static str },

    #[error("drawdown risk steps must have strictly increasing thresholds (step {index}: {threshold}% after {previous}%)")]
    UnsortedRiskSteps {
        index: usize,
        threshold: f64,
        previous: f64,
    },

    #[error("drawdown risk modifiers must not increase with drawdown (step {index}: {modifier} after {previous})")]
    IncreasingRiskModifier {
        index: usize,
        modifier: f64,
        previous: f64,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
