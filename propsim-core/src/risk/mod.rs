//! Risk: position sizing, drawdown throttling and loss limits.
//!
//! - [`RiskSizer`] turns a risk budget and a stop distance into units.
//! - [`DrawdownThrottle`] scales that budget down as the account falls below
//!   its high-water-mark, reaching zero (no new entries) at the halt step.
//! - [`LossGuard`] optionally blocks entries after a daily or total loss.

pub mod loss_guard;
pub mod sizer;
pub mod throttle;

pub use loss_guard::{LossGuard, LossLimits};
pub use sizer::{PointValue, RiskSizer};
pub use throttle::{default_risk_steps, validate_risk_steps, DrawdownThrottle, RiskStep};
