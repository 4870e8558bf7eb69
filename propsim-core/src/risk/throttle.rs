//! Drawdown throttle: scales risk down in discrete steps as the account
//! falls below its high-water-mark.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One row of the step table: at or beyond `drawdown_pct`, risk is multiplied
/// by `modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskStep {
    pub drawdown_pct: f64,
    pub modifier: f64,
}

impl RiskStep {
    pub const fn new(drawdown_pct: f64, modifier: f64) -> Self {
        Self {
            drawdown_pct,
            modifier,
        }
    }
}

/// The default scaler: 0.5% → 0.666, 1.0% → 0.333, 1.5% → 0.133, 2.0% → halt.
pub fn default_risk_steps() -> Vec<RiskStep> {
    vec![
        RiskStep::new(0.5, 0.666),
        RiskStep::new(1.0, 0.333),
        RiskStep::new(1.5, 0.133),
        RiskStep::new(2.0, 0.0),
    ]
}

/// Check the step table: thresholds strictly increasing, modifiers within
/// [0, 1] and non-increasing.
pub fn validate_risk_steps(steps: &[RiskStep]) -> Result<(), ConfigError> {
    for (index, step) in steps.iter().enumerate() {
        if !(step.drawdown_pct >= 0.0 && step.drawdown_pct.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "drawdown_risk_steps",
                reason: format!("step {index} threshold {} is not a finite percentage", step.drawdown_pct),
            });
        }
        if !(0.0..=1.0).contains(&step.modifier) {
            return Err(ConfigError::OutOfUnitRange {
                field: "drawdown_risk_steps.modifier",
                value: step.modifier,
            });
        }
        if index > 0 {
            let previous = steps[index - 1];
            if step.drawdown_pct <= previous.drawdown_pct {
                return Err(ConfigError::UnsortedRiskSteps {
                    index,
                    threshold: step.drawdown_pct,
                    previous: previous.drawdown_pct,
                });
            }
            if step.modifier > previous.modifier {
                return Err(ConfigError::IncreasingRiskModifier {
                    index,
                    modifier: step.modifier,
                    previous: previous.modifier,
                });
            }
        }
    }
    Ok(())
}

/// Maps the current drawdown percentage to a risk modifier.
///
/// The modifier is a non-increasing step function of drawdown: 1.0 below the
/// first threshold, otherwise the modifier of the deepest step reached.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownThrottle {
    steps: Vec<RiskStep>,
}

impl DrawdownThrottle {
    /// Build from a validated step table (see [`validate_risk_steps`]).
    pub fn new(steps: Vec<RiskStep>) -> Self {
        Self { steps }
    }

    pub fn modifier(&self, drawdown_pct: f64) -> f64 {
        self.steps
            .iter()
            .take_while(|s| drawdown_pct >= s.drawdown_pct)
            .last()
            .map_or(1.0, |s| s.modifier)
    }

    /// Drawdown at which trading halts (first step with a zero modifier).
    pub fn halt_threshold(&self) -> Option<f64> {
        self.steps
            .iter()
            .find(|s| s.modifier == 0.0)
            .map(|s| s.drawdown_pct)
    }

    pub fn steps(&self) -> &[RiskStep] {
        &self.steps
    }
}

impl Default for DrawdownThrottle {
    fn default() -> Self {
        Self::new(default_risk_steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_risk_at_the_peak() {
        let throttle = DrawdownThrottle::default();
        assert_eq!(throttle.modifier(0.0), 1.0);
        assert_eq!(throttle.modifier(0.49), 1.0);
    }

    #[test]
    fn steps_apply_at_threshold() {
        let throttle = DrawdownThrottle::default();
        assert_eq!(throttle.modifier(0.5), 0.666);
        assert_eq!(throttle.modifier(0.99), 0.666);
        assert_eq!(throttle.modifier(1.0), 0.333);
        assert_eq!(throttle.modifier(1.5), 0.133);
        assert_eq!(throttle.modifier(1.99), 0.133);
    }

    #[test]
    fn halts_at_and_beyond_threshold() {
        let throttle = DrawdownThrottle::default();
        assert_eq!(throttle.halt_threshold(), Some(2.0));
        assert_eq!(throttle.modifier(2.0), 0.0);
        assert_eq!(throttle.modifier(15.0), 0.0);
    }

    #[test]
    fn empty_table_never_throttles() {
        let throttle = DrawdownThrottle::new(Vec::new());
        assert_eq!(throttle.modifier(50.0), 1.0);
        assert_eq!(throttle.halt_threshold(), None);
    }

    #[test]
    fn validation_accepts_default() {
        assert!(validate_risk_steps(&default_risk_steps()).is_ok());
    }

    #[test]
    fn validation_rejects_unsorted_thresholds() {
        let steps = vec![RiskStep::new(1.0, 0.5), RiskStep::new(0.5, 0.25)];
        assert!(matches!(
            validate_risk_steps(&steps),
            Err(ConfigError::UnsortedRiskSteps { index: 1, .. })
        ));
    }

    #[test]
    fn validation_rejects_increasing_modifier() {
        let steps = vec![RiskStep::new(0.5, 0.25), RiskStep::new(1.0, 0.5)];
        assert!(matches!(
            validate_risk_steps(&steps),
            Err(ConfigError::IncreasingRiskModifier { index: 1, .. })
        ));
    }

    #[test]
    fn validation_rejects_modifier_above_one() {
        let steps = vec![RiskStep::new(0.5, 1.5)];
        assert!(validate_risk_steps(&steps).is_err());
    }
}
