//! Execution noise: the seam through which Monte Carlo runs perturb fills.
//!
//! The loop asks for slippage on every entry and every stop exit, and asks
//! whether to skip a signal on every bar where it would evaluate one. Slippage
//! is always adverse; take-profit fills are never slipped.

use rand::rngs::StdRng;
use rand::Rng;

pub trait ExecutionNoise {
    /// Extra price paid on entry, added in the adverse direction.
    fn entry_slippage(&mut self) -> f64;

    /// Extra price lost on a stop exit, applied in the adverse direction.
    fn stop_slippage(&mut self) -> f64;

    /// Whether this bar's signal evaluation is missed.
    fn skip_signal(&mut self) -> bool;
}

/// Deterministic, frictionless fills.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl ExecutionNoise for NoNoise {
    fn entry_slippage(&mut self) -> f64 {
        0.0
    }

    fn stop_slippage(&mut self) -> f64 {
        0.0
    }

    fn skip_signal(&mut self) -> bool {
        false
    }
}

/// One run's noise stream.
///
/// A single slippage bias is drawn uniformly from `slippage_range` when the
/// stream is created and reused for every fill of the run. Missed signals are
/// drawn per bar from the same owned generator.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
    slippage_bias: f64,
    miss_probability: f64,
}

impl SeededNoise {
    pub fn new(mut rng: StdRng, slippage_range: (f64, f64), miss_probability: f64) -> Self {
        let (low, high) = slippage_range;
        let slippage_bias = if high > low {
            rng.gen_range(low..high)
        } else {
            low
        };
        Self {
            rng,
            slippage_bias,
            miss_probability,
        }
    }

    pub fn slippage_bias(&self) -> f64 {
        self.slippage_bias
    }
}

impl ExecutionNoise for SeededNoise {
    fn entry_slippage(&mut self) -> f64 {
        self.slippage_bias
    }

    fn stop_slippage(&mut self) -> f64 {
        self.slippage_bias
    }

    fn skip_signal(&mut self) -> bool {
        self.rng.gen::<f64>() < self.miss_probability
    }
}
