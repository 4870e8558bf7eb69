//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[first] = first non-NaN value, so there is no warmup NaN after the
//! first valid input. A NaN input carries the previous EMA forward.

pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (i, &x) in values.iter().enumerate() {
        let next = match (prev, x.is_nan()) {
            (None, true) => continue,
            (None, false) => x,
            (Some(p), true) => p,
            (Some(p), false) => alpha * x + (1.0 - alpha) * p,
        };
        result[i] = next;
        prev = Some(next);
    }

    result
}
