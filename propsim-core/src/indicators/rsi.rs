//! Relative Strength Index (RSI).
//!
//! Gains and losses are averaged with a simple rolling mean (not Wilder).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! The first change (bar 0) counts as zero gain and zero loss.
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 → 100; avg_gain == avg_loss == 0 → 50.

use crate::domain::Bar;

use super::sma::rolling_mean;

pub fn rsi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    for i in 1..n {
        let change = bars[i].close - bars[i - 1].close;
        if change.is_nan() {
            gains[i] = f64::NAN;
            losses[i] = f64::NAN;
        } else if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else if l == 0.0 && g == 0.0 {
                50.0
            } else if l == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn all_gains_is_100() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let out = rsi(&bars, 3);
        assert_approx(out[5], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn all_losses_is_0() {
        let bars = make_bars(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let out = rsi(&bars, 3);
        assert_approx(out[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_is_neutral() {
        let bars = make_bars(&[5.0; 6]);
        let out = rsi(&bars, 3);
        assert_approx(out[5], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn balanced_moves() {
        // changes: +2, -2, +2, -2 → window of 4 has avg gain == avg loss
        let bars = make_bars(&[10.0, 12.0, 10.0, 12.0, 10.0]);
        let out = rsi(&bars, 4);
        assert_approx(out[4], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bounded() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let bars = make_bars(&closes);
        for v in rsi(&bars, 14).into_iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn lookback() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let out = rsi(&bars, 3);
        assert!(out[1].is_nan());
        assert!(!out[2].is_nan());
    }
}
