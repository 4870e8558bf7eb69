//! Average Directional Index (ADX), simple-average variant.
//!
//! +DM = up move when up > down and up > 0, else 0 (up = high - prev high)
//! -DM = down move when down > up and down > 0, else 0 (down = prev low - low)
//! +DI/-DI = 100 * rolling_mean(DM) / rolling_mean(TR)
//! DX = 100 * |+DI - -DI| / (+DI + -DI)
//! ADX = rolling_mean(DX)
//!
//! Undefined values (warmup, or a window with no directional movement) are
//! replaced by `fill` when one is given.

use crate::domain::Bar;

use super::atr::true_range;
use super::sma::rolling_mean;

pub fn adx(bars: &[Bar], period: usize, fill: Option<f64>) -> Vec<f64> {
    let n = bars.len();
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let atr = rolling_mean(&true_range(bars), period);
    let plus_avg = rolling_mean(&plus_dm, period);
    let minus_avg = rolling_mean(&minus_dm, period);

    let dx: Vec<f64> = (0..n)
        .map(|i| {
            if atr[i].is_nan() || atr[i] == 0.0 {
                return f64::NAN;
            }
            let plus_di = 100.0 * plus_avg[i] / atr[i];
            let minus_di = 100.0 * minus_avg[i] / atr[i];
            let sum = plus_di + minus_di;
            if sum.is_nan() || sum == 0.0 {
                f64::NAN
            } else {
                100.0 * (plus_di - minus_di).abs() / sum
            }
        })
        .collect();

    let mut out = rolling_mean(&dx, period);
    if let Some(fill) = fill {
        for v in out.iter_mut().filter(|v| v.is_nan()) {
            *v = fill;
        }
    }
    out
}
