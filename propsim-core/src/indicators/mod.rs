//! Indicator pipeline: per-bar derived series aligned to the bar index.
//!
//! Indicators are pure functions of the bar history, precomputed once before
//! the bar loop. The loop reads them through an [`IndicatorFrame`], one
//! [`IndicatorRow`] per bar. Values before a window fills are NaN; the loop's
//! start index skips them, so strategies never check for NaN themselves.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::ConfigError;

/// Window lengths and multipliers for the indicator pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub atr_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std_multiplier: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub rsi_period: usize,
    pub adx_period: usize,
    /// Value substituted for undefined ADX readings. `None` leaves them NaN.
    pub adx_fill: Option<f64>,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            atr_period: 14,
            bollinger_period: 20,
            bollinger_std_multiplier: 2.5,
            ema_fast: 9,
            ema_slow: 21,
            ema_trend: 50,
            rsi_period: 14,
            adx_period: 14,
            adx_fill: Some(20.0),
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("atr_period", self.atr_period),
            ("bollinger_period", self.bollinger_period),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_trend", self.ema_trend),
            ("rsi_period", self.rsi_period),
            ("adx_period", self.adx_period),
        ];
        for (field, period) in periods {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { field });
            }
        }
        if self.bollinger_period < 2 {
            return Err(ConfigError::Invalid {
                field: "bollinger_period",
                reason: "standard deviation needs at least 2 bars".into(),
            });
        }
        if !(self.bollinger_std_multiplier > 0.0 && self.bollinger_std_multiplier.is_finite()) {
            return Err(ConfigError::NonPositive {
                field: "bollinger_std_multiplier",
                value: self.bollinger_std_multiplier,
            });
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::Invalid {
                field: "ema_fast",
                reason: format!(
                    "fast span {} must be shorter than slow span {}",
                    self.ema_fast, self.ema_slow
                ),
            });
        }
        Ok(())
    }
}

/// Derived values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub atr: f64,
    pub sma: f64,
    pub std_dev: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub rsi: f64,
    pub adx: f64,
}

impl IndicatorRow {
    /// A row with every field undefined.
    pub fn undefined() -> Self {
        Self {
            atr: f64::NAN,
            sma: f64::NAN,
            std_dev: f64::NAN,
            upper_band: f64::NAN,
            lower_band: f64::NAN,
            ema_fast: f64::NAN,
            ema_slow: f64::NAN,
            ema_trend: f64::NAN,
            rsi: f64::NAN,
            adx: f64::NAN,
        }
    }

    /// True once every field has left its warmup window.
    pub fn is_complete(&self) -> bool {
        [
            self.atr,
            self.sma,
            self.std_dev,
            self.upper_band,
            self.lower_band,
            self.ema_fast,
            self.ema_slow,
            self.ema_trend,
            self.rsi,
            self.adx,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Indicator rows aligned 1:1 with a bar series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Run the full pipeline over `bars`.
    pub fn compute(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let atr = atr::atr(bars, settings.atr_period);
        let sma = sma::rolling_mean(&closes, settings.bollinger_period);
        let std_dev = sma::rolling_std(&closes, settings.bollinger_period);
        let ema_fast = ema::ema(&closes, settings.ema_fast);
        let ema_slow = ema::ema(&closes, settings.ema_slow);
        let ema_trend = ema::ema(&closes, settings.ema_trend);
        let rsi = rsi::rsi(bars, settings.rsi_period);
        let adx = adx::adx(bars, settings.adx_period, settings.adx_fill);

        let k = settings.bollinger_std_multiplier;
        let rows = (0..bars.len())
            .map(|i| IndicatorRow {
                atr: atr[i],
                sma: sma[i],
                std_dev: std_dev[i],
                upper_band: sma[i] + k * std_dev[i],
                lower_band: sma[i] - k * std_dev[i],
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                ema_trend: ema_trend[i],
                rsi: rsi[i],
                adx: adx[i],
            })
            .collect();

        Self { rows }
    }

    /// Wrap rows computed elsewhere.
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    /// First bar index at which every indicator is defined.
    pub fn first_complete_index(&self) -> Option<usize> {
        self.rows.iter().position(IndicatorRow::is_complete)
    }
}

impl std::ops::Index<usize> for IndicatorFrame {
    type Output = IndicatorRow;

    fn index(&self, index: usize) -> &IndicatorRow {
        &self.rows[index]
    }
}

/// Create synthetic hourly bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 2000.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn frame_aligned_with_bars() {
        let bars = make_bars(&wave(80));
        let frame = IndicatorFrame::compute(&bars, &IndicatorSettings::default());
        assert_eq!(frame.len(), bars.len());
    }

    #[test]
    fn bands_bracket_the_mean() {
        let bars = make_bars(&wave(80));
        let frame = IndicatorFrame::compute(&bars, &IndicatorSettings::default());
        let row = frame[70];
        assert!(row.upper_band > row.sma);
        assert!(row.lower_band < row.sma);
        assert_approx(row.upper_band - row.sma, 2.5 * row.std_dev, 1e-9);
    }

    #[test]
    fn first_complete_index_follows_longest_window() {
        let bars = make_bars(&wave(80));
        let frame = IndicatorFrame::compute(&bars, &IndicatorSettings::default());
        // Bollinger (20) is the longest NaN window; ADX is filled and EMAs seed at bar 0.
        assert_eq!(frame.first_complete_index(), Some(19));
        assert!(!frame[18].is_complete());
    }

    #[test]
    fn too_short_series_never_completes() {
        let bars = make_bars(&wave(10));
        let frame = IndicatorFrame::compute(&bars, &IndicatorSettings::default());
        assert_eq!(frame.first_complete_index(), None);
    }

    #[test]
    fn empty_bars_give_empty_frame() {
        let frame = IndicatorFrame::compute(&[], &IndicatorSettings::default());
        assert!(frame.is_empty());
        assert_eq!(frame.get(0), None);
    }

    #[test]
    fn settings_validation() {
        assert!(IndicatorSettings::default().validate().is_ok());

        let zero = IndicatorSettings {
            atr_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::ZeroPeriod { field: "atr_period" })
        ));

        let inverted = IndicatorSettings {
            ema_fast: 30,
            ema_slow: 21,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
