//! Bar loading for the runner.
//!
//! Bars come from one of two places:
//! 1. A CSV file with `timestamp,open,high,low,close` columns (extra columns,
//!    such as volume, are ignored)
//! 2. A synthetic random walk, when no file is configured
//!
//! The loader enforces what the engine assumes: finite, internally consistent
//! OHLC values and strictly increasing timestamps. Synthetic data is tagged so
//! reports can say so.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use propsim_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: unrecognized timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: OHLC values are not finite or not consistent (high < low etc.)")]
    InvalidBar { line: u64 },

    #[error("line {line}: timestamp {timestamp} does not follow {previous}")]
    Unordered {
        line: u64,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("no bars in {0}")]
    Empty(PathBuf),
}

/// Where the bars came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic,
}

/// `[data]` section of the backtest config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file of bars. `None` selects synthetic data.
    pub path: Option<PathBuf>,
    pub synthetic_bars: usize,
    pub synthetic_seed: u64,
    pub synthetic_start_price: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            synthetic_bars: 5_000,
            synthetic_seed: 7,
            synthetic_start_price: 2_000.0,
        }
    }
}

/// Bars plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<Bar>,
    pub source: DataSource,
    /// BLAKE3 over every timestamp and OHLC value.
    pub dataset_hash: String,
}

impl LoadedBars {
    /// Wrap bars that are already in memory, hashing them.
    pub fn new(bars: Vec<Bar>, source: DataSource) -> Self {
        let dataset_hash = dataset_hash(&bars);
        Self {
            bars,
            source,
            dataset_hash,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load bars according to `config`.
pub fn load_bars(config: &DataConfig) -> Result<LoadedBars, LoadError> {
    let (bars, source) = match &config.path {
        Some(path) => (load_csv(path)?, DataSource::Csv(path.clone())),
        None => {
            warn!(
                bars = config.synthetic_bars,
                seed = config.synthetic_seed,
                "no data file configured; generating synthetic bars"
            );
            let start = Utc
                .with_ymd_and_hms(2023, 1, 2, 0, 0, 0)
                .single()
                .unwrap_or_default();
            let bars = synthetic_bars(
                config.synthetic_bars,
                config.synthetic_seed,
                config.synthetic_start_price,
                start,
            );
            (bars, DataSource::Synthetic)
        }
    };
    info!(bars = bars.len(), source = ?source, "bars loaded");
    Ok(LoadedBars::new(bars, source))
}

/// Load and validate a CSV file of bars.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = parse_csv(file)?;
    if bars.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Timestamp", alias = "Datetime", alias = "datetime", alias = "Date", alias = "date", alias = "time")]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
}

/// Parse bars from any CSV reader with a header row.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars: Vec<Bar> = Vec::new();
    for result in rdr.deserialize::<CsvRow>() {
        let row = result.map_err(|source| LoadError::Csv {
            line: source.position().map_or(0, |p| p.line()),
            source,
        })?;
        // Header is line 1.
        let line = bars.len() as u64 + 2;

        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            line,
            value: row.timestamp.clone(),
        })?;
        let bar = Bar::new(timestamp, row.open, row.high, row.low, row.close);
        let finite = [bar.open, bar.high, bar.low, bar.close]
            .iter()
            .all(|v| v.is_finite());
        if !finite || !bar.is_sane() {
            return Err(LoadError::InvalidBar { line });
        }
        if let Some(previous) = bars.last() {
            if bar.timestamp <= previous.timestamp {
                return Err(LoadError::Unordered {
                    line,
                    timestamp: bar.timestamp,
                    previous: previous.timestamp,
                });
            }
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` with or without a UTC offset, and
/// bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.timestamp().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate `n` hourly synthetic bars (weekends skipped) as a seeded random
/// walk from `start_price`.
///
/// Volatility regimes alternate every few hundred bars so that every entry
/// strategy gets a chance to fire. These bars are clearly fake.
pub fn synthetic_bars(n: usize, seed: u64, start_price: f64, start: DateTime<Utc>) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut price = start_price;
    let mut current = start;
    let mut drift = 0.0_f64;
    let mut vol = 1.5_f64;

    while bars.len() < n {
        let weekday = current.weekday();
        if weekday == Weekday::Sat || weekday == Weekday::Sun {
            current += Duration::hours(1);
            continue;
        }

        if bars.len() % 250 == 0 {
            drift = rng.gen_range(-0.15..0.15);
            vol = rng.gen_range(0.6..2.8);
        }

        let open = price;
        let close = (open + drift + rng.gen_range(-vol..vol)).max(1.0);
        let high = open.max(close) + rng.gen_range(0.0..vol * 0.6);
        let low = (open.min(close) - rng.gen_range(0.0..vol * 0.6)).max(0.5);
        bars.push(Bar::new(current, open, high, low, close));

        price = close;
        current += Duration::hours(1);
    }
    bars
}
