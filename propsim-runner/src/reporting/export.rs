//! JSON and CSV export, plus the on-disk artifact bundle.
//!
//! All persisted JSON carries a `schema_version`; newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use propsim_core::domain::{EquityPoint, TradeRecord};
use propsim_core::risk::PointValue;

use super::markdown::{generate_mc_report, generate_report};
use super::monthly::MonthlyRow;
use crate::runner::{BacktestResult, MonteCarloResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

pub fn export_mc_json(result: &MonteCarloResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize MonteCarloResult to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Trade log as CSV.
///
/// Columns: direction, strategy, entry_bar, entry_time, entry_price,
/// exit_bar, exit_time, exit_price, exit_reason, stop_distance, size, lots,
/// broker_lots, pnl, balance_after, bars_held
///
/// `broker_lots` re-expresses each trade's risk at `point_value`.
pub fn export_trades_csv(trades: &[TradeRecord], point_value: &PointValue) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "direction",
        "strategy",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "exit_reason",
        "stop_distance",
        "size",
        "lots",
        "broker_lots",
        "pnl",
        "balance_after",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            t.direction.to_string(),
            t.strategy.name().to_string(),
            t.entry_bar.to_string(),
            t.entry_time.to_rfc3339(),
            format!("{:.4}", t.entry_price),
            t.exit_bar.to_string(),
            t.exit_time.to_rfc3339(),
            format!("{:.4}", t.exit_price),
            t.exit_reason.as_str().to_string(),
            format!("{:.4}", t.stop_distance),
            format!("{:.4}", t.size),
            format!("{:.2}", t.lots),
            format!("{:.2}", point_value.trade_lots(t)),
            format!("{:.2}", t.pnl),
            format!("{:.2}", t.balance_after),
            t.bars_held().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Equity curve as `timestamp,balance`.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "balance"])?;
    for point in equity_curve {
        wtr.write_record([point.timestamp.to_rfc3339(), format!("{:.2}", point.balance)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Monthly breakdown as CSV, one serde-serialized row per month.
pub fn export_monthly_csv(rows: &[MonthlyRow]) -> Result<String> {
    serialize_csv(rows)
}

/// Monte Carlo runs as CSV, one row per run.
pub fn export_mc_runs_csv(result: &MonteCarloResult) -> Result<String> {
    serialize_csv(&result.report.runs)
}

fn serialize_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates `{output_dir}/run_{run_id[..12]}/` containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`, `equity.csv`, `monthly.csv`
/// - `report.md`
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(format!("run_{}", short_id(&result.run_id)));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades, &result.config.report.point_value)?)?;
    write(&run_dir.join("equity.csv"), &export_equity_csv(&result.equity_curve)?)?;
    write(&run_dir.join("monthly.csv"), &export_monthly_csv(&result.monthly)?)?;
    write(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

/// Save the Monte Carlo artifact set under `{output_dir}/mc_{run_id[..12]}/`:
/// `mc_result.json`, `mc_runs.csv` and `mc_report.md`.
pub fn save_mc_artifacts(result: &MonteCarloResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(format!("mc_{}", short_id(&result.run_id)));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("mc_result.json"), &export_mc_json(result)?)?;
    write(&run_dir.join("mc_runs.csv"), &export_mc_runs_csv(result)?)?;
    write(&run_dir.join("mc_report.md"), &generate_mc_report(result))?;

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn short_id(run_id: &str) -> &str {
    run_id.get(..12).unwrap_or(run_id)
}
