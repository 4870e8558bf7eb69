//! Reporting: monthly breakdown, CSV/JSON export, Markdown reports.

pub mod export;
pub mod markdown;
pub mod monthly;

pub use export::{
    export_equity_csv, export_json, export_monthly_csv, export_trades_csv, import_json,
    load_artifacts, save_artifacts, save_mc_artifacts,
};
pub use markdown::{generate_mc_report, generate_report};
pub use monthly::{monthly_breakdown, MonthlyRow};
