//! Simulation engine: configuration, exit checks, execution noise and the
//! bar-by-bar loop.
//!
//! The loop is a pure function of (bars, indicator frame, configuration,
//! noise stream). It does no I/O and never fails at run time: short input
//! yields an empty outcome, degenerate sizing yields no trade.

pub mod config;
pub mod exits;
pub mod loop_runner;
pub mod noise;
pub mod warmup;

pub use config::SimConfig;
pub use exits::{check_exit, ExitFill};
pub use loop_runner::{SimOutcome, Simulator};
pub use noise::{ExecutionNoise, NoNoise, SeededNoise};
pub use warmup::start_index;
