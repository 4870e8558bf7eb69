//! Domain types for the simulator.

pub mod account;
pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use account::{Account, EquityPoint};
pub use bar::Bar;
pub use position::Position;
pub use signal::{Direction, Signal, StrategyKind};
pub use trade::{ExitReason, TradeRecord};
