//! Loop start index.

use crate::indicators::IndicatorFrame;

/// Entries read bars `i - 1` and `i - 2`.
pub const MIN_LOOKBACK: usize = 2;

/// First bar index the loop processes, or `None` if no bar has a complete
/// indicator row behind it.
///
/// The loop reads indicators of the previous bar, so the start must be one
/// past the first complete row, and never before `warmup_bars`.
pub fn start_index(frame: &IndicatorFrame, warmup_bars: usize) -> Option<usize> {
    let first_complete = frame.first_complete_index()?;
    Some(warmup_bars.max(first_complete + 1).max(MIN_LOOKBACK))
}
