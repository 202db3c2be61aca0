//! Common time helpers for lift_core.

use std::time::Duration;

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
#[inline]
pub fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Remaining part of a fixed `period` after `spent`, zero when overrun.
#[inline]
pub fn remaining(period: Duration, spent: Duration) -> Duration {
    period.saturating_sub(spent)
}
