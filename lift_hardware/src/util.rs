use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until the provided `is_high` predicate becomes false (i.e., line goes low),
/// or a timeout expires. Sleeps in small intervals to avoid CPU spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Share of `total` for each of `attempts` tries, so retries never wait
/// longer than `total` overall.
#[inline]
pub fn attempt_timeout(total: Duration, attempts: u32) -> Duration {
    total / attempts.max(1)
}

/// Sign-extend a 24-bit two's-complement value held in the low bits of `raw`.
#[inline]
pub fn sign_extend_24(raw: u32) -> i32 {
    let v = (raw & 0x00FF_FFFF) as i32;
    if (v & 0x0080_0000) != 0 {
        v | !0x00FF_FFFF
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x000000, 0)]
    #[case(0x7FFFFF, 8_388_607)]
    #[case(0x800000, -8_388_608)]
    #[case(0xFFFFFF, -1)]
    #[case(0xAB00_0001, 1)] // bits above 24 are ignored
    fn sign_extension_covers_both_halves(#[case] raw: u32, #[case] expected: i32) {
        assert_eq!(sign_extend_24(raw), expected);
    }

    #[rstest]
    #[case(1000, 3, 333)]
    #[case(1000, 1, 1000)]
    #[case(1000, 0, 1000)]
    #[case(90, 2, 45)]
    fn retries_share_one_timeout_budget(
        #[case] total_ms: u64,
        #[case] attempts: u32,
        #[case] expected_ms: u64,
    ) {
        let total = Duration::from_millis(total_ms);
        let each = attempt_timeout(total, attempts);
        assert_eq!(each.as_millis(), u128::from(expected_ms));
        assert!(each * attempts.max(1) <= total);
    }
}
