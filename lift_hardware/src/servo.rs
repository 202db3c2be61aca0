//! Hobby-servo angle to PWM mapping for the door actuator.
//!
//! Standard 50 Hz servo: 1 ms pulse = 0°, 2 ms pulse = 180°.

pub const SERVO_FREQUENCY_HZ: f64 = 50.0;
pub const PERIOD_US: u32 = 20_000;
pub const MIN_PULSE_US: u32 = 1_000;
pub const MAX_PULSE_US: u32 = 2_000;
pub const MAX_ANGLE: u8 = 180;

/// Pulse width in microseconds for `angle` (clamped to 0..=180).
#[inline]
pub fn angle_to_pulse_us(angle: u8) -> u32 {
    let angle = u32::from(angle.min(MAX_ANGLE));
    MIN_PULSE_US + ((MAX_PULSE_US - MIN_PULSE_US) * angle) / u32::from(MAX_ANGLE)
}

/// Duty cycle as a fraction of the period, for PWM APIs that take 0.0..=1.0.
#[inline]
pub fn angle_to_duty_fraction(angle: u8) -> f64 {
    f64::from(angle_to_pulse_us(angle)) / f64::from(PERIOD_US)
}

/// Duty in timer counts for a PWM peripheral with `resolution_bits` of resolution.
pub fn angle_to_duty_counts(angle: u8, resolution_bits: u8) -> u32 {
    let full_scale = (1u32 << resolution_bits.min(20)) - 1;
    let min = MIN_PULSE_US * full_scale / PERIOD_US;
    let max = MAX_PULSE_US * full_scale / PERIOD_US;
    min + ((max - min) * u32::from(angle.min(MAX_ANGLE))) / u32::from(MAX_ANGLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1_000)]
    #[case(90, 1_500)]
    #[case(180, 2_000)]
    #[case(255, 2_000)]
    fn pulse_endpoints(#[case] angle: u8, #[case] pulse_us: u32) {
        assert_eq!(angle_to_pulse_us(angle), pulse_us);
    }

    #[rstest]
    #[case(0, 51)]
    #[case(90, 76)]
    #[case(180, 102)]
    fn ten_bit_counts_match_five_to_ten_percent(#[case] angle: u8, #[case] counts: u32) {
        assert_eq!(angle_to_duty_counts(angle, 10), counts);
    }

    #[test]
    fn duty_fraction_is_pulse_over_period() {
        assert!((angle_to_duty_fraction(0) - 0.05).abs() < 1e-9);
        assert!((angle_to_duty_fraction(180) - 0.10).abs() < 1e-9);
    }
}
