//! Conversion helpers between raw converter counts and volts.
//!
//! These are small utility functions shared by the board backends and by
//! consuming applications that want to work in raw counts.

/// Convert a raw ADC count to volts.
///
/// `full_scale` volts corresponds to `max_count`, so for a 12-bit ADC with
/// a 3.0 V reference, a count of 4095 reads as 3.0 V.
///
/// # Example
///
/// ```
/// use bridgelib_core::volts_from_counts;
///
/// assert_eq!(volts_from_counts(4095, 3.0, 4095), 3.0);
/// assert_eq!(volts_from_counts(0, 3.0, 4095), 0.0);
/// ```
pub fn volts_from_counts(raw: u16, full_scale: f32, max_count: u16) -> f32 {
    raw as f32 * full_scale / max_count as f32
}

/// Convert a voltage to a raw DAC count.
///
/// The voltage is clamped to `0.0..=full_scale` before conversion, and the
/// count is truncated rather than rounded, matching what the converter
/// hardware does with the value.
///
/// # Example
///
/// ```
/// use bridgelib_core::counts_from_volts;
///
/// assert_eq!(counts_from_volts(3.0, 3.0, 4095), 4095);
/// assert_eq!(counts_from_volts(10.0, 3.0, 4095), 4095);
/// assert_eq!(counts_from_volts(-1.0, 3.0, 4095), 0);
/// assert_eq!(counts_from_volts(1.5, 3.0, 4095), 2047);
/// ```
pub fn counts_from_volts(volts: f32, full_scale: f32, max_count: u16) -> u16 {
    let clamped = volts.clamp(0.0, full_scale);
    (clamped / full_scale * max_count as f32) as u16
}

/// Convert a duty-cycle fraction to PWM compare ticks.
///
/// `duty` must already be validated to `0.0..=1.0`; the result is truncated.
///
/// # Example
///
/// ```
/// use bridgelib_core::pwm_ticks_from_duty;
///
/// assert_eq!(pwm_ticks_from_duty(0.5, 10_000), 5000);
/// assert_eq!(pwm_ticks_from_duty(1.0, 10_000), 10_000);
/// assert_eq!(pwm_ticks_from_duty(0.0, 10_000), 0);
/// ```
pub fn pwm_ticks_from_duty(duty: f32, period_ticks: u32) -> u32 {
    (period_ticks as f32 * duty) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volts_full_scale_and_zero() {
        assert_eq!(volts_from_counts(4095, 3.0, 4095), 3.0);
        assert_eq!(volts_from_counts(0, 3.0, 4095), 0.0);
    }

    #[test]
    fn volts_midpoint() {
        let v = volts_from_counts(2048, 3.0, 4095);
        assert!((v - 1.5).abs() < 0.001);
    }

    #[test]
    fn counts_truncate_not_round() {
        // 1.5 V of 3.0 V over 4095 counts is 2047.5; the hardware truncates.
        assert_eq!(counts_from_volts(1.5, 3.0, 4095), 2047);
        assert_eq!(counts_from_volts(2.0, 3.0, 4095), 2730);
    }

    #[test]
    fn counts_clamp_both_ends() {
        assert_eq!(counts_from_volts(10.0, 3.0, 4095), 4095);
        assert_eq!(counts_from_volts(-0.5, 3.0, 4095), 0);
    }

    #[test]
    fn pwm_ticks_span() {
        assert_eq!(pwm_ticks_from_duty(0.0, 10_000), 0);
        assert_eq!(pwm_ticks_from_duty(0.25, 10_000), 2500);
        assert_eq!(pwm_ticks_from_duty(0.5, 10_000), 5000);
        assert_eq!(pwm_ticks_from_duty(1.0, 10_000), 10_000);
    }
}
