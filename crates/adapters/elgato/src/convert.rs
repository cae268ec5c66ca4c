//! Kelvin ↔ native colour-register conversion.
//!
//! The lights' colour register is a nonlinear encoding of Kelvin. The two
//! directions are inverse-ish but lossy: decoding rounds to the nearest
//! 100K, so a round trip is only guaranteed to land within 100K of the
//! original value, never exactly on it.

/// Encode a Kelvin value into the native colour register:
/// `native = round(987007 * kelvin^-0.999)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn kelvin_to_native(kelvin: u16) -> u32 {
    (987_007.0 * f64::from(kelvin).powf(-0.999)).round() as u32
}

/// Decode a native colour register back into Kelvin, rounded to the nearest
/// hundred: `kelvin = round_to_hundred(1_000_000 / native)`.
///
/// Callers must reject `native == 0` first.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn native_to_kelvin(native: u32) -> u16 {
    ((1_000_000.0 / f64::from(native) / 100.0).round() * 100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_range_endpoints() {
        assert_eq!(kelvin_to_native(2900), 343);
        assert_eq!(kelvin_to_native(7000), 142);
    }

    #[test]
    fn should_decode_range_endpoints() {
        assert_eq!(native_to_kelvin(343), 2900);
        assert_eq!(native_to_kelvin(142), 7000);
    }

    #[test]
    fn should_round_decoded_kelvin_to_nearest_hundred() {
        // 1_000_000 / 250 = 4000 exactly; 1_000_000 / 251 = 3984.06 → 4000.
        assert_eq!(native_to_kelvin(250), 4000);
        assert_eq!(native_to_kelvin(251), 4000);
        assert_eq!(native_to_kelvin(255), 3900);
    }

    #[test]
    fn should_encode_monotonically_decreasing() {
        let mut previous = kelvin_to_native(2900);
        for kelvin in (2910..=7000).step_by(10) {
            let native = kelvin_to_native(kelvin);
            assert!(native <= previous, "native register rose at {kelvin}K");
            previous = native;
        }
    }

    #[test]
    fn should_round_trip_within_one_hundred_kelvin() {
        for kelvin in (2900..=7000).step_by(10) {
            let decoded = native_to_kelvin(kelvin_to_native(kelvin));
            let diff = i32::from(decoded) - i32::from(kelvin);
            assert!(
                diff.abs() <= 100,
                "round trip drifted {diff}K at {kelvin}K (decoded {decoded}K)"
            );
        }
    }
}
