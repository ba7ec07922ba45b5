/// Scaling helpers for normalized sensor values.
///
/// A normalized value is nominally in `0.0..=1.0`. The range
/// conversions clamp their output, so a value slightly outside that
/// interval still lands inside the requested bounds.
///
/// # Examples
///
/// ```
/// use adc_calibrator::Scale;
///
/// assert_eq!(0.5f32.as_range(10.0, 20.0), 15.0);
/// assert_eq!(1.2f32.as_range_i32(0, 360), 360);
/// assert_eq!(6.25f32.normalize(12.5), 0.5);
/// ```
pub trait Scale {
    /// Maps the value onto `minimum..=maximum`.
    fn as_range(self, minimum: f32, maximum: f32) -> f32;

    /// Maps the value onto `minimum..=maximum`, truncating toward zero.
    fn as_range_i32(self, minimum: i32, maximum: i32) -> i32;

    /// Maps the value onto `0.0..=maximum`.
    fn as_scaled_value(self, maximum: f32) -> f32;

    /// Maps the value onto `0..=maximum`, truncating toward zero.
    fn as_scaled_i32(self, maximum: i32) -> i32;

    /// Divides by the value a saturated sensor actually reports, for
    /// sensors that never reach the supply voltage.
    fn with_calibration(self, calibrated_maximum: f32) -> f32;

    /// Divides by `maximum`, turning a physical value back into a
    /// fraction of full scale.
    fn normalize(self, maximum: f32) -> f32;
}

impl Scale for f32 {
    fn as_range(self, minimum: f32, maximum: f32) -> f32 {
        clamp(self * (maximum - minimum) + minimum, minimum, maximum)
    }

    fn as_range_i32(self, minimum: i32, maximum: i32) -> i32 {
        let value = (self * (maximum as f32 - minimum as f32) + minimum as f32) as i32;

        value.max(minimum).min(maximum)
    }

    fn as_scaled_value(self, maximum: f32) -> f32 {
        self.as_range(0.0, maximum)
    }

    fn as_scaled_i32(self, maximum: i32) -> i32 {
        self.as_range_i32(0, maximum)
    }

    fn with_calibration(self, calibrated_maximum: f32) -> f32 {
        self / calibrated_maximum
    }

    fn normalize(self, maximum: f32) -> f32 {
        self / maximum
    }
}

/// Clamps `value` into `minimum..=maximum`. Never returns NaN, and
/// does not panic on inverted bounds (the lower bound wins).
pub(crate) fn clamp(value: f32, minimum: f32, maximum: f32) -> f32 {
    value.min(maximum).max(minimum)
}
