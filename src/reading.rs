use crate::error::ChannelError;
use crate::scale::Scale;

/// A single conversion result from a 10-bit converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reading {
    raw: u16,
}

impl Reading {
    /// The largest code a 10-bit converter produces.
    pub const MAX_RAW: u16 = 1023;

    /// The divisor used by [`normalized`](Reading::normalized). It is one
    /// past [`MAX_RAW`](Reading::MAX_RAW), so a full-scale code
    /// normalizes to `1023 / 1024`, never to `1.0`.
    pub const FULL_SCALE: f32 = 1024.0;

    pub fn new(raw: u16) -> Result<Self, ChannelError> {
        if raw > Self::MAX_RAW {
            return Err(ChannelError::RawOutOfRange(raw));
        }

        Ok(Self { raw })
    }

    /// Builds a reading from the low ten bits of `raw`.
    pub(crate) fn from_masked(raw: u16) -> Self {
        Self {
            raw: raw & Self::MAX_RAW,
        }
    }

    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Returns the reading as a fraction of full scale.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::Reading;
    ///
    /// assert_eq!(Reading::new(512).unwrap().normalized(), 0.5);
    /// assert!(Reading::new(1023).unwrap().normalized() < 1.0);
    /// ```
    pub fn normalized(&self) -> f32 {
        self.raw as f32 / Self::FULL_SCALE
    }

    pub fn as_scaled_value(&self, maximum: f32) -> f32 {
        self.normalized().as_scaled_value(maximum)
    }

    pub fn as_scaled_i32(&self, maximum: i32) -> i32 {
        self.normalized().as_scaled_i32(maximum)
    }

    pub fn as_range(&self, minimum: f32, maximum: f32) -> f32 {
        self.normalized().as_range(minimum, maximum)
    }

    pub fn as_range_i32(&self, minimum: i32, maximum: i32) -> i32 {
        self.normalized().as_range_i32(minimum, maximum)
    }

    /// Single-point full-scale calibration: divides the normalized value
    /// by the normalized value the sensor reports when saturated.
    pub fn with_calibration(&self, calibrated_maximum: f32) -> f32 {
        self.normalized().with_calibration(calibrated_maximum)
    }
}

impl TryFrom<u16> for Reading {
    type Error = ChannelError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Reading> for f32 {
    fn from(reading: Reading) -> f32 {
        reading.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(raw: u16) -> Reading {
        Reading::new(raw).unwrap()
    }

    #[test]
    fn rejects_codes_above_ten_bits() {
        assert!(Reading::new(1023).is_ok());
        assert_eq!(Reading::new(1024), Err(ChannelError::RawOutOfRange(1024)));
    }

    #[test]
    fn masks_to_ten_bits() {
        assert_eq!(Reading::from_masked(0xffff).raw(), 1023);
        assert_eq!(Reading::from_masked(0x0400).raw(), 0);
    }

    #[test]
    fn normalized() {
        assert_eq!(reading(0).normalized(), 0.0);
        assert_eq!(reading(512).normalized(), 0.5);
        assert!((reading(1023).normalized() - 0.999_023).abs() < 1e-6);
        assert!(reading(1023).normalized() < 1.0);
    }

    #[test]
    fn scaling() {
        assert_eq!(reading(512).as_scaled_value(3.3), 1.65);
        assert_eq!(reading(256).as_range(10.0, 14.0), 11.0);
        assert_eq!(reading(512).as_range_i32(0, 360), 180);
        assert_eq!(reading(1023).as_scaled_i32(100), 99);
    }

    #[test]
    fn with_calibration() {
        assert_eq!(reading(256).with_calibration(0.5), 0.5);
    }

    #[test]
    fn converts_to_normalized_f32() {
        let value: f32 = reading(768).into();
        assert_eq!(value, 0.75);
    }
}
