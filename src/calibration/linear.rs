use super::{check_distinct, CalibrationPoint};
use crate::error::CalibrationError;

/// `y = slope·x + offset` through two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    slope: f64,
    offset: f64,
}

impl Linear {
    pub const REQUIRED_POINTS: usize = 2;

    pub fn fit(points: &[CalibrationPoint; 2]) -> Result<Self, CalibrationError> {
        let [p0, p1] = points;
        let (x0, y0) = (p0.x as f64, p0.y as f64);
        let (x1, y1) = (p1.x as f64, p1.y as f64);

        let denominator = x1 - x0;
        check_distinct(&[x0, x1], denominator)?;
        let slope = (y1 - y0) / denominator;
        let offset = y0 - slope * x0;

        if !(slope.is_finite() && offset.is_finite()) {
            return Err(CalibrationError::Degenerate { denominator });
        }

        Ok(Self { slope, offset })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        (self.slope * x as f64 + self.offset) as f32
    }
}
