use super::{check_distinct, CalibrationPoint};
use crate::error::CalibrationError;

/// `y = a·x² + b·x + c` passing exactly through three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    a: f64,
    b: f64,
    c: f64,
}

impl Quadratic {
    pub const REQUIRED_POINTS: usize = 3;

    /// Fits the curve through `points`, which must hold exactly three
    /// points with distinct x values.
    pub fn fit(points: &[CalibrationPoint; 3]) -> Result<Self, CalibrationError> {
        let [p1, p2, p3] = points;
        let (x1, y1) = (p1.x as f64, p1.y as f64);
        let (x2, y2) = (p2.x as f64, p2.y as f64);
        let (x3, y3) = (p3.x as f64, p3.y as f64);

        let denominator = (x1 - x2) * (x1 - x3) * (x2 - x3);
        check_distinct(&[x1, x2, x3], denominator)?;

        let a = (x3 * (y2 - y1) + x2 * (y1 - y3) + x1 * (y3 - y2)) / denominator;
        let b = (x3 * x3 * (y1 - y2) + x2 * x2 * (y3 - y1) + x1 * x1 * (y2 - y3)) / denominator;
        let c = (x2 * x3 * (x2 - x3) * y1 + x3 * x1 * (x3 - x1) * y2 + x1 * x2 * (x1 - x2) * y3)
            / denominator;

        // Non-finite inputs slip past the distinctness check.
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(CalibrationError::Degenerate { denominator });
        }

        Ok(Self { a, b, c })
    }

    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    /// Evaluates the curve at `x` without clamping.
    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x as f64;

        (self.a * x * x + self.b * x + self.c) as f32
    }
}
