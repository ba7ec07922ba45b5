//! Calibration curves mapping a normalized reading to a physical value.
//!
//! A [`CalibrationModel`] owns its reference points together with the
//! coefficients fitted through them. The two are only ever replaced
//! together by [`set_points`](CalibrationModel::set_points), which
//! validates the point count and refits before anything is stored.

mod linear;
mod quadratic;

pub use linear::Linear;
pub use quadratic::Quadratic;

use crate::error::{CalibrationError, ConfigurationError};
use crate::scale::clamp;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// A reference pair: the reading `x` observed at the physical value `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationPoint {
    #[serde(rename = "X")]
    pub x: f32,
    #[serde(rename = "Y")]
    pub y: f32,
}

impl CalibrationPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The calibration strategies available to a [`CalibrationModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationKind {
    Linear,
    Quadratic,
}

impl CalibrationKind {
    /// The exact number of points the strategy is fitted from.
    pub fn required_points(&self) -> usize {
        match self {
            CalibrationKind::Linear => Linear::REQUIRED_POINTS,
            CalibrationKind::Quadratic => Quadratic::REQUIRED_POINTS,
        }
    }

    fn fit(&self, points: &[CalibrationPoint]) -> Result<Curve, CalibrationError> {
        validate_count(self.required_points(), points.len())?;

        match self {
            CalibrationKind::Linear => Ok(Curve::Linear(Linear::fit(&[points[0], points[1]])?)),
            CalibrationKind::Quadratic => Ok(Curve::Quadratic(Quadratic::fit(&[
                points[0], points[1], points[2],
            ])?)),
        }
    }
}

/// A fitted curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear(Linear),
    Quadratic(Quadratic),
}

impl Curve {
    pub fn kind(&self) -> CalibrationKind {
        match self {
            Curve::Linear(_) => CalibrationKind::Linear,
            Curve::Quadratic(_) => CalibrationKind::Quadratic,
        }
    }

    /// Evaluates the curve at `x` without clamping.
    pub fn evaluate(&self, x: f32) -> f32 {
        match self {
            Curve::Linear(line) => line.evaluate(x),
            Curve::Quadratic(curve) => curve.evaluate(x),
        }
    }
}

/// A calibration curve together with the points it was fitted from and
/// the bounds its output is clamped to.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationModel {
    minimum: f32,
    maximum: f32,
    points: Vec<CalibrationPoint>,
    curve: Curve,
}

impl CalibrationModel {
    /// Returns a model of the given kind fitted through `points`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::{CalibrationKind, CalibrationModel, CalibrationPoint};
    ///
    /// let model = CalibrationModel::new(
    ///     CalibrationKind::Quadratic,
    ///     0.0,
    ///     12.5,
    ///     &[
    ///         CalibrationPoint::new(0.9, 4.0),
    ///         CalibrationPoint::new(0.8, 8.0),
    ///         CalibrationPoint::new(0.6, 12.25),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert!((model.adjusted_reading(0.8) - 8.0).abs() < 1e-4);
    /// // The curve dips below zero past the driest point; the output is
    /// // clamped to the bounds.
    /// assert_eq!(model.adjusted_reading(1.0), 0.0);
    /// ```
    pub fn new(
        kind: CalibrationKind,
        minimum: f32,
        maximum: f32,
        points: &[CalibrationPoint],
    ) -> Result<Self, CalibrationError> {
        let curve = fit(kind, points)?;

        Ok(Self {
            minimum,
            maximum,
            points: points.to_vec(),
            curve,
        })
    }

    pub fn quadratic(
        minimum: f32,
        maximum: f32,
        points: &[CalibrationPoint],
    ) -> Result<Self, CalibrationError> {
        Self::new(CalibrationKind::Quadratic, minimum, maximum, points)
    }

    pub fn linear(
        minimum: f32,
        maximum: f32,
        points: &[CalibrationPoint],
    ) -> Result<Self, CalibrationError> {
        Self::new(CalibrationKind::Linear, minimum, maximum, points)
    }

    pub fn kind(&self) -> CalibrationKind {
        self.curve.kind()
    }

    pub fn required_points(&self) -> usize {
        self.kind().required_points()
    }

    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Replaces the calibration points and refits the curve.
    ///
    /// On error the model is left exactly as it was.
    pub fn set_points(&mut self, points: &[CalibrationPoint]) -> Result<(), CalibrationError> {
        let curve = fit(self.kind(), points)?;

        self.points = points.to_vec();
        self.curve = curve;

        Ok(())
    }

    /// Evaluates the curve at `x` and clamps the result to
    /// `minimum..=maximum`.
    pub fn adjusted_reading(&self, x: f32) -> f32 {
        clamp(self.curve.evaluate(x), self.minimum, self.maximum)
    }
}

fn fit(kind: CalibrationKind, points: &[CalibrationPoint]) -> Result<Curve, CalibrationError> {
    match kind.fit(points) {
        Ok(curve) => {
            debug!("fitted {:?} calibration through {:?}: {:?}", kind, points, curve);
            Ok(curve)
        }
        Err(error) => {
            warn!("rejected {:?} calibration through {:?}: {}", kind, points, error);
            Err(error)
        }
    }
}

fn validate_count(required: usize, supplied: usize) -> Result<(), ConfigurationError> {
    if supplied < required {
        Err(ConfigurationError::TooFewPoints { required, supplied })
    } else if supplied > required {
        Err(ConfigurationError::TooManyPoints { required, supplied })
    } else {
        Ok(())
    }
}

/// Fails if any two of `xs` coincide, relative to their magnitude.
///
/// `denominator` is the fit's denominator, reported in the error.
fn check_distinct(xs: &[f64], denominator: f64) -> Result<(), CalibrationError> {
    for (index, &first) in xs.iter().enumerate() {
        for &second in &xs[index + 1..] {
            let tolerance = f64::EPSILON * first.abs().max(second.abs()).max(1.0);

            if (first - second).abs() <= tolerance {
                return Err(CalibrationError::Degenerate { denominator });
            }
        }
    }

    Ok(())
}

/// A [`CalibrationModel`] shared between a sampling context and its
/// readers.
///
/// Recalibration and evaluation each take the lock once, so a reader
/// never sees new points with old coefficients.
#[derive(Debug)]
pub struct SharedCalibration {
    model: Mutex<CalibrationModel>,
}

impl SharedCalibration {
    pub fn new(model: CalibrationModel) -> Self {
        Self {
            model: Mutex::new(model),
        }
    }

    pub fn set_points(&self, points: &[CalibrationPoint]) -> Result<(), CalibrationError> {
        self.lock().set_points(points)
    }

    pub fn adjusted_reading(&self, x: f32) -> f32 {
        self.lock().adjusted_reading(x)
    }

    /// Returns a copy of the current model.
    pub fn snapshot(&self) -> CalibrationModel {
        self.lock().clone()
    }

    pub fn into_inner(self) -> CalibrationModel {
        self.model.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // A model is only ever replaced whole, so a poisoned lock still
    // guards a consistent value.
    fn lock(&self) -> std::sync::MutexGuard<'_, CalibrationModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
