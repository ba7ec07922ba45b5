//! Step-by-step capture of calibration points.
//!
//! The operator sets the sensor up at each known reference value in
//! turn, waits for the reading to settle, and captures it. Once every
//! reference value has a reading the points are committed to a model in
//! one [`set_points`](crate::CalibrationModel::set_points) call.

use crate::calibration::{CalibrationModel, CalibrationPoint};
use crate::error::{ConfigurationError, WizardError};
use crate::stability::Readiness;
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationWizard {
    references: Vec<f32>,
    captured: Vec<CalibrationPoint>,
    require_ready: bool,
}

impl CalibrationWizard {
    /// Starts a wizard for `model` that will capture one reading at each
    /// of `references`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::{CalibrationModel, CalibrationPoint, CalibrationWizard};
    ///
    /// let mut model = CalibrationModel::quadratic(
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
    /// let mut wizard = CalibrationWizard::new(&model, &[4.0, 8.0, 12.0]).unwrap();
    ///
    /// assert_eq!(wizard.next_reference(), Some(4.0));
    /// wizard.capture(0.92).unwrap();
    /// wizard.capture(0.81).unwrap();
    /// wizard.capture(0.62).unwrap();
    /// assert!(wizard.is_complete());
    ///
    /// wizard.commit(&mut model).unwrap();
    /// assert_eq!(model.points()[2], CalibrationPoint::new(0.62, 12.0));
    /// ```
    pub fn new(model: &CalibrationModel, references: &[f32]) -> Result<Self, WizardError> {
        let required = model.required_points();

        if references.len() != required {
            return Err(WizardError::ReferenceCount {
                required,
                supplied: references.len(),
            });
        }

        Ok(Self {
            references: references.to_vec(),
            captured: Vec::with_capacity(required),
            require_ready: false,
        })
    }

    /// Only accept captures made through
    /// [`capture_when`](CalibrationWizard::capture_when) with a
    /// [`Readiness::Ready`] signal.
    pub fn require_ready(mut self) -> Self {
        self.require_ready = true;
        self
    }

    /// The reference value the next capture will be recorded against,
    /// or `None` once every point has been captured.
    pub fn next_reference(&self) -> Option<f32> {
        self.references.get(self.captured.len()).copied()
    }

    /// Zero-based index of the next capture.
    pub fn step(&self) -> usize {
        self.captured.len()
    }

    pub fn total_steps(&self) -> usize {
        self.references.len()
    }

    pub fn is_complete(&self) -> bool {
        self.captured.len() == self.references.len()
    }

    pub fn captured(&self) -> &[CalibrationPoint] {
        &self.captured
    }

    /// Records `x` as the reading at the next reference value.
    pub fn capture(&mut self, x: f32) -> Result<CalibrationPoint, WizardError> {
        if self.require_ready {
            return Err(WizardError::NotStable);
        }

        self.record(x)
    }

    /// Records `x` if `readiness` shows the signal has settled.
    pub fn capture_when(
        &mut self,
        x: f32,
        readiness: Readiness,
    ) -> Result<CalibrationPoint, WizardError> {
        if readiness != Readiness::Ready {
            return Err(WizardError::NotStable);
        }

        self.record(x)
    }

    fn record(&mut self, x: f32) -> Result<CalibrationPoint, WizardError> {
        let y = self.next_reference().ok_or(ConfigurationError::TooManyPoints {
            required: self.references.len(),
            supplied: self.captured.len() + 1,
        })?;

        let point = CalibrationPoint::new(x, y);
        self.captured.push(point);
        info!(
            "captured calibration point {} of {}: {:?}",
            self.captured.len(),
            self.references.len(),
            point
        );

        Ok(point)
    }

    /// Applies the captured points to `model`. The model is unchanged if
    /// the capture is incomplete or the points are degenerate.
    pub fn commit(&self, model: &mut CalibrationModel) -> Result<(), WizardError> {
        model.set_points(&self.captured)?;
        Ok(())
    }
}
