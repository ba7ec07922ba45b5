use crate::calibration::CalibrationModel;
use crate::channel::Channel;
use crate::device::{read_blocking, ChannelReader};
use crate::error::DeviceError;
use crate::reading::Reading;
use std::time::Duration;

/// One calibrated read of a [`CalibratedInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub reading: Reading,
    pub reference: Option<Reading>,
    /// The value fed to the calibration curve: the normalized reading,
    /// or its ratio to the reference reading.
    pub x: f32,
    /// The calibrated physical value.
    pub value: f32,
}

/// A sensing channel, an optional reference channel, and the calibration
/// curve that turns their readings into a physical value.
///
/// With a reference channel the curve input is `sensor / reference`,
/// capped at `1.0`, which compensates for drift that affects both
/// (such as a resistive sensor's temperature coefficient).
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedInput {
    channel: Channel,
    reference: Option<Channel>,
    model: CalibrationModel,
}

impl CalibratedInput {
    /// Returns an input that evaluates `model` at the normalized reading
    /// of `channel`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::{CalibratedInput, CalibrationModel, CalibrationPoint, Channel};
    ///
    /// let model = CalibrationModel::linear(
    ///     0.0,
    ///     3.3,
    ///     &[CalibrationPoint::new(0.0, 0.0), CalibrationPoint::new(1.0, 3.3)],
    /// )
    /// .unwrap();
    ///
    /// let input = CalibratedInput::new(Channel::SINGLE[2], model);
    /// assert_eq!(input.max_value(), 3.3);
    /// ```
    pub fn new(channel: Channel, model: CalibrationModel) -> Self {
        Self {
            channel,
            reference: None,
            model,
        }
    }

    /// Returns an input whose curve is evaluated at the ratio of
    /// `channel` to `reference`.
    pub fn with_reference(channel: Channel, reference: Channel, model: CalibrationModel) -> Self {
        Self {
            channel,
            reference: Some(reference),
            model,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn reference(&self) -> Option<Channel> {
        self.reference
    }

    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    /// Gives access to the model for recalibration.
    pub fn model_mut(&mut self) -> &mut CalibrationModel {
        &mut self.model
    }

    /// Reads the reference channel (if any) and then the sensing channel,
    /// waiting at most `timeout` for each conversion.
    pub fn read<R>(
        &self,
        reader: &mut R,
        timeout: Duration,
    ) -> Result<InputSample, DeviceError<R::Error>>
    where
        R: ChannelReader + ?Sized,
    {
        let reference = match self.reference {
            Some(channel) => Some(read_blocking(reader, channel, timeout)?),
            None => None,
        };
        let reading = read_blocking(reader, self.channel, timeout)?;

        Ok(self.evaluate(reading, reference))
    }

    /// Calibrates readings that have already been taken.
    pub fn evaluate(&self, reading: Reading, reference: Option<Reading>) -> InputSample {
        let x = match reference {
            Some(reference) => ratio(reading, reference),
            None => reading.normalized(),
        };

        InputSample {
            reading,
            reference,
            x,
            value: self.model.adjusted_reading(x),
        }
    }

    /// Returns the smallest value that can be returned by
    /// [`read`](CalibratedInput::read).
    pub fn min_value(&self) -> f32 {
        self.model.minimum()
    }

    /// Returns the largest value that can be returned by
    /// [`read`](CalibratedInput::read).
    pub fn max_value(&self) -> f32 {
        self.model.maximum()
    }
}

/// `reading / reference`, capped at `1.0`. A zero reference counts as
/// saturated.
fn ratio(reading: Reading, reference: Reading) -> f32 {
    if reference.raw() == 0 {
        return 1.0;
    }

    (reading.normalized() / reference.normalized()).min(1.0)
}
