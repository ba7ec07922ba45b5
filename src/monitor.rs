use crate::device::ChannelReader;
use crate::error::{DeviceError, StabilityError};
use crate::sensor::{CalibratedInput, InputSample};
use crate::stability::{Readiness, StabilityTracker};
use std::time::Duration;

/// The result of one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub sample: InputSample,
    pub stability: Result<f64, StabilityError>,
    /// Present whenever `stability` is `Ok`.
    pub readiness: Option<Readiness>,
}

impl Measurement {
    pub fn is_ready(&self) -> bool {
        self.readiness == Some(Readiness::Ready)
    }
}

/// Samples one calibrated input and tracks how settled it is.
///
/// Call [`tick`](Monitor::tick) at the sampling interval. The tracker is
/// fed the curve input `x`, not the calibrated value, so its bounds are
/// in reading units.
#[derive(Debug)]
pub struct Monitor {
    input: CalibratedInput,
    tracker: StabilityTracker,
}

impl Monitor {
    pub fn new(input: CalibratedInput, tracker: StabilityTracker) -> Self {
        Self { input, tracker }
    }

    pub fn input(&self) -> &CalibratedInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut CalibratedInput {
        &mut self.input
    }

    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    pub fn tick<R>(
        &mut self,
        reader: &mut R,
        timeout: Duration,
    ) -> Result<Measurement, DeviceError<R::Error>>
    where
        R: ChannelReader + ?Sized,
    {
        let sample = self.input.read(reader, timeout)?;
        self.tracker.add_reading(sample.x as f64);

        let stability = self.tracker.stability();
        let readiness = stability
            .ok()
            .map(|value| self.tracker.thresholds().classify(value));

        Ok(Measurement {
            sample,
            stability,
            readiness,
        })
    }

    pub fn into_parts(self) -> (CalibratedInput, StabilityTracker) {
        (self.input, self.tracker)
    }
}
