use std::time::Duration;
use thiserror::Error;

/// The number of calibration points supplied does not match what the
/// calibration strategy requires.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("too few calibration points: {supplied} supplied, {required} required")]
    TooFewPoints { required: usize, supplied: usize },

    #[error("too many calibration points: {supplied} supplied, {required} required")]
    TooManyPoints { required: usize, supplied: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Two or more points share an x value, so no curve passes through
    /// all of them.
    #[error("calibration points are degenerate (denominator {denominator})")]
    Degenerate { denominator: f64 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StabilityError {
    #[error("no readings have been collected")]
    InsufficientSamples,

    #[error("reading range is empty, inverted or unbounded: minimum {minimum}, maximum {maximum}")]
    DegenerateRange { minimum: f64, maximum: f64 },

    /// The readings are too far apart to score in `f64`.
    #[error("stability score is not finite")]
    NonFiniteScore,

    #[error("sample size must be at least 1")]
    ZeroSampleSize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel id {0} is out of range (0-7)")]
    InvalidId(u8),

    #[error("raw value {0} is out of range (0-1023)")]
    RawOutOfRange(u16),
}

/// Errors raised by a [`ChannelReader`](crate::ChannelReader).
///
/// `E` is the error type of the underlying bus.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError<E> {
    #[error("device initialization failed: {0:?}")]
    Init(E),

    #[error("the device has already been initialized")]
    AlreadyInitialized,

    #[error("the device has not been initialized or it has been disposed")]
    NotInitialized,

    #[error("no conversion within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("bus error: {0:?}")]
    Bus(E),
}

/// Bus-level failures of the MCP3008 driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BusError<S, P> {
    #[error("SPI transfer failed: {0:?}")]
    Spi(S),

    #[error("chip select failed: {0:?}")]
    ChipSelect(P),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum WizardError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("reference value count {supplied} does not match the {required} points required")]
    ReferenceCount { required: usize, supplied: usize },

    #[error("reading has not stabilized")]
    NotStable,
}

impl From<ConfigurationError> for WizardError {
    fn from(error: ConfigurationError) -> Self {
        WizardError::Calibration(error.into())
    }
}
