//! Calibration curves and stability detection for the MCP3008 8-channel,
//! 10-bit analog-to-digital converter.
//!
//! Raw conversion codes become [`Reading`]s, which normalize to a
//! fraction of full scale. A [`CalibrationModel`] maps a normalized value
//! to a physical one through a curve fitted from reference points, and a
//! [`StabilityTracker`] scores a window of recent values to tell when a
//! noisy signal can be trusted.
//!
//! # Examples
//!
//! ```
//! use adc_calibrator::{
//!     CalibrationModel, CalibrationPoint, Reading, Readiness, StabilityConfig, StabilityTracker,
//! };
//!
//! let depth = CalibrationModel::quadratic(
//!     0.0,
//!     12.5,
//!     &[
//!         CalibrationPoint::new(0.9, 4.0),
//!         CalibrationPoint::new(0.8, 8.0),
//!         CalibrationPoint::new(0.6, 12.25),
//!     ],
//! )
//! .unwrap();
//!
//! let tracker = StabilityTracker::new(StabilityConfig::default()).unwrap();
//!
//! for raw in [819, 820, 819, 819, 818, 819, 820, 819, 819, 819] {
//!     let x = Reading::new(raw).unwrap().normalized();
//!     tracker.add_reading(x as f64);
//! }
//!
//! let reading = Reading::new(819).unwrap();
//! let inches = depth.adjusted_reading(reading.normalized());
//!
//! assert!((inches - 8.0).abs() < 0.05);
//! assert_eq!(tracker.readiness(), Ok(Readiness::Ready));
//! ```

mod calibration;
mod channel;
mod config;
mod device;
mod error;
mod mcp3008;
mod monitor;
mod reading;
mod scale;
mod sensor;
mod stability;
mod wizard;

pub mod settings;

pub use calibration::{
    CalibrationKind, CalibrationModel, CalibrationPoint, Curve, Linear, Quadratic,
    SharedCalibration,
};
pub use channel::{Channel, InputConfiguration};
pub use config::{CalibrationConfig, Config, SamplingConfig};
pub use device::{read_blocking, ChannelReader};
pub use error::{
    BusError, CalibrationError, ChannelError, ConfigurationError, DeviceError, SettingsError,
    StabilityError, WizardError,
};
pub use mcp3008::Mcp3008;
pub use monitor::{Measurement, Monitor};
pub use reading::Reading;
pub use scale::Scale;
pub use sensor::{CalibratedInput, InputSample};
pub use stability::{
    Bounds, Readiness, ReadinessThresholds, StabilityConfig, StabilityTracker, StabilityWindow,
    WindowEntry,
};
pub use wizard::CalibrationWizard;
