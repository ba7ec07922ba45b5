//! Configuration loaded from JSON.
//!
//! Every section has defaults, so a missing file or a file that only
//! sets a few fields still yields a complete [`Config`].

use crate::calibration::{CalibrationKind, CalibrationModel, CalibrationPoint};
use crate::error::CalibrationError;
use crate::stability::StabilityConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calibration: CalibrationConfig,
    pub stability: StabilityConfig,
    pub sampling: SamplingConfig,
}

/// The curve used when no calibration has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub kind: CalibrationKind,
    pub minimum: f32,
    pub maximum: f32,
    pub points: Vec<CalibrationPoint>,
}

impl Default for CalibrationConfig {
    /// A depth sensor reading 0 to 12.5 inches.
    fn default() -> Self {
        Self {
            kind: CalibrationKind::Quadratic,
            minimum: 0.0,
            maximum: 12.5,
            points: vec![
                CalibrationPoint::new(0.9, 4.0),
                CalibrationPoint::new(0.8, 8.0),
                CalibrationPoint::new(0.6, 12.25),
            ],
        }
    }
}

impl CalibrationConfig {
    pub fn build(&self) -> Result<CalibrationModel, CalibrationError> {
        self.build_with(&self.points)
    }

    /// Builds a model with these bounds but different points.
    pub fn build_with(
        &self,
        points: &[CalibrationPoint],
    ) -> Result<CalibrationModel, CalibrationError> {
        CalibrationModel::new(self.kind, self.minimum, self.maximum, points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Time between sampling ticks (ms)
    pub interval_ms: u64,
    /// Longest wait for a single conversion (ms)
    pub read_timeout_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            read_timeout_ms: 100,
        }
    }
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Loads configuration from a JSON file, falling back to the
    /// defaults if the file cannot be read or parsed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "failed to parse configuration {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "failed to read configuration {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
