//! Persistence of calibration points and stability bounds.
//!
//! Values are stored as JSON under string keys. A stored value that no
//! longer decodes is logged and replaced by the caller's default.

use crate::calibration::{CalibrationModel, CalibrationPoint};
use crate::config::CalibrationConfig;
use crate::error::{CalibrationError, SettingsError, StabilityError};
use crate::stability::{Bounds, StabilityConfig, StabilityTracker};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CALIBRATION_POINTS_KEY: &str = "CalibrationPoints";
pub const STABILITY_BOUNDS_KEY: &str = "StabilityBounds";

/// A key-value store for settings.
pub trait SettingsStore {
    fn value(&self, key: &str) -> Option<Value>;

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Removes every stored value.
    fn reset_to_defaults(&mut self) -> Result<(), SettingsError>;

    /// Returns the value stored under `key`, or `default` if there is
    /// none or it cannot be decoded as `T`.
    fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.value(key) {
            Some(value) => match serde_json::from_value(value) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!("setting {:?} could not be decoded: {}. Using default.", key, err);
                    default
                }
            },
            None => default,
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), SettingsError> {
        self.set_value(key, serde_json::to_value(value)?)
    }
}

/// Settings held in memory for the life of the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        self.values.clear();
        Ok(())
    }
}

/// Settings kept in a single JSON object on disk. Every change rewrites
/// the file.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.insert(key.to_owned(), value);
        self.flush()
    }

    fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        self.values.clear();
        self.flush()
    }
}

/// Builds the calibration model from the saved points, or from the
/// configured defaults if none are saved.
///
/// Saved points that do not fit the configured curve are an error, not
/// a silent fallback; the sensor needs recalibrating.
pub fn load_calibration<S: SettingsStore>(
    store: &S,
    config: &CalibrationConfig,
) -> Result<CalibrationModel, CalibrationError> {
    let points: Vec<CalibrationPoint> = store.load(CALIBRATION_POINTS_KEY, config.points.clone());
    config.build_with(&points)
}

pub fn save_calibration<S: SettingsStore>(
    store: &mut S,
    model: &CalibrationModel,
) -> Result<(), SettingsError> {
    store.save(CALIBRATION_POINTS_KEY, model.points())
}

/// Builds a tracker whose bounds start from the saved auto-ranged
/// bounds, if any.
pub fn load_stability<S: SettingsStore>(
    store: &S,
    config: &StabilityConfig,
) -> Result<StabilityTracker, StabilityError> {
    let bounds = store.load(
        STABILITY_BOUNDS_KEY,
        Bounds {
            minimum: config.minimum_reading,
            maximum: config.maximum_reading,
        },
    );

    StabilityTracker::new(StabilityConfig {
        minimum_reading: bounds.minimum,
        maximum_reading: bounds.maximum,
        ..*config
    })
}

pub fn save_stability<S: SettingsStore>(
    store: &mut S,
    tracker: &StabilityTracker,
) -> Result<(), SettingsError> {
    store.save(STABILITY_BOUNDS_KEY, &tracker.bounds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use serde_json::json;

    #[test]
    fn load_returns_default_when_missing() {
        let store = MemoryStore::new();

        assert_eq!(store.load("missing", 42u32), 42);
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        store.save("value", &0.57f32).unwrap();

        assert_eq!(store.load("value", 0.0f32), 0.57);
    }

    #[test]
    fn undecodable_value_uses_default() {
        let mut store = MemoryStore::new();
        store.set_value("value", json!("not a number")).unwrap();

        assert_eq!(store.load("value", 1.5f32), 1.5);
    }

    #[test]
    fn reset_to_defaults_clears_values() {
        let mut store = MemoryStore::new();
        store.save("value", &1u8).unwrap();
        store.reset_to_defaults().unwrap();

        assert_eq!(store.value("value"), None);
    }

    #[test]
    fn calibration_uses_defaults_until_saved() {
        let mut store = MemoryStore::new();
        let config = CalibrationConfig::default();

        let model = load_calibration(&store, &config).unwrap();
        assert_eq!(model.points(), &config.points[..]);

        let mut recalibrated = model.clone();
        let points = [
            CalibrationPoint::new(0.95, 4.0),
            CalibrationPoint::new(0.85, 8.0),
            CalibrationPoint::new(0.65, 12.0),
        ];
        recalibrated.set_points(&points).unwrap();
        save_calibration(&mut store, &recalibrated).unwrap();

        assert_eq!(load_calibration(&store, &config).unwrap().points(), &points);
    }

    #[test]
    fn saved_points_with_wrong_count_are_an_error() {
        let mut store = MemoryStore::new();
        store
            .save(
                CALIBRATION_POINTS_KEY,
                &[
                    CalibrationPoint::new(0.9, 4.0),
                    CalibrationPoint::new(0.8, 8.0),
                    CalibrationPoint::new(0.6, 12.25),
                    CalibrationPoint::new(1.0, 0.0),
                ],
            )
            .unwrap();

        assert_eq!(
            load_calibration(&store, &CalibrationConfig::default()),
            Err(CalibrationError::Configuration(
                ConfigurationError::TooManyPoints {
                    required: 3,
                    supplied: 4
                }
            ))
        );
    }

    #[test]
    fn stability_bounds_round_trip() {
        let mut store = MemoryStore::new();
        let config = StabilityConfig::default();

        let tracker = load_stability(&store, &config).unwrap();
        tracker.add_reading(1.25);
        save_stability(&mut store, &tracker).unwrap();

        let restored = load_stability(&store, &config).unwrap();
        assert_eq!(
            restored.bounds(),
            Bounds {
                minimum: 0.0,
                maximum: 1.25
            }
        );
        assert!(restored.snapshot().is_empty());
    }

    #[test]
    fn stability_rejects_zero_sample_size() {
        let config = StabilityConfig {
            sample_size: 0,
            ..StabilityConfig::default()
        };

        assert!(matches!(
            load_stability(&MemoryStore::new(), &config),
            Err(StabilityError::ZeroSampleSize)
        ));
    }

    #[test]
    fn json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.value(CALIBRATION_POINTS_KEY), None);
        store.save("CalibratedMaximum", &0.57f32).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.load("CalibratedMaximum", 1.0f32), 0.57);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn json_file_store_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.save("key", &true).unwrap();
        store.reset_to_defaults().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.value("key"), None);
    }

    #[test]
    fn json_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(SettingsError::Json(_))
        ));
    }
}
