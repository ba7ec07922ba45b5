//! Detects when a noisy signal has settled.
//!
//! A [`StabilityTracker`] keeps the most recent readings in a bounded
//! window and scores them with an inverted coefficient of variation. A
//! score of `1.0` means every reading in the window is identical.

use crate::error::StabilityError;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// A reading and the moment it was added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEntry {
    pub timestamp: Instant,
    pub value: f64,
}

/// A fixed-capacity, oldest-first queue of readings.
///
/// Pushing onto a full window evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityWindow {
    entries: VecDeque<WindowEntry>,
    capacity: usize,
}

impl StabilityWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, entry: WindowEntry) {
        self.entries.push_back(entry);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of the entries, oldest first.
    pub fn snapshot(&self) -> Vec<WindowEntry> {
        self.entries.iter().copied().collect()
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|entry| entry.value)
    }
}

/// How far a signal has settled, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    NotReady,
    Stabilizing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessThresholds {
    /// Scores below this are [`Readiness::NotReady`].
    pub unstable_below: f64,
    /// Scores above this are [`Readiness::Ready`].
    pub ready_above: f64,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            unstable_below: 0.85,
            ready_above: 0.95,
        }
    }
}

impl ReadinessThresholds {
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::{Readiness, ReadinessThresholds};
    ///
    /// let thresholds = ReadinessThresholds::default();
    ///
    /// assert_eq!(thresholds.classify(0.5), Readiness::NotReady);
    /// assert_eq!(thresholds.classify(0.9), Readiness::Stabilizing);
    /// assert_eq!(thresholds.classify(0.99), Readiness::Ready);
    /// ```
    pub fn classify(&self, stability: f64) -> Readiness {
        if stability > self.ready_above {
            Readiness::Ready
        } else if stability >= self.unstable_below {
            Readiness::Stabilizing
        } else {
            Readiness::NotReady
        }
    }
}

/// Construction parameters for a [`StabilityTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub minimum_reading: f64,
    pub maximum_reading: f64,
    /// Widen the bounds whenever a reading falls outside them.
    pub auto_range: bool,
    pub sample_size: usize,
    pub thresholds: ReadinessThresholds,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            minimum_reading: 0.0,
            maximum_reading: 1.0,
            auto_range: true,
            sample_size: 10,
            thresholds: ReadinessThresholds::default(),
        }
    }
}

/// The lower and upper reading bounds a tracker normalizes against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub minimum: f64,
    pub maximum: f64,
}

impl Bounds {
    pub fn range(&self) -> f64 {
        self.maximum - self.minimum
    }

    fn include(&mut self, value: f64) {
        if value < self.minimum {
            self.minimum = value;
        }

        if value > self.maximum {
            self.maximum = value;
        }
    }
}

#[derive(Debug)]
struct State {
    bounds: Bounds,
    window: StabilityWindow,
}

/// Scores the settledness of a rolling window of readings.
///
/// All operations take `&self`; the bounds and window share one lock,
/// so a score is never computed from a window in the middle of an
/// eviction.
///
/// # Examples
///
/// ```
/// use adc_calibrator::{StabilityConfig, StabilityTracker};
///
/// let tracker = StabilityTracker::new(StabilityConfig {
///     sample_size: 3,
///     ..StabilityConfig::default()
/// })
/// .unwrap();
///
/// for _ in 0..3 {
///     tracker.add_reading(0.5);
/// }
///
/// assert_eq!(tracker.stability(), Ok(1.0));
/// ```
#[derive(Debug)]
pub struct StabilityTracker {
    auto_range: bool,
    thresholds: ReadinessThresholds,
    state: Mutex<State>,
}

impl StabilityTracker {
    /// Fails with [`StabilityError::ZeroSampleSize`] if the window could
    /// never hold a reading.
    pub fn new(config: StabilityConfig) -> Result<Self, StabilityError> {
        if config.sample_size == 0 {
            return Err(StabilityError::ZeroSampleSize);
        }

        Ok(Self {
            auto_range: config.auto_range,
            thresholds: config.thresholds,
            state: Mutex::new(State {
                bounds: Bounds {
                    minimum: config.minimum_reading,
                    maximum: config.maximum_reading,
                },
                window: StabilityWindow::new(config.sample_size),
            }),
        })
    }

    pub fn auto_range(&self) -> bool {
        self.auto_range
    }

    pub fn thresholds(&self) -> ReadinessThresholds {
        self.thresholds
    }

    pub fn sample_size(&self) -> usize {
        self.lock().window.capacity()
    }

    /// The current bounds, including any widening from auto-ranging.
    pub fn bounds(&self) -> Bounds {
        self.lock().bounds
    }

    /// Returns a copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<WindowEntry> {
        self.lock().window.snapshot()
    }

    pub fn add_reading(&self, value: f64) {
        self.add_reading_at(value, Instant::now());
    }

    /// Adds a reading to the window. Non-finite readings are dropped, so
    /// they never widen the bounds or reach the score.
    pub fn add_reading_at(&self, value: f64, timestamp: Instant) {
        if !value.is_finite() {
            warn!("ignoring non-finite stability reading {}", value);
            return;
        }

        let mut state = self.lock();

        if self.auto_range {
            state.bounds.include(value);
        }

        state.window.push(WindowEntry { timestamp, value });
        trace!(
            "stability window: {} of {} readings",
            state.window.len(),
            state.window.capacity()
        );
    }

    /// Returns `1 - σ/μ` of the readings' normalized distances from the
    /// maximum reading, where σ is the population standard deviation.
    ///
    /// A window whose readings all sit on the maximum scores `1.0`.
    pub fn stability(&self) -> Result<f64, StabilityError> {
        let state = self.lock();
        score(&state.bounds, &state.window)
    }

    pub fn readiness(&self) -> Result<Readiness, StabilityError> {
        Ok(self.thresholds.classify(self.stability()?))
    }

    // The state is only ever mutated through complete `push`/`include`
    // calls, so a poisoned lock still guards a usable window.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn score(bounds: &Bounds, window: &StabilityWindow) -> Result<f64, StabilityError> {
    let range = bounds.range();

    if !range.is_finite() || range <= 0.0 {
        return Err(StabilityError::DegenerateRange {
            minimum: bounds.minimum,
            maximum: bounds.maximum,
        });
    }

    if window.is_empty() {
        return Err(StabilityError::InsufficientSamples);
    }

    let normalized: Vec<f64> = window
        .values()
        .map(|value| (bounds.maximum - value).abs() / range)
        .collect();
    let count = normalized.len() as f64;

    // Accumulating offsets from the first value keeps the mean exact
    // when every value is identical.
    let first = normalized[0];
    let mean = first + normalized.iter().map(|n| n - first).sum::<f64>() / count;
    let variance = normalized.iter().map(|n| (n - mean) * (n - mean)).sum::<f64>() / count;
    let deviation = variance.sqrt();

    let variation = if mean == 0.0 { 0.0 } else { deviation / mean };
    let stability = 1.0 - variation;

    if !stability.is_finite() {
        return Err(StabilityError::NonFiniteScore);
    }

    Ok(stability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn tracker(
        minimum: f64,
        maximum: f64,
        auto_range: bool,
        sample_size: usize,
    ) -> StabilityTracker {
        StabilityTracker::new(StabilityConfig {
            minimum_reading: minimum,
            maximum_reading: maximum,
            auto_range,
            sample_size,
            ..StabilityConfig::default()
        })
        .unwrap()
    }

    fn values(tracker: &StabilityTracker) -> Vec<f64> {
        tracker.snapshot().iter().map(|entry| entry.value).collect()
    }

    #[test]
    fn window_keeps_most_recent_readings() {
        let tracker = tracker(0.0, 100.0, false, 4);

        for value in 0..10 {
            tracker.add_reading(value as f64);
        }

        assert_eq!(values(&tracker), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn window_preserves_arrival_order() {
        let tracker = tracker(0.0, 1.0, false, 10);
        let start = Instant::now();

        for value in [0.3, 0.1, 0.2] {
            tracker.add_reading(value);
        }

        let snapshot = tracker.snapshot();
        assert_eq!(values(&tracker), vec![0.3, 0.1, 0.2]);
        assert!(snapshot.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(snapshot[0].timestamp >= start);
    }

    #[test]
    fn constant_readings_are_perfectly_stable() {
        for value in [0.5, 0.1, 0.37, 0.999, 0.0] {
            let tracker = tracker(0.0, 1.0, true, 10);

            for _ in 0..10 {
                tracker.add_reading(value);
            }

            assert_eq!(tracker.stability(), Ok(1.0), "value {}", value);
        }
    }

    #[test]
    fn half_scale_scenario() {
        let tracker = tracker(0.0, 1.0, false, 3);

        for value in [0.5, 0.5, 0.5] {
            tracker.add_reading(value);
        }

        assert_eq!(tracker.stability(), Ok(1.0));
        assert_eq!(tracker.readiness(), Ok(Readiness::Ready));
    }

    #[test]
    fn readings_at_maximum_are_stable() {
        let tracker = tracker(0.0, 1.0, false, 3);

        tracker.add_reading(1.0);
        tracker.add_reading(1.0);

        assert_eq!(tracker.stability(), Ok(1.0));
    }

    #[test]
    fn scores_spread_readings() {
        // Distances from the maximum: 0.75 and 0.25, mean 0.5, deviation 0.25.
        let tracker = tracker(0.0, 1.0, false, 2);

        tracker.add_reading(0.25);
        tracker.add_reading(0.75);

        assert_eq!(tracker.stability(), Ok(0.5));
        assert_eq!(tracker.readiness(), Ok(Readiness::NotReady));
    }

    #[test]
    fn empty_window() {
        assert_eq!(
            tracker(0.0, 1.0, true, 10).stability(),
            Err(StabilityError::InsufficientSamples)
        );
    }

    #[test]
    fn degenerate_range() {
        let tracker = tracker(0.5, 0.5, false, 10);
        tracker.add_reading(0.5);

        assert_eq!(
            tracker.stability(),
            Err(StabilityError::DegenerateRange {
                minimum: 0.5,
                maximum: 0.5
            })
        );
    }

    #[test]
    fn degenerate_range_is_reported_before_empty_window() {
        assert!(matches!(
            tracker(1.0, 0.0, false, 10).stability(),
            Err(StabilityError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn auto_range_widens_bounds() {
        let tracker = tracker(0.0, 1.0, true, 10);

        tracker.add_reading(1.5);
        tracker.add_reading(-0.5);
        tracker.add_reading(0.5);

        assert_eq!(
            tracker.bounds(),
            Bounds {
                minimum: -0.5,
                maximum: 1.5
            }
        );
    }

    #[test]
    fn fixed_range_keeps_bounds() {
        let tracker = tracker(0.0, 1.0, false, 10);

        tracker.add_reading(1.5);

        assert_eq!(
            tracker.bounds(),
            Bounds {
                minimum: 0.0,
                maximum: 1.0
            }
        );
    }

    #[test]
    fn non_finite_readings_are_ignored() {
        let tracker = tracker(0.0, 1.0, true, 10);

        tracker.add_reading(0.5);
        tracker.add_reading(f64::NAN);
        tracker.add_reading(f64::INFINITY);
        tracker.add_reading(f64::NEG_INFINITY);

        assert_eq!(values(&tracker), vec![0.5]);
        assert_eq!(
            tracker.bounds(),
            Bounds {
                minimum: 0.0,
                maximum: 1.0
            }
        );
        assert_eq!(tracker.stability(), Ok(1.0));
    }

    #[test]
    fn unbounded_range_is_degenerate() {
        let tracker = tracker(0.0, f64::INFINITY, false, 10);
        tracker.add_reading(0.5);

        assert!(matches!(
            tracker.stability(),
            Err(StabilityError::DegenerateRange { .. })
        ));
        assert!(tracker.readiness().is_err());
    }

    #[test]
    fn overflowing_score_is_an_error() {
        // Outside fixed bounds, a distance of f64::MAX squares to infinity.
        let tracker = tracker(0.0, 1.0, false, 2);

        tracker.add_reading(-f64::MAX);
        tracker.add_reading(1.0);

        assert_eq!(tracker.stability(), Err(StabilityError::NonFiniteScore));
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        assert!(matches!(
            StabilityTracker::new(StabilityConfig {
                sample_size: 0,
                ..StabilityConfig::default()
            }),
            Err(StabilityError::ZeroSampleSize)
        ));
    }

    #[test]
    fn classify_boundaries() {
        let thresholds = ReadinessThresholds::default();

        assert_eq!(thresholds.classify(0.849), Readiness::NotReady);
        assert_eq!(thresholds.classify(0.85), Readiness::Stabilizing);
        assert_eq!(thresholds.classify(0.95), Readiness::Stabilizing);
        assert_eq!(thresholds.classify(0.951), Readiness::Ready);
    }

    #[test]
    fn concurrent_readers_see_bounded_window() {
        let tracker = Arc::new(tracker(0.0, 1.0, true, 5));

        let producer = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for index in 0..500 {
                    tracker.add_reading((index % 7) as f64 / 7.0);
                }
            })
        };

        for _ in 0..500 {
            assert!(tracker.snapshot().len() <= 5);
            let _ = tracker.stability();
        }

        producer.join().unwrap();
        assert_eq!(tracker.snapshot().len(), 5);
    }
}
