use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{PeakSet, SeriesCollection};

// ---------------------------------------------------------------------------
// Configuration & errors
// ---------------------------------------------------------------------------

/// Peak detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Fraction of the value range (max − min) a sample must rise above the
    /// minimum to qualify. Must lie in `[0, 1]`.
    pub threshold: f64,
    /// Minimum index gap between two accepted peaks.
    pub min_distance: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            min_distance: 10,
        }
    }
}

impl PeakConfig {
    /// Build a config from raw user input, rejecting out-of-range values.
    pub fn try_new(threshold: f64, min_distance: i64) -> Result<Self, PeakError> {
        if min_distance < 0 {
            return Err(PeakError::NegativeMinDistance(min_distance));
        }
        let config = Self {
            threshold,
            min_distance: min_distance as usize,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the threshold range. NaN is rejected.
    pub fn validate(&self) -> Result<(), PeakError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PeakError::ThresholdOutOfRange(self.threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PeakError {
    #[error("need at least 3 samples to find a peak, got {len}")]
    TooShort { len: usize },
    #[error("threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
    #[error("minimum distance must not be negative, got {0}")]
    NegativeMinDistance(i64),
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Find indices of local maxima that clear the relative amplitude threshold
/// and are at least `min_distance` apart.
pub fn find_peaks(values: &[f64], config: &PeakConfig) -> Result<PeakSet, PeakError> {
    config.validate()?;
    if values.len() < 3 {
        return Err(PeakError::TooShort { len: values.len() });
    }
    let candidates = candidates(values, config.threshold);
    Ok(suppress_close(&candidates, values, config.min_distance))
}

/// First pass: strict interior local maxima whose height above the minimum is
/// at least `threshold * (max - min)`. A flat signal, or one whose range is not
/// finite, has no candidates.
pub fn candidates(values: &[f64], threshold: f64) -> PeakSet {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        return Vec::new();
    }
    let floor = threshold * range;

    (1..n - 1)
        .filter(|&i| values[i] > values[i - 1] && values[i] > values[i + 1])
        .filter(|&i| values[i] - min >= floor)
        .collect()
}

/// Second pass: greedy left-to-right sweep. A candidate closer than
/// `min_distance` to the last accepted peak replaces it only when strictly
/// higher; ties keep the earlier index.
pub fn suppress_close(candidates: &[usize], values: &[f64], min_distance: usize) -> PeakSet {
    let mut accepted: PeakSet = Vec::with_capacity(candidates.len());

    for &idx in candidates {
        match accepted.last_mut() {
            Some(last) if idx.abs_diff(*last) < min_distance => {
                if values[idx] > values[*last] {
                    *last = idx;
                }
            }
            _ => accepted.push(idx),
        }
    }

    accepted
}

/// Run the detector once per series. The config is checked up front; series
/// too short to hold a peak get an empty set.
pub fn detect_all(
    collection: &SeriesCollection,
    config: &PeakConfig,
) -> Result<BTreeMap<String, PeakSet>, PeakError> {
    config.validate()?;

    let mut peaks = BTreeMap::new();
    for series in collection {
        let found = match find_peaks(&series.y, config) {
            Ok(found) => found,
            Err(PeakError::TooShort { len }) => {
                log::debug!("{}: {len} samples, skipping peak detection", series.name);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        log::debug!("{}: {} peaks", series.name, found.len());
        peaks.insert(series.name.clone(), found);
    }
    Ok(peaks)
}
