//! End-to-end checks of the peak detector through the public API.

use peakview::data::peaks::{PeakConfig, PeakError, candidates, find_peaks, suppress_close};

fn config(threshold: f64, min_distance: i64) -> PeakConfig {
    PeakConfig::try_new(threshold, min_distance).unwrap()
}

/// Deterministic noisy signal with a handful of broad bumps.
fn bumpy_signal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (t * 0.21).sin() * 2.0 + (t * 1.7).cos() * 0.3 + (t * 0.05).sin()
        })
        .collect()
}

#[test]
fn half_range_threshold_keeps_three_tallest() {
    let values = [0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 2.0, 0.0, 1.0, 0.0];
    assert_eq!(find_peaks(&values, &config(0.5, 1)).unwrap(), vec![3, 5, 7]);
}

#[test]
fn tied_peaks_inside_window_keep_the_earlier() {
    let values = [0.0, 5.0, 0.0, 5.0, 0.0];
    assert_eq!(find_peaks(&values, &config(0.1, 3)).unwrap(), vec![1]);
}

#[test]
fn constant_input_never_peaks() {
    assert!(find_peaks(&[1.0, 1.0, 1.0], &config(0.0, 0)).unwrap().is_empty());
    assert!(find_peaks(&[1.0, 1.0, 1.0], &config(1.0, 25)).unwrap().is_empty());
}

#[test]
fn out_of_range_settings_are_rejected() {
    assert_eq!(
        PeakConfig::try_new(0.2, -4),
        Err(PeakError::NegativeMinDistance(-4))
    );
    assert_eq!(
        PeakConfig::try_new(1.5, 10),
        Err(PeakError::ThresholdOutOfRange(1.5))
    );
    assert!(PeakConfig::try_new(-0.01, 10).is_err());
}

#[test]
fn results_respect_spacing_and_bounds() {
    let values = bumpy_signal(500);
    for threshold in [0.0, 0.2, 0.6] {
        for min_distance in [0, 1, 4, 10, 40] {
            let peaks = find_peaks(&values, &config(threshold, min_distance)).unwrap();
            for pair in peaks.windows(2) {
                assert!(pair[0] < pair[1]);
                assert!(pair[1] - pair[0] >= min_distance as usize);
            }
            for &i in &peaks {
                assert!(i > 0 && i < values.len() - 1);
                assert!(values[i] > values[i - 1] && values[i] > values[i + 1]);
            }
        }
    }
}

#[test]
fn suppression_on_its_own_output_changes_nothing() {
    let values = bumpy_signal(300);
    for min_distance in [0, 3, 12, 50] {
        let once = suppress_close(&candidates(&values, 0.2), &values, min_distance);
        let twice = suppress_close(&once, &values, min_distance);
        assert_eq!(once, twice);
    }
}

#[test]
fn redetecting_on_peak_values_adds_nothing_new() {
    let values = bumpy_signal(400);
    let peaks = find_peaks(&values, &config(0.2, 10)).unwrap();
    let sparse: Vec<f64> = peaks.iter().map(|&i| values[i]).collect();
    if sparse.len() < 3 {
        return;
    }
    // Re-detection maps back onto interior members of the original selection.
    let again = find_peaks(&sparse, &config(0.0, 0)).unwrap();
    assert!(again.len() <= sparse.len());
    let first = peaks[0];
    let last = peaks[peaks.len() - 1];
    for &j in &again {
        assert!(peaks[j] > first && peaks[j] < last);
        assert_eq!(sparse[j], values[peaks[j]]);
    }
}
