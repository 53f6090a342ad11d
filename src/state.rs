use std::collections::BTreeMap;

use crate::config::Settings;
use crate::data::loader::{FileError, Upload, process_uploads};
use crate::data::model::{PeakSet, SeriesCollection};
use crate::data::peaks::{PeakConfig, detect_all};
use crate::figure::{Figure, compose};
use crate::store::{SeriesStore, SqliteStore};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Series currently shown, in upload order.
    pub series: SeriesCollection,

    /// Peaks per series name (cached; rebuilt on upload or config change).
    pub peaks: BTreeMap<String, PeakSet>,

    /// Files from the last interaction that failed to parse.
    pub file_errors: Vec<FileError>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Present in persistent mode: uploads are stored and all stored series shown.
    store: Option<Box<dyn SeriesStore>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    /// Build state from settings, opening the series store if one is configured.
    pub fn new(settings: Settings) -> Self {
        let opened = settings.store_path.as_ref().map(SqliteStore::open);
        let (store, open_error) = match opened {
            Some(Ok(store)) => (Some(Box::new(store) as Box<dyn SeriesStore>), None),
            Some(Err(e)) => {
                log::error!("Failed to open series store: {e}");
                (None, Some(format!("Error: {e}")))
            }
            None => (None, None),
        };
        let mut state = Self::with_store(settings, store);
        if state.store.is_some() {
            state.reload_from_store();
        }
        state.status_message = open_error.or(state.status_message.take());
        state
    }

    pub fn with_store(settings: Settings, store: Option<Box<dyn SeriesStore>>) -> Self {
        Self {
            settings,
            series: SeriesCollection::new(),
            peaks: BTreeMap::new(),
            file_errors: Vec::new(),
            status_message: None,
            store,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Parse a batch of uploads and refresh what is shown.
    ///
    /// Without a store the batch replaces the current series; with one, each
    /// parsed series is stored and every stored series is shown.
    pub fn ingest(&mut self, uploads: &[Upload]) {
        if uploads.is_empty() {
            return;
        }
        let outcome = process_uploads(uploads);
        self.file_errors = outcome.errors.clone();
        self.status_message = None;

        match self.store.as_mut() {
            Some(store) => {
                for (filename, series) in &outcome.parsed {
                    if let Err(e) = store.put(filename, series) {
                        log::error!("Failed to store {filename}: {e}");
                        self.status_message = Some(format!("Error: {e}"));
                    }
                }
                self.reload_from_store();
            }
            None => {
                self.series = outcome.collection();
                self.recompute_peaks();
            }
        }
    }

    /// Replace the shown series with everything in the store.
    pub fn reload_from_store(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        match store.load_all() {
            Ok(series) => {
                log::info!("Loaded {} stored series", series.len());
                self.series = series;
            }
            Err(e) => {
                log::error!("Failed to read series store: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.recompute_peaks();
    }

    /// Empty the store (persistent mode) and the shown series.
    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.clear() {
                log::error!("Failed to clear series store: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        }
        self.series.clear();
        self.peaks.clear();
        self.file_errors.clear();
    }

    /// Validate raw peak settings from the UI and apply them.
    pub fn set_peak_config(&mut self, threshold: f64, min_distance: i64) {
        match PeakConfig::try_new(threshold, min_distance) {
            Ok(config) => {
                self.settings.peaks = config;
                self.status_message = None;
                self.recompute_peaks();
            }
            Err(e) => {
                log::error!("Rejected peak settings: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute `peaks` after a series or configuration change.
    pub fn recompute_peaks(&mut self) {
        match detect_all(&self.series, &self.settings.peaks) {
            Ok(peaks) => self.peaks = peaks,
            Err(e) => {
                log::error!("Peak detection skipped: {e}");
                self.peaks.clear();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Figure for the current series, with peak overlays when enabled.
    pub fn figure(&self) -> Figure {
        let peaks = self.settings.show_peaks.then_some(&self.peaks);
        compose(&self.series, peaks, &self.settings.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn upload(name: &str, body: &str) -> Upload {
        Upload::new(name, body.as_bytes().to_vec())
    }

    #[test]
    fn plain_mode_replaces_series_each_batch() {
        let mut state = AppState::with_store(Settings::default(), None);
        state.ingest(&[upload("a.csv", "x,y\n0,0\n1,3\n2,0\n")]);
        state.ingest(&[
            upload("b.dat", "0 0\n1 1\n2 0\n"),
            upload("broken.csv", "x,y\nq,r\n"),
        ]);

        assert_eq!(state.series.names(), vec!["b"]);
        assert_eq!(state.peaks["b"], vec![1]);
        assert_eq!(state.file_errors.len(), 1);
        assert_eq!(state.file_errors[0].filename, "broken.csv");
    }

    #[test]
    fn persistent_mode_shows_everything_stored() {
        let store: Box<dyn SeriesStore> = Box::new(MemoryStore::new());
        let mut state = AppState::with_store(Settings::default(), Some(store));
        assert!(state.is_persistent());

        state.ingest(&[upload("a.csv", "x,y\n0,0\n1,3\n2,0\n")]);
        state.ingest(&[upload("b.csv", "x,y\n0,1\n1,2\n")]);
        assert_eq!(state.series.names(), vec!["a.csv", "b.csv"]);
        assert_eq!(state.peaks["a.csv"], vec![1]);
        assert!(state.peaks["b.csv"].is_empty());

        state.clear();
        assert!(state.series.is_empty());
        state.reload_from_store();
        assert!(state.series.is_empty());
    }

    #[test]
    fn persistent_mode_keeps_files_sharing_a_base_name() {
        let store: Box<dyn SeriesStore> = Box::new(MemoryStore::new());
        let mut state = AppState::with_store(Settings::default(), Some(store));
        state.ingest(&[upload("run.csv", "x,y\n0,0\n1,3\n2,0\n")]);
        state.ingest(&[upload("run.dat", "x y\n0 0\n1 5\n2 0\n")]);

        let figure = state.figure();
        assert_eq!(figure.panels.len(), 2);
        assert_eq!(figure.panels[0].title, "run csv");
        assert_eq!(figure.panels[1].title, "run dat");
        assert_eq!(figure.panels[1].peaks, vec![[1.0, 5.0]]);
    }

    #[test]
    fn unopenable_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            store_path: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let state = AppState::new(settings);
        assert!(!state.is_persistent());
        let message = state.status_message.unwrap_or_default();
        assert!(message.starts_with("Error:"), "unexpected status: {message}");
    }

    #[test]
    fn invalid_peak_config_keeps_previous() {
        let mut state = AppState::with_store(Settings::default(), None);
        state.set_peak_config(1.5, 3);
        assert!(state.status_message.is_some());
        assert_eq!(state.settings.peaks, PeakConfig::default());

        state.set_peak_config(0.5, 0);
        assert!(state.status_message.is_none());
        assert_eq!(state.settings.peaks.min_distance, 0);
    }

    #[test]
    fn figure_hides_peaks_when_disabled() {
        let mut state = AppState::with_store(Settings::default(), None);
        state.ingest(&[upload("a.csv", "x,y\n0,0\n1,3\n2,0\n")]);
        assert_eq!(state.figure().panels[0].peaks, vec![[1.0, 3.0]]);
        state.settings.show_peaks = false;
        assert!(state.figure().panels[0].peaks.is_empty());
    }
}
