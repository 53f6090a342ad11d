use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::peaks::{PeakConfig, PeakError};

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV: &str = "PEAKVIEW_CONFIG";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Stacked-panel layout options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of each panel in points; the figure is `panel_height * n` tall.
    pub panel_height: f32,
    /// Draw the x axis right-to-left (the usual orientation for spectra).
    pub reverse_x: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            panel_height: 400.0,
            reverse_x: true,
        }
    }
}

/// Application settings, read once at start-up.
///
/// ```json
/// {
///   "peaks": { "threshold": 0.2, "min_distance": 10 },
///   "layout": { "panel_height": 400.0, "reverse_x": true },
///   "show_peaks": true,
///   "store_path": "series.db"
/// }
/// ```
///
/// Every field is optional. When `store_path` is set, uploads are persisted
/// and all stored series are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub peaks: PeakConfig,
    pub layout: LayoutConfig,
    pub show_peaks: bool,
    pub store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            peaks: PeakConfig::default(),
            layout: LayoutConfig::default(),
            show_peaks: true,
            store_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid peak settings: {0}")]
    Peaks(#[from] PeakError),
}

impl Settings {
    /// Parse settings from a JSON file and validate them.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the file named by [`CONFIG_ENV`], falling back to defaults
    /// when the variable is unset or the file is unusable.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(e) => {
                log::error!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.peaks.validate()?;
        Ok(())
    }
}
