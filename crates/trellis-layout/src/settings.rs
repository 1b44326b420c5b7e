// Layout settings: resize step and minimum pane share.
// Stored as JSON in the platform config dir, e.g. ~/.config/trellis/layout.json
// on Linux or ~/Library/Application Support/trellis/layout.json on macOS.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RESIZE_STEP_PERCENT: f64 = 5.0;
pub const DEFAULT_MIN_PANE_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// How far one resize step moves a divider, in percent of the split.
    #[serde(default = "default_resize_step")]
    pub resize_step_percent: f64,
    /// Smallest share either side of a split may shrink to, in percent.
    #[serde(default = "default_min_pane")]
    pub min_pane_percent: f64,
}

fn default_resize_step() -> f64 {
    DEFAULT_RESIZE_STEP_PERCENT
}

fn default_min_pane() -> f64 {
    DEFAULT_MIN_PANE_PERCENT
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            resize_step_percent: DEFAULT_RESIZE_STEP_PERCENT,
            min_pane_percent: DEFAULT_MIN_PANE_PERCENT,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("resize step must be in (0, 100], got {0}")]
    InvalidResizeStep(f64),
    #[error("minimum pane size must be in (0, 50), got {0}")]
    InvalidMinPane(f64),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let step = self.resize_step_percent.abs();
        if !(step > 0.0 && step <= 100.0) {
            return Err(SettingsError::InvalidResizeStep(self.resize_step_percent));
        }
        if !(self.min_pane_percent > 0.0 && self.min_pane_percent < 50.0) {
            return Err(SettingsError::InvalidMinPane(self.min_pane_percent));
        }
        Ok(())
    }

    /// Ratio change for one resize step.
    pub fn resize_step(&self) -> f64 {
        self.resize_step_percent.abs() / 100.0
    }

    pub fn min_ratio(&self) -> f64 {
        self.min_pane_percent / 100.0
    }

    pub fn max_ratio(&self) -> f64 {
        1.0 - self.min_ratio()
    }

    pub fn clamp_ratio(&self, ratio: f64) -> f64 {
        ratio.clamp(self.min_ratio(), self.max_ratio())
    }
}

pub fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("trellis").join("layout.json"))
}

/// Read and validate settings from `path`.
pub fn read_settings(path: &Path) -> Result<LayoutSettings, SettingsError> {
    let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: LayoutSettings =
        serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()?;
    Ok(settings)
}

/// Settings from `path`, or the defaults if the file is missing or invalid.
pub fn load_settings_from(path: &Path) -> LayoutSettings {
    match read_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            LayoutSettings::default()
        }
        Err(e) => {
            log::warn!("{}; using default layout settings", e);
            LayoutSettings::default()
        }
    }
}

pub fn load_settings() -> LayoutSettings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => LayoutSettings::default(),
    }
}
