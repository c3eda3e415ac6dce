use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CAPTURE_HEIGHT, CAPTURE_WIDTH, DEFAULT_BACKEND_BASE_URL, JPEG_QUALITY, MIN_TICK_SPACING,
    REQUEST_TIMEOUT, TICK_INTERVAL,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted kiosk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_base_url: String,
    pub camera_device: Option<String>,
    pub tick_interval_ms: u64,
    pub min_tick_spacing_ms: u64,
    pub capture_width: u32,
    pub capture_height: u32,
    pub jpeg_quality: u8,
    pub request_timeout_secs: u64,
    /// TrueType font for overlay labels. Unset picks a system font.
    pub label_font: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            camera_device: None,
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            min_tick_spacing_ms: MIN_TICK_SPACING.as_millis() as u64,
            capture_width: CAPTURE_WIDTH,
            capture_height: CAPTURE_HEIGHT,
            jpeg_quality: JPEG_QUALITY,
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
            label_font: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Rollcall").join("settings.json"))
    }

    /// Loads settings from the platform config directory, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let mut settings: Settings = fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        settings.backend_base_url = normalize_base_url(&settings.backend_base_url);
        settings
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SettingsError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn set_backend_base_url(&mut self, raw: &str) {
        self.backend_base_url = normalize_base_url(raw);
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn min_tick_spacing(&self) -> Duration {
        Duration::from_millis(self.min_tick_spacing_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn capture_resolution(&self) -> (u32, u32) {
        (self.capture_width, self.capture_height)
    }
}

/// Trims whitespace and one trailing slash; blank input yields the default.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_BACKEND_BASE_URL.to_string();
    }
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

pub fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
