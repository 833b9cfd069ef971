// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session settings and configuration.
//!
//! Settings are stored as RON and cover:
//! - Undo history depth
//! - Spawn defaults (name, position, size, palette)
//! - Playback speed
//! - Headless host frame rate

use crate::history::DEFAULT_UNDO_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "choreo.ron";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read
    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for these settings
    #[error("Settings parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be written as RON
    #[error("Settings serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by an incompatible version
    #[error("Unsupported settings version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreoSettings {
    /// Format version
    pub version: u32,
    /// Maximum number of restorable deletions
    pub undo_capacity: usize,
    /// Name given to new drones
    pub default_drone_name: String,
    /// Where new drones appear when no spawn point is given
    pub spawn_position: [f32; 3],
    /// Drone visual radius, also the pick radius
    pub drone_radius: f32,
    /// Shared clock speed multiplier
    pub time_scale: f32,
    /// Colors handed out to new drones in turn
    pub palette: Vec<[u8; 3]>,
    /// Tick rate of the headless host
    pub frame_rate: f32,
}

impl Default for ChoreoSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            default_drone_name: "Drone".to_string(),
            spawn_position: [0.0, 0.5, 0.0],
            drone_radius: 0.25,
            time_scale: 1.0,
            palette: vec![
                [231, 76, 60],
                [52, 152, 219],
                [46, 204, 113],
                [241, 196, 15],
                [155, 89, 182],
                [230, 126, 34],
            ],
            frame_rate: 60.0,
        }
    }
}

impl ChoreoSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Parse settings from a RON string
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(content)?;
        if settings.version != SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                expected: SETTINGS_FORMAT_VERSION,
            });
        }
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Palette color for the n-th spawned drone
    pub fn color_for(&self, n: usize) -> [u8; 3] {
        if self.palette.is_empty() {
            [255, 255, 255]
        } else {
            self.palette[n % self.palette.len()]
        }
    }

    /// Seconds between headless host ticks
    pub fn frame_interval(&self) -> f32 {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            1.0 / 60.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ChoreoSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.undo_capacity, 50);
        assert_eq!(settings.spawn_position, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = ChoreoSettings::from_ron("(undo_capacity: 5, time_scale: 2.0)").unwrap();
        assert_eq!(settings.undo_capacity, 5);
        assert_eq!(settings.time_scale, 2.0);
        assert_eq!(settings.default_drone_name, "Drone");
    }

    #[test]
    fn test_serialization() {
        let mut settings = ChoreoSettings::default();
        settings.default_drone_name = "Swarm".to_string();
        let ron_str = settings.to_ron().unwrap();
        let loaded = ChoreoSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = ChoreoSettings::from_ron("(version: 7)").unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedVersion { found: 7, .. }));
        assert!(matches!(
            ChoreoSettings::from_ron("(undo_capacity: \"many\")"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_palette_cycles() {
        let mut settings = ChoreoSettings::default();
        settings.palette = vec![[1, 1, 1], [2, 2, 2]];
        assert_eq!(settings.color_for(0), [1, 1, 1]);
        assert_eq!(settings.color_for(3), [2, 2, 2]);
        settings.palette.clear();
        assert_eq!(settings.color_for(3), [255, 255, 255]);
    }
}
