//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::QualityPreset;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
/// Path fields left unset fall back to the platform data directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub effects_dir: Option<String>,
    pub recordings_dir: Option<String>,
    pub database: Option<String>,
    pub quality: Option<String>,
    pub notify: Option<bool>,
    pub restore_slots: Option<bool>,
    pub preload_effects: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            effects_dir: None,
            recordings_dir: None,
            database: None,
            quality: Some("high".to_string()),
            notify: Some(false),
            restore_slots: Some(false),
            preload_effects: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            effects_dir: other.effects_dir.or(self.effects_dir),
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
            database: other.database.or(self.database),
            quality: other.quality.or(self.quality),
            notify: other.notify.or(self.notify),
            restore_slots: other.restore_slots.or(self.restore_slots),
            preload_effects: other.preload_effects.or(self.preload_effects),
        }
    }

    /// Get quality as parsed preset, or default if not set/invalid
    pub fn quality_or_default(&self) -> QualityPreset {
        self.quality
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    pub fn restore_slots_or_default(&self) -> bool {
        self.restore_slots.unwrap_or(false)
    }

    pub fn preload_effects_or_default(&self) -> bool {
        self.preload_effects.unwrap_or(true)
    }
}
