//! Game settings and preferences
//!
//! Persisted as JSON next to the high scores.

use serde::{Deserialize, Serialize};

use crate::consts::STORAGE_KEY_PREFIX;
use crate::platform::storage::{KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Controls ===
    /// Force the on-screen joystick and fire button on or off.
    /// `None` shows them on touch devices only.
    pub show_touch_controls: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            show_touch_controls: None,
        }
    }
}

impl Settings {
    pub fn storage_key() -> String {
        format!("{}Settings", STORAGE_KEY_PREFIX)
    }

    /// Volume actually applied to sound effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Whether the touch widgets should be shown
    pub fn touch_controls_visible(&self, touch_device: bool) -> bool {
        self.show_touch_controls.unwrap_or(touch_device)
    }

    fn try_load(store: &impl KeyValueStore) -> Result<Option<Self>, StorageError> {
        match store.get(&Self::storage_key())? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Load settings, falling back to defaults on any error
    pub fn load(store: &impl KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings. Returns false if they could not be stored.
    pub fn save(&self, store: &mut impl KeyValueStore) -> bool {
        let saved = serde_json::to_string(self)
            .map_err(StorageError::from)
            .and_then(|json| store.set(&Self::storage_key(), &json));
        match saved {
            Ok(()) => {
                log::info!("Settings saved");
                true
            }
            Err(e) => {
                log::warn!("Could not save settings: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_missing_settings_use_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            muted: true,
            show_touch_controls: Some(true),
            ..Default::default()
        };
        assert!(settings.save(&mut store));
        assert!(store.get("cabinetShooterSettings").unwrap().is_some());
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set(&Settings::storage_key(), r#"{"muted":true}"#).unwrap();
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);
    }

    #[test]
    fn test_corrupt_settings_use_defaults() {
        let mut store = MemoryStore::new();
        store.set(&Settings::storage_key(), "][").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.sfx_volume = 2.0;
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_touch_controls_override() {
        let mut settings = Settings::default();
        assert!(settings.touch_controls_visible(true));
        assert!(!settings.touch_controls_visible(false));
        settings.show_touch_controls = Some(true);
        assert!(settings.touch_controls_visible(false));
    }
}
