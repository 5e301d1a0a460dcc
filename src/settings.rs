//! Player preferences
//!
//! Persisted separately from the high score record.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::{self, Storage};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the control guide overlay during play
    pub show_in_game_guide: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_in_game_guide: true,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults on missing or unreadable data
    pub fn load(storage: &impl Storage) -> Self {
        match storage.read(SETTINGS_KEY) {
            Ok(Some(text)) => match persistence::open(&text) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring unreadable settings: {err}"),
            },
            Ok(None) => {}
            Err(err) => log::warn!("Could not read settings: {err}"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save(&self, storage: &mut impl Storage) {
        let text = match persistence::seal(self) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Failed to serialize settings: {err}");
                return;
            }
        };
        match storage.write(SETTINGS_KEY, &text) {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::error!("Failed to save settings: {err}"),
        }
    }

    /// Toggle the in-game guide and persist the choice
    pub fn set_in_game_guide(&mut self, visible: bool, storage: &mut impl Storage) {
        if self.show_in_game_guide != visible {
            self.show_in_game_guide = visible;
            self.save(storage);
        }
    }
}
