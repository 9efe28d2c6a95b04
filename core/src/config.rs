//! Application configuration
//!
//! Persisted with confy under the platform config dir. Audio preferences
//! (narration toggle, music volume, mute) live here; they used to be
//! per-device UI state and are injected into the run engine at startup.

use cadence_types::AudioSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioSettings,
    /// When set, overrides the bound program's music track.
    #[serde(default)]
    pub music_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        confy::load("cadence", "config").unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store("cadence", "config", self).map_err(ConfigError::Save)
    }
}
