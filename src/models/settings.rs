use serde::{Deserialize, Serialize};

/// Application settings from Loadstone.yaml
///
/// Host-facing knobs: where per-game persistence scopes live, which game is
/// active, and whether debug logging is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "Loadstone_Settings")]
    pub settings: SettingsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsData {
    /// Root directory holding one subdirectory per persistence scope.
    #[serde(rename = "Data Root", default = "default_data_root")]
    pub data_root: String,

    /// Scope id of the currently managed game, empty when none is selected.
    #[serde(rename = "Active Game", default)]
    pub active_game: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            active_game: String::new(),
            debug_mode: false,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            settings: SettingsData::default(),
        }
    }
}

fn default_data_root() -> String {
    "Loadstone Data".to_string()
}
