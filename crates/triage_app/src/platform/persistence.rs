use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use triage_core::Preferences;
use triage_engine::StateFiles;
use triage_logging::{triage_error, triage_info, triage_warn};

const PREFERENCES_FILENAME: &str = "preferences.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPreferences {
    #[serde(default = "enabled")]
    auto_analyze: bool,
    #[serde(default)]
    notifications: bool,
}

fn enabled() -> bool {
    true
}

impl From<Preferences> for PersistedPreferences {
    fn from(preferences: Preferences) -> Self {
        Self {
            auto_analyze: preferences.auto_analyze,
            notifications: preferences.notifications,
        }
    }
}

impl From<PersistedPreferences> for Preferences {
    fn from(persisted: PersistedPreferences) -> Self {
        Self {
            auto_analyze: persisted.auto_analyze,
            notifications: persisted.notifications,
        }
    }
}

/// The two user preferences, kept as RON in the state directory.
pub(crate) struct PreferenceStore {
    writer: StateFiles,
}

impl PreferenceStore {
    pub(crate) fn new(state_dir: PathBuf) -> Self {
        Self {
            writer: StateFiles::new(state_dir),
        }
    }

    /// Falls back to defaults when nothing usable is stored.
    pub(crate) fn load(&self) -> Preferences {
        let content = match self.writer.read(PREFERENCES_FILENAME) {
            Ok(Some(text)) => text,
            Ok(None) => return Preferences::default(),
            Err(err) => {
                triage_warn!(
                    "Failed to read preferences from {:?}: {}",
                    self.writer.dir(),
                    err
                );
                return Preferences::default();
            }
        };

        match ron::from_str::<PersistedPreferences>(&content) {
            Ok(persisted) => {
                triage_info!("Loaded preferences from {:?}", self.writer.dir());
                persisted.into()
            }
            Err(err) => {
                triage_warn!("Failed to parse stored preferences: {}", err);
                Preferences::default()
            }
        }
    }

    pub(crate) fn save(&self, preferences: Preferences) {
        let pretty = ron::ser::PrettyConfig::new();
        let content =
            match ron::ser::to_string_pretty(&PersistedPreferences::from(preferences), pretty) {
                Ok(text) => text,
                Err(err) => {
                    triage_error!("Failed to serialize preferences: {}", err);
                    return;
                }
            };

        if let Err(err) = self.writer.write(PREFERENCES_FILENAME, &content) {
            triage_error!(
                "Failed to write preferences to {:?}: {}",
                self.writer.dir(),
                err
            );
        }
    }
}
