use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "confab";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Bounds for the simulated reply delay.
pub const MIN_REPLY_DELAY_MS: u64 = 1000;
pub const MAX_REPLY_DELAY_MS: u64 = 1500;
/// Shortest usable resize quiet period.
pub const MIN_RESIZE_DEBOUNCE_MS: u64 = 100;

const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;
const DEFAULT_ASSISTANT_NAME: &str = "Assistant";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Delay before the simulated assistant reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Quiet period for resize debouncing, in milliseconds.
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Display name used when rendering assistant messages.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            assistant_name: default_assistant_name(),
        }
    }
}

impl AppSettings {
    /// Clamps out-of-range values and fills in an unusable assistant name.
    pub fn normalized(mut self) -> Self {
        self.reply_delay_ms = self
            .reply_delay_ms
            .clamp(MIN_REPLY_DELAY_MS, MAX_REPLY_DELAY_MS);
        self.resize_debounce_ms = self.resize_debounce_ms.max(MIN_RESIZE_DEBOUNCE_MS);

        self.assistant_name = self.assistant_name.trim().to_string();
        if self.assistant_name.is_empty() {
            self.assistant_name = default_assistant_name();
        }

        self
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_resize_debounce_ms() -> u64 {
    DEFAULT_RESIZE_DEBOUNCE_MS
}

fn default_assistant_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_string()
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to move settings file from {from:?} to {to:?}"))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Loads and persists `AppSettings` as JSON under the user config directory.
pub struct SettingsStore {
    settings: AppSettings,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".confab"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings,
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Persists the normalized settings, then installs them.
    pub fn update(&mut self, settings: AppSettings) -> Result<(), SettingsError> {
        let normalized = settings.normalized();
        self.persist(&normalized)?;
        self.settings = normalized;
        Ok(())
    }

    fn load_from_disk(path: &Path) -> AppSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            return AppSettings::default();
        }

        let figment =
            Figment::from(Serialized::defaults(AppSettings::default())).merge(Json::file(path));

        match figment.extract::<AppSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                AppSettings::default()
            }
        }
    }

    fn persist(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("confab-settings-{}-{label}", std::process::id()))
            .join(SETTINGS_FILE_NAME)
    }

    #[test]
    fn normalization_clamps_out_of_range_values() {
        let settings = AppSettings {
            reply_delay_ms: 10,
            resize_debounce_ms: 5,
            assistant_name: "  ".to_string(),
        }
        .normalized();

        assert_eq!(settings.reply_delay_ms, MIN_REPLY_DELAY_MS);
        assert_eq!(settings.resize_debounce_ms, MIN_RESIZE_DEBOUNCE_MS);
        assert_eq!(settings.assistant_name, "Assistant");

        let settings = AppSettings {
            reply_delay_ms: 9000,
            ..AppSettings::default()
        }
        .normalized();
        assert_eq!(settings.reply_delay_ms, MAX_REPLY_DELAY_MS);
    }

    #[test]
    fn in_range_values_survive_normalization() {
        let settings = AppSettings {
            reply_delay_ms: 1200,
            resize_debounce_ms: 250,
            assistant_name: "Helper".to_string(),
        };

        assert_eq!(settings.clone().normalized(), settings);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let store = SettingsStore::new(scratch_path("missing"));

        assert_eq!(store.settings(), &AppSettings::default());
    }

    #[test]
    fn update_round_trips_through_disk() {
        let path = scratch_path("round-trip");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        let mut store = SettingsStore::new(path.clone());
        store
            .update(AppSettings {
                reply_delay_ms: 1300,
                resize_debounce_ms: 200,
                assistant_name: "Helper".to_string(),
            })
            .unwrap();

        let reloaded = SettingsStore::new(path);
        assert_eq!(reloaded.settings().reply_delay_ms, 1300);
        assert_eq!(reloaded.settings().resize_debounce_ms, 200);
        assert_eq!(reloaded.settings().assistant_name, "Helper");
    }

    #[test]
    fn partial_files_inherit_defaults_for_missing_fields() {
        let path = scratch_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "reply_delay_ms": 1400 }"#).unwrap();

        let store = SettingsStore::new(path);

        assert_eq!(store.settings().reply_delay_ms, 1400);
        assert_eq!(
            store.settings().resize_debounce_ms,
            AppSettings::default().resize_debounce_ms
        );
    }
}
