//! User settings, read from `settings.toml` in the platform config folder:
//! - macOS: ~/Library/Application Support/org.lic.Lic/
//! - Windows: %APPDATA%/lic/Lic/config/
//! - Linux: ~/.config/lic/
//!
//! ```toml
//! [load]
//! strict = false
//!
//! [save]
//! version = 23
//! keep_backup = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use lic_format::{CURRENT_VERSION, FIRST_VERSION, ReaderOptions};
use lic_persistence::SaveOptions;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "lic";
const APP_NAME: &str = "Lic";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub load: LoadSettings,
    pub save: SaveSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Fail on the first recoverable problem.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    /// Format version written by `upgrade` when none is given.
    pub version: i16,
    /// Keep the replaced file as `<stem>_bak.lic`.
    pub keep_backup: bool,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            keep_backup: false,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::default().with_strict(self.load.strict)
    }

    /// Save options; an out-of-range version falls back to the current one.
    #[must_use]
    pub fn save_options(&self) -> SaveOptions {
        let version = if (FIRST_VERSION..=CURRENT_VERSION).contains(&self.save.version) {
            self.save.version
        } else {
            tracing::warn!(
                version = self.save.version,
                "ignoring unsupported save version in settings"
            );
            CURRENT_VERSION
        };
        SaveOptions::default()
            .with_version(version)
            .with_backup(self.save.keep_backup)
    }
}

/// Get the path to the settings file.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from the platform config folder.
pub fn load_settings() -> Settings {
    let Some(path) = settings_path() else {
        tracing::warn!("Could not determine settings path, using defaults");
        return Settings::default();
    };
    load_settings_from(&path)
}

/// Load settings from `path`.
///
/// Returns default settings if the file doesn't exist or cannot be parsed.
pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file {:?}: {}, using defaults", path, e);
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file found at {:?}, using defaults", path);
            Settings::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file: {}, using defaults", e);
            Settings::default()
        }
    }
}
