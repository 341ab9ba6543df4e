//! Settings file and per-user directories.
//!
//! - macOS: ~/Library/Application Support/console-search/
//! - Linux: $XDG_CONFIG_HOME/console-search/ (or ~/.config/console-search/)
//! - Windows: %APPDATA%\console-search\

use crate::kernel::services::ports::settings::Settings;
use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "console-search";
const SETTINGS_FILE: &str = "settings.json";
const RECENT_TOKENS_FILE: &str = "recent-tokens.json";
const LOG_DIR: &str = "logs";

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Json(serde_json::Error),
    NoConfigDir,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Json(e) => write!(f, "Invalid settings: {}", e),
            SettingsError::NoConfigDir => write!(f, "Cannot determine settings directory"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        });
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg).join(APP_NAME));
            }
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join(APP_NAME));
    }

    #[cfg(target_os = "windows")]
    {
        return std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME));
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub fn get_recent_tokens_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(RECENT_TOKENS_FILE))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(LOG_DIR))
}

/// Writes default settings to `path` unless it already exists.
pub fn ensure_settings_file_at(path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn ensure_settings_file() -> Result<PathBuf, SettingsError> {
    let path = get_settings_path().ok_or(SettingsError::NoConfigDir)?;
    ensure_settings_file_at(&path)?;
    Ok(path)
}

pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Defaults when the file is missing; invalid files are logged and ignored.
pub fn load_settings_or_default(path: &Path) -> Settings {
    match load_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
            Settings::default()
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
