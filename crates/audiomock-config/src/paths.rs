//! Platform-specific paths for the user settings file.
//!
//! - Linux: `~/.config/audiomock/settings.toml`
//! - macOS: `~/Library/Application Support/audiomock/settings.toml`
//! - Windows: `%APPDATA%\audiomock\settings.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use audiomock_config::paths;
//!
//! let path = paths::default_settings_path();
//! println!("settings: {}", path.display());
//! ```

use std::path::PathBuf;

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "audiomock";

/// File name of the user settings document.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to `./audiomock` if the platform config directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user settings file.
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Creates the user configuration directory if it doesn't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}
