//! TOML settings documents.
//!
//! A settings file seeds the feature registry of every context an
//! [`Environment`](crate::Environment) creates:
//!
//! ```toml
//! sample_rate = 44100
//! verbose_json = false
//!
//! [features]
//! "AudioNode#disconnect" = "selective"
//! "AudioContext#suspend" = "enabled"
//! ```
//!
//! Keys missing from `[features]` keep their registry default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use audiomock_core::FeatureRegistry;
use audiomock_core::registry::DEFAULT_SAMPLE_RATE;

use crate::error::ConfigError;
use crate::paths;
use crate::validation::validate_settings;

/// Registry seed loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Context sample rate in Hz.
    pub sample_rate: u32,
    /// Include raw buffer samples in snapshots.
    pub verbose_json: bool,
    /// Feature key to value.
    pub features: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            verbose_json: false,
            features: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), features = settings.features.len(), "settings loaded");
        Ok(settings)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Load the user settings file, or defaults if it does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_if_exists(paths::default_settings_path())
    }

    /// Load `path` if it is a file, otherwise return defaults.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets one feature entry; not validated until load or conversion.
    pub fn set_feature(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.features.insert(key.into(), value.into());
    }

    /// Builder form of [`set_feature()`](Self::set_feature).
    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_feature(key, value);
        self
    }

    /// Validates and builds a registry.
    pub fn to_registry(&self) -> Result<FeatureRegistry, ConfigError> {
        validate_settings(self)?;
        let mut registry = FeatureRegistry::new();
        registry.set_sample_rate(self.sample_rate)?;
        registry.set_verbose_json(self.verbose_json);
        for (key, value) in &self.features {
            registry.set_state(key, value)?;
        }
        Ok(registry)
    }

    /// Consuming form of [`to_registry()`](Self::to_registry).
    pub fn into_registry(self) -> Result<FeatureRegistry, ConfigError> {
        self.to_registry()
    }

    /// Captures every key of `registry`, including defaults.
    pub fn from_registry(registry: &FeatureRegistry) -> Self {
        Self {
            sample_rate: registry.sample_rate(),
            verbose_json: registry.verbose_json(),
            features: registry
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
