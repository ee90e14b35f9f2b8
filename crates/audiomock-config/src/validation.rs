//! Settings validation.
//!
//! Checks feature keys and values against the core registry's closed sets and
//! the sample rate against the accepted range. All problems are collected so a
//! bad settings file reports everything at once.
//!
//! # Example
//!
//! ```rust
//! use audiomock_config::{Settings, validate_settings};
//!
//! let mut settings = Settings::default();
//! settings.set_feature("AudioNode#disconnect", "selective");
//! validate_settings(&settings).expect("known key and value");
//!
//! settings.set_feature("AudioNode#disconnect", "sometimes");
//! assert!(validate_settings(&settings).is_err());
//! ```

use thiserror::Error;

use audiomock_core::registry;

use crate::settings::Settings;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 3000;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Feature key not known to the registry.
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    /// Feature value outside the key's accepted set.
    #[error("invalid value '{value}' for feature '{key}' (expected one of: {allowed})")]
    InvalidValue {
        /// Feature key.
        key: String,
        /// Rejected value.
        value: String,
        /// Comma-separated accepted values.
        allowed: String,
    },

    /// Sample rate outside [`MIN_SAMPLE_RATE`, `MAX_SAMPLE_RATE`].
    #[error("sample rate {0} out of range [{MIN_SAMPLE_RATE}, {MAX_SAMPLE_RATE}]")]
    SampleRate(u32),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates one feature entry.
pub fn validate_feature(key: &str, value: &str) -> ValidationResult<()> {
    let allowed = registry::allowed_values(key)
        .ok_or_else(|| ValidationError::UnknownFeature(key.to_string()))?;
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

/// Validates a whole settings document.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&settings.sample_rate) {
        errors.push(ValidationError::SampleRate(settings.sample_rate));
    }
    for (key, value) in &settings.features {
        if let Err(e) = validate_feature(key, value) {
            errors.push(e);
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
