//! Settings and test environment setup for audiomock.
//!
//! This crate seeds the per-context [`FeatureRegistry`] of `audiomock-core`
//! from TOML settings files and wraps it in an explicit [`Environment`] with
//! a setup/teardown lifecycle.
//!
//! # Features
//!
//! - **Settings**: Load and save registry seeds as TOML
//! - **Validation**: Check feature keys, values and sample rate before use
//! - **Paths**: Platform-specific location of the user settings file
//! - **Environment**: Logging init plus a context factory sharing one registry seed
//!
//! # Example
//!
//! ```rust
//! use audiomock_config::{Environment, Settings};
//!
//! let settings = Settings::from_toml(
//!     r#"
//!     [features]
//!     "AudioNode#disconnect" = "selective"
//!     "#,
//! )?;
//!
//! let mut env = Environment::setup(&settings)?;
//! let mut ctx = env.new_context();
//! let gain = ctx.create_gain();
//! ctx.connect(gain, ctx.destination(), 0, 0)?;
//! assert_eq!(ctx.graph().edge_count(), 1);
//! env.teardown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`FeatureRegistry`]: audiomock_core::FeatureRegistry

mod environment;
mod error;
mod logging;
mod settings;

/// Platform-specific paths for the settings file.
pub mod paths;

/// Settings validation.
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use logging::init_logging;
pub use paths::{default_settings_path, ensure_user_config_dir, user_config_dir};
pub use settings::Settings;
pub use validation::{
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, ValidationError, ValidationResult, validate_feature,
    validate_settings,
};
