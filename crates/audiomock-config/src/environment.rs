//! Explicit test environment.
//!
//! An [`Environment`] replaces process-wide toggles: it owns a
//! [`FeatureRegistry`] and hands each new [`AudioContext`] its own copy.
//! Changing the environment's registry affects only contexts created
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use audiomock_config::{Environment, Settings};
//!
//! let mut env = Environment::setup(&Settings::default()).unwrap();
//! env.set_state("AudioContext#suspend", "enabled").unwrap();
//!
//! let mut ctx = env.new_context();
//! ctx.suspend().unwrap();
//! assert_eq!(ctx.state().map(|s| s.to_string()).as_deref(), Some("suspended"));
//!
//! env.teardown();
//! ```

use audiomock_core::{AudioContext, FeatureRegistry};

use crate::error::ConfigError;
use crate::logging::init_logging;
use crate::settings::Settings;

/// Owns the registry seed for every context of a test run.
#[derive(Debug, Clone)]
pub struct Environment {
    registry: FeatureRegistry,
    contexts_created: usize,
}

impl Environment {
    /// Initializes logging and builds the registry from `settings`.
    pub fn setup(settings: &Settings) -> Result<Self, ConfigError> {
        init_logging();
        let registry = settings.to_registry()?;
        tracing::info!(
            sample_rate = registry.sample_rate(),
            disconnect = %registry.disconnect_mode(),
            "environment setup"
        );
        Ok(Self {
            registry,
            contexts_created: 0,
        })
    }

    /// Registry handed to new contexts.
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Sets a feature for contexts created from now on.
    pub fn set_state(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.registry.set_state(key, value)?;
        Ok(())
    }

    /// Creates a context with a copy of the current registry.
    pub fn new_context(&mut self) -> AudioContext {
        self.contexts_created += 1;
        AudioContext::with_registry(self.registry.clone())
    }

    /// Number of contexts created so far.
    pub fn contexts_created(&self) -> usize {
        self.contexts_created
    }

    /// Ends the environment. Contexts already created keep working.
    pub fn teardown(self) {
        tracing::info!(contexts = self.contexts_created, "environment teardown");
    }
}
