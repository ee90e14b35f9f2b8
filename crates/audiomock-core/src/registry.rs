//! Feature registry: keyed toggles for optional and legacy behaviors.
//!
//! Each [`AudioContext`](crate::AudioContext) owns its own registry; there is
//! no process-wide state. Keys follow the `Type#member` convention of the API
//! they switch, and every key has a closed set of accepted values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Selects the disconnect strategy for nodes.
pub const DISCONNECT: &str = "AudioNode#disconnect";
/// Enables `AudioContext::suspend`.
pub const SUSPEND: &str = "AudioContext#suspend";
/// Enables `AudioContext::resume`.
pub const RESUME: &str = "AudioContext#resume";
/// Enables `AudioContext::close`.
pub const CLOSE: &str = "AudioContext#close";

const TOGGLE: &[&str] = &["disabled", "enabled"];
const DISCONNECT_MODES: &[&str] = &["channel", "selective"];

/// Every registered key with its accepted values; the first value is the default.
pub const FEATURES: &[(&str, &[&str])] = &[
    (DISCONNECT, DISCONNECT_MODES),
    (SUSPEND, TOGGLE),
    (RESUME, TOGGLE),
    (CLOSE, TOGGLE),
];

/// Default sample rate for new contexts.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Strategy used by partially-specified disconnect calls.
///
/// See [`Disconnect`](crate::graph::Disconnect) for the per-form behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisconnectMode {
    /// Legacy blanket mode: a bare `disconnect()` clears output 0 and the
    /// input slot of a fully-qualified disconnect is ignored.
    #[default]
    Channel,
    /// Selective mode: a bare `disconnect()` clears every output and a
    /// fully-qualified disconnect removes only the matching input slot.
    Selective,
}

impl DisconnectMode {
    /// Registry value for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Selective => "selective",
        }
    }
}

impl fmt::Display for DisconnectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisconnectMode {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channel" => Ok(Self::Channel),
            "selective" => Ok(Self::Selective),
            other => Err(GraphError::InvalidFeatureValue {
                key: DISCONNECT.to_string(),
                value: other.to_string(),
                allowed: DISCONNECT_MODES.join(", "),
            }),
        }
    }
}

/// Returns the accepted values for `key`, or `None` for unregistered keys.
pub fn allowed_values(key: &str) -> Option<&'static [&'static str]> {
    FEATURES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, values)| *values)
}

/// Keyed feature registry with typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRegistry {
    states: BTreeMap<&'static str, &'static str>,
    verbose_json: bool,
    sample_rate: u32,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRegistry {
    /// Creates a registry with every key at its default value.
    pub fn new() -> Self {
        let states = FEATURES
            .iter()
            .map(|(key, values)| (*key, values[0]))
            .collect();
        Self {
            states,
            verbose_json: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Sets `key` to `value`.
    ///
    /// Fails for unregistered keys and for values outside the key's accepted
    /// set; the registry is unchanged on failure.
    pub fn set_state(&mut self, key: &str, value: &str) -> Result<(), GraphError> {
        let (key, values) = FEATURES
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| GraphError::UnknownFeature(key.to_string()))?;
        let value = values.iter().find(|v| **v == value).ok_or_else(|| {
            GraphError::InvalidFeatureValue {
                key: (*key).to_string(),
                value: value.to_string(),
                allowed: values.join(", "),
            }
        })?;
        self.states.insert(*key, *value);
        #[cfg(feature = "tracing")]
        tracing::debug!(key = *key, value = *value, "feature_set");
        Ok(())
    }

    /// Builder form of [`set_state()`](Self::set_state).
    pub fn with_state(mut self, key: &str, value: &str) -> Result<Self, GraphError> {
        self.set_state(key, value)?;
        Ok(self)
    }

    /// Current value of `key`.
    pub fn state(&self, key: &str) -> Option<&'static str> {
        self.states.get(key).copied()
    }

    /// Whether `key` is set to `enabled`.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.state(key) == Some("enabled")
    }

    /// Active disconnect strategy.
    pub fn disconnect_mode(&self) -> DisconnectMode {
        self.state(DISCONNECT)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Sets the disconnect strategy.
    pub fn set_disconnect_mode(&mut self, mode: DisconnectMode) {
        self.states.insert(
            DISCONNECT,
            match mode {
                DisconnectMode::Channel => DISCONNECT_MODES[0],
                DisconnectMode::Selective => DISCONNECT_MODES[1],
            },
        );
    }

    /// Whether the context exposes its lifecycle state at all.
    pub fn state_api_visible(&self) -> bool {
        [SUSPEND, RESUME, CLOSE].iter().any(|k| self.is_enabled(k))
    }

    /// Enables or disables suspend, resume, and close together.
    pub fn set_state_transitions(&mut self, enabled: bool) {
        let value = if enabled { TOGGLE[1] } else { TOGGLE[0] };
        for key in [SUSPEND, RESUME, CLOSE] {
            self.states.insert(key, value);
        }
    }

    /// Whether snapshots include raw buffer sample data.
    pub fn verbose_json(&self) -> bool {
        self.verbose_json
    }

    /// Toggles raw buffer data in snapshots.
    pub fn set_verbose_json(&mut self, verbose: bool) {
        self.verbose_json = verbose;
    }

    /// Context sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sets the context sample rate; zero is rejected.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::invalid_argument(
                "FeatureRegistry#setSampleRate",
                "sample rate should be greater than zero",
            ));
        }
        self.sample_rate = sample_rate;
        Ok(())
    }

    /// Iterates `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.states.iter().map(|(k, v)| (*k, *v))
    }
}
