//! Per-session serializer configuration.

use serde::{Deserialize, Serialize};

/// Wire contract between writer and reader. Fixed for a whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibleMode {
    /// Identical type layout on both ends; no field metadata on the wire.
    #[default]
    SchemaConsistent,
    /// Field names and kinds travel with every struct value.
    Compatible,
}

/// Serializer settings.
///
/// Deserializable so hosts can embed it in their own configuration files:
///
/// ```
/// use fory_core::{CompatibleMode, Config};
///
/// let config: Config = serde_json::from_str(r#"{"mode": "compatible"}"#).unwrap();
/// assert_eq!(config.mode, CompatibleMode::Compatible);
/// assert!(config.require_registration);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: CompatibleMode,
    /// When `false`, compatible mode may write unregistered structs in a
    /// self-describing form and recover structs with unknown ids.
    pub require_registration: bool,
    /// Maximum nesting of lists, maps and structs.
    pub max_depth: usize,
    /// Initial allocation for output buffers.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: CompatibleMode::SchemaConsistent,
            require_registration: true,
            max_depth: 64,
            initial_capacity: 64,
        }
    }
}

impl Config {
    pub fn with_mode(mut self, mode: CompatibleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_require_registration(mut self, require: bool) -> Self {
        self.require_registration = require;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn is_compatible(&self) -> bool {
        self.mode == CompatibleMode::Compatible
    }

    /// Whether unregistered structs may be written self-describing.
    pub(crate) fn allows_unregistered(&self) -> bool {
        self.is_compatible() && !self.require_registration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, CompatibleMode::SchemaConsistent);
        assert!(config.require_registration);
        assert!(!config.allows_unregistered());
    }

    #[test]
    fn test_from_toml() {
        let config: Config = toml::from_str(
            r#"
            mode = "compatible"
            require_registration = false
            max_depth = 8
            "#,
        )
        .unwrap();
        assert!(config.is_compatible());
        assert!(config.allows_unregistered());
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.initial_capacity, 64);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(toml::from_str::<Config>(r#"mode = "loose""#).is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = Config::default()
            .with_mode(CompatibleMode::Compatible)
            .with_require_registration(false)
            .with_max_depth(3)
            .with_initial_capacity(1024);
        assert!(config.allows_unregistered());
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.initial_capacity, 1024);
    }
}
