//! Store Configuration
//!
//! Knobs for a [`FlowStore`](crate::graph::FlowStore). The editor shell
//! usually ships these as a small JSON blob next to its other settings.

use serde::{Deserialize, Serialize};

/// Configuration for a flow store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Run the full invariant check after every mutation.
    ///
    /// Defaults to on in debug builds and off in release builds; the check is
    /// linear in the size of the store.
    pub check_invariants: bool,

    /// Number of elements to reserve space for up front.
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            check_invariants: cfg!(debug_assertions),
            initial_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = StoreConfig::from_json(r#"{"check_invariants": false}"#).unwrap();
        assert!(!config.check_invariants);
        assert_eq!(config.initial_capacity, 64);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(StoreConfig::from_json(r#"{"initial_capacity": "lots"}"#).is_err());
    }
}
