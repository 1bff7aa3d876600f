//! Runtime configuration (`fieldlink.toml`)
//!
//! ```toml
//! [resolver]
//! fast_path = true
//!
//! [runtime]
//! lookup = "intercepting"
//!
//! [remap]
//! "Player.health" = "f_1021"
//! ```

use std::collections::HashMap;
use std::path::Path;

use fieldlink_engine::ResolverOptions;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::lookup::LookupPolicy;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Resolver tuning
    #[serde(default)]
    pub resolver: ResolverOptions,

    /// Runtime environment behavior
    #[serde(default)]
    pub runtime: RuntimeSection,

    /// Field renames applied when classes are defined, `"Class.field" -> name`
    #[serde(default)]
    pub remap: HashMap<String, String>,
}

/// `[runtime]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSection {
    /// Fast-path lookup behavior (default: "standard")
    #[serde(default)]
    pub lookup: LookupPolicy,
}

impl RuntimeConfig {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse from a TOML string
    pub fn parse(content: &str) -> Result<Self, RuntimeError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuntimeConfig::parse("").unwrap();

        assert_eq!(config, RuntimeConfig::default());
        assert!(config.resolver.fast_path);
        assert_eq!(config.runtime.lookup, LookupPolicy::Standard);
        assert!(config.remap.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = RuntimeConfig::parse(
            r#"
            [resolver]
            fast_path = false

            [runtime]
            lookup = "intercepting"

            [remap]
            "Player.health" = "f_1021"
            "Player.name" = "f_1022"
            "#,
        )
        .unwrap();

        assert!(!config.resolver.fast_path);
        assert_eq!(config.runtime.lookup, LookupPolicy::Intercepting);
        assert_eq!(config.remap.get("Player.health").map(String::as_str), Some("f_1021"));
        assert_eq!(config.remap.len(), 2);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = RuntimeConfig::parse("[runtime]\nlookup = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, RuntimeError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nfast_path = false").unwrap();

        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert!(!config.resolver.fast_path);
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_file(Path::new("/nonexistent/fieldlink.toml")).unwrap_err();
        assert!(matches!(err, RuntimeError::Io(_)));
    }
}
