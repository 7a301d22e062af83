//! Mapper configuration
//!
//! All fields are optional in the serialized form; anything left out takes its
//! default.
//!
//! ```yaml
//! strict_write: true
//! missing_setter: skip
//! format: n-triples
//! ```

use crate::rdf::RdfFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Malformed YAML document
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON document
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// What the read engine does with a value for a property that has no setter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSetterPolicy {
    /// Raise `MappingError::MissingSetter`
    #[default]
    Fail,
    /// Ignore the value and log it
    Skip,
}

/// Settings shared by the write engine, read engine and facade
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Getter failures abort the write instead of skipping the property
    pub strict_write: bool,
    /// Handling of values that cannot be stored on the bean
    pub missing_setter: MissingSetterPolicy,
    /// Format used by the facade helpers that take no explicit format
    pub format: RdfFormat,
}

impl MapperConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML document
    pub fn from_yaml_str(input: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Load from a JSON document
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load from a file; `.json` files are read as JSON, everything else as YAML
    pub fn from_file(path: &std::path::Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    pub fn with_strict_write(mut self, strict: bool) -> Self {
        self.strict_write = strict;
        self
    }

    pub fn with_missing_setter(mut self, policy: MissingSetterPolicy) -> Self {
        self.missing_setter = policy;
        self
    }

    pub fn with_format(mut self, format: RdfFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert!(!config.strict_write);
        assert_eq!(config.missing_setter, MissingSetterPolicy::Fail);
        assert_eq!(config.format, RdfFormat::Turtle);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = MapperConfig::from_yaml_str("missing_setter: skip\n").unwrap();
        assert_eq!(config.missing_setter, MissingSetterPolicy::Skip);
        assert!(!config.strict_write);
        assert_eq!(config.format, RdfFormat::Turtle);
    }

    #[test]
    fn test_json_config() {
        let config =
            MapperConfig::from_json_str(r#"{"strict_write": true, "format": "rdf-xml"}"#).unwrap();
        assert!(config.strict_write);
        assert_eq!(config.format, RdfFormat::RdfXml);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(MapperConfig::from_yaml_str("format: csv\n").is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.yaml");
        std::fs::write(&path, "strict_write: true\nformat: n-triples\n").unwrap();

        let config = MapperConfig::from_file(&path).unwrap();
        assert_eq!(
            config,
            MapperConfig::new()
                .with_strict_write(true)
                .with_format(RdfFormat::NTriples)
        );
    }
}
