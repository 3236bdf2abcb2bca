//! Schema-build configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ConfigError;

/// Environment variable overriding [`SchemaConfig::auto_camel_case`].
pub const ENV_AUTO_CAMEL_CASE: &str = "FIELD_EXT_AUTO_CAMEL_CASE";
/// Environment variable overriding [`SchemaConfig::strict_default_resolver`].
pub const ENV_STRICT_DEFAULT_RESOLVER: &str = "FIELD_EXT_STRICT_DEFAULT_RESOLVER";

/// Options applied while fields are finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Derive GraphQL field names from snake_case names.
    pub auto_camel_case: bool,
    /// Fail instead of returning `null` when the default resolver finds no value.
    pub strict_default_resolver: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            auto_camel_case: true,
            strict_default_resolver: false,
        }
    }
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing keys take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a config from defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults overridden by whatever `lookup` returns.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Maps an override variable name to its raw value, if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_AUTO_CAMEL_CASE) {
            config.auto_camel_case = parse_bool(ENV_AUTO_CAMEL_CASE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STRICT_DEFAULT_RESOLVER) {
            config.strict_default_resolver = parse_bool(ENV_STRICT_DEFAULT_RESOLVER, &raw)?;
        }
        Ok(config)
    }

    /// Convert to a dictionary.
    pub fn to_dict(&self) -> HashMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    /// Create from a dictionary.
    pub fn from_dict(data: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        let object: serde_json::Map<String, Value> =
            data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            message: format!("{key} expects a boolean, got {other:?}"),
        }),
    }
}
