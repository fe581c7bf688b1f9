use crate::settings::error::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, fs, path::Path};

/// Flat key/value settings as supplied by the host, before validation.
///
/// Values may be JSON strings, numbers or booleans; a number given as a
/// string is accepted wherever a number is expected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawSettings {
    entries: BTreeMap<String, Value>,
}

impl RawSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Text value of `key`. Blank strings count as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn get_integer(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        let Some(value) = self.entries.get(key) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {value}")))
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.entries.get(key) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().to_ascii_lowercase().parse::<bool>().ok(),
            _ => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected true or false, got {value}")))
    }

    /// Every `<prefix><name>` entry as `name -> text`.
    pub fn sub_properties(&self, prefix: &str) -> BTreeMap<String, String> {
        self.entries
            .keys()
            .filter_map(|key| {
                let name = key.strip_prefix(prefix)?;
                let value = self.get_string(key)?;
                Some((name.to_string(), value))
            })
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn invalid(key: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    }
}
