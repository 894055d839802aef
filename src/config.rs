//! Generation options.
//!
//! Loading is lenient: a malformed or missing field silently falls back to
//! its default instead of failing.
use std::path::Path;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// prefix every declaration with `export`
    #[serde(deserialize_with = "lenient_bool")]
    pub exported: bool,
    /// name of the top-level declaration
    #[serde(deserialize_with = "lenient_name")]
    pub root: Option<String>,
}

impl Options {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = normalize_name(&root.into());
        self
    }

    pub fn root_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.root.as_deref().unwrap_or(default)
    }

    /// Options from an arbitrary JSON value; anything that is not an object
    /// yields the defaults.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// Options from JSON text. Only syntax errors fail; any well-formed
    /// document goes through [`Options::from_value`].
    pub fn from_json_str(source: &str) -> Result<Self, String> {
        from_str_with_path::<Value>(source).map(|value| Self::from_value(&value))
    }

    /// Read options from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|error| anyhow::anyhow!("failed to read config {}: {error}", path.display()))?;
        Self::from_json_str(&source)
            .map_err(|error| anyhow::anyhow!("invalid config {}: {error}", path.display()))
    }
}

fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_bool().unwrap_or(false))
}

fn lenient_name<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_str().and_then(normalize_name))
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}
