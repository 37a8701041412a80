//! Plugin configuration values.
//!
//! A plugin's persisted configuration is a flat JSON object mapping field
//! keys to values. [`ConfigValue`] models the value shapes a configuration
//! field can take; [`PluginConfig`] is the keyed collection with the overlay
//! semantics used when persisted values are layered onto built-in defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ConfigValue
// =============================================================================

/// A single configuration value.
///
/// Serialized untagged, so the persisted blob stays a plain JSON object:
/// booleans for toggles, strings for text and single-select fields, string
/// arrays for multi-select fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A boolean toggle.
    Bool(bool),
    /// Free text, or the selected value of a single-select field.
    Text(String),
    /// The selected values of a multi-select field.
    Choices(Vec<String>),
}

impl ConfigValue {
    /// Returns the text content if this is a [`ConfigValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`ConfigValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the selected values if this is a [`ConfigValue::Choices`].
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this value is text and empty.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Choices(c) => f.write_str(&c.join(", ")),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(c: Vec<String>) -> Self {
        Self::Choices(c)
    }
}

// =============================================================================
// PluginConfig
// =============================================================================

/// The keyed configuration of one plugin instance.
///
/// Keys are unique; iteration and serialization order is the key order, so
/// the persisted blob is deterministic. Use [`overlay`](Self::overlay) to
/// layer a persisted blob onto built-in defaults — persisted keys win, keys
/// absent from the blob keep their default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    entries: BTreeMap<String, ConfigValue>,
}

impl PluginConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Inserts or replaces the value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Removes the value for `key`, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the text value for `key`, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_text)
    }

    /// Returns the boolean value for `key`, if present and boolean.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    /// Returns the multi-select values for `key`, if present.
    pub fn choices(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(ConfigValue::as_choices)
    }

    /// Layers `other` on top of this configuration.
    ///
    /// Every key present in `other` replaces the value here; keys absent
    /// from `other` are left untouched.
    pub fn overlay(&mut self, other: PluginConfig) {
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the configuration holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for PluginConfig {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_defaults_for_absent_keys() {
        let mut defaults = PluginConfig::new();
        defaults.insert("prefix", "#napcat");
        defaults.insert("enableReply", true);
        defaults.insert("theme", "light");

        let mut persisted = PluginConfig::new();
        persisted.insert("prefix", "!bot");

        defaults.overlay(persisted);

        assert_eq!(defaults.text("prefix"), Some("!bot"));
        assert_eq!(defaults.flag("enableReply"), Some(true));
        assert_eq!(defaults.text("theme"), Some("light"));
    }

    #[test]
    fn values_round_trip_as_plain_json() {
        let mut config = PluginConfig::new();
        config.insert("enableReply", false);
        config.insert("prefix", "#napcat");
        config.insert("features", vec!["version".to_string(), "status".to_string()]);

        let blob = serde_json::to_string(&config).unwrap();
        assert_eq!(
            blob,
            r##"{"enableReply":false,"features":["version","status"],"prefix":"#napcat"}"##
        );

        let back: PluginConfig = serde_json::from_str(&blob).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn typed_accessors_reject_mismatched_shapes() {
        let mut config = PluginConfig::new();
        config.insert("prefix", "#napcat");

        assert_eq!(config.flag("prefix"), None);
        assert_eq!(config.choices("prefix"), None);
        assert_eq!(config.text("missing"), None);
    }

    #[test]
    fn empty_text_detection() {
        assert!(ConfigValue::from("").is_empty_text());
        assert!(!ConfigValue::from("x").is_empty_text());
        assert!(!ConfigValue::from(false).is_empty_text());
    }
}
