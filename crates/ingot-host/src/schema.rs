//! Configuration field definitions and the schema engine.
//!
//! A plugin exposes its configuration UI as an ordered sequence of
//! [`FieldDefinition`]s. The host renders whatever the plugin currently
//! exposes, so the schema is mutable at runtime: reactive fields appear,
//! change their options, and disappear as other fields are edited.
//!
//! [`ConfigSchema`] is the plain ordered container with the mutation
//! operations; [`SchemaHandle`] wraps it in a shared lock and is the object
//! handed to the host and to resolver bindings.
//!
//! # Invariant
//!
//! No two definitions in a schema ever share a key. `add_field` upholds
//! this internally: an insert under an existing key is applied as an
//! in-place update instead of a duplicate append.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ingot_core::ConfigValue;

use crate::error::{SchemaError, SchemaResult};

// =============================================================================
// Field definitions
// =============================================================================

/// The rendered control kind of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Free-text input.
    Text,
    /// On/off toggle.
    Boolean,
    /// Single choice from [`options`](FieldDefinition::options).
    Select,
    /// Multiple choices from [`options`](FieldDefinition::options).
    MultiSelect,
    /// Static markup block; carries no value.
    Html,
}

/// One selectable option of a select or multi-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the user.
    pub label: String,
    /// Value stored in the config when selected.
    pub value: String,
}

impl SelectOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single configuration field descriptor.
///
/// Construct via the kind-specific builders ([`text`](Self::text),
/// [`boolean`](Self::boolean), [`select`](Self::select),
/// [`multi_select`](Self::multi_select), [`html`](Self::html)); chain
/// [`reactive`](Self::reactive) to mark the field as a trigger for
/// dependent fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique key within the schema.
    pub key: String,
    /// Control kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Display label. Empty for [`FieldKind::Html`] fields.
    pub label: String,
    /// Help text below the control. For [`FieldKind::Html`] fields this
    /// carries the static markup itself.
    pub description: String,
    /// Default value, absent for [`FieldKind::Html`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,
    /// Options for select kinds; empty otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<SelectOption>,
    /// Whether edits to this field trigger dependent-field resolution.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub reactive: bool,
}

impl FieldDefinition {
    /// A free-text field.
    pub fn text(
        key: impl Into<String>,
        label: impl Into<String>,
        default: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Text,
            label: label.into(),
            description: description.into(),
            default: Some(ConfigValue::Text(default.into())),
            options: Vec::new(),
            reactive: false,
        }
    }

    /// An on/off toggle.
    pub fn boolean(
        key: impl Into<String>,
        label: impl Into<String>,
        default: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Boolean,
            label: label.into(),
            description: description.into(),
            default: Some(ConfigValue::Bool(default)),
            options: Vec::new(),
            reactive: false,
        }
    }

    /// A single-select field.
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
        default: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Select,
            label: label.into(),
            description: description.into(),
            default: Some(ConfigValue::Text(default.into())),
            options,
            reactive: false,
        }
    }

    /// A multi-select field.
    pub fn multi_select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
        default: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::MultiSelect,
            label: label.into(),
            description: description.into(),
            default: Some(ConfigValue::Choices(default)),
            options,
            reactive: false,
        }
    }

    /// A static markup block. The markup is carried in `description`;
    /// the field has no value and no default.
    pub fn html(key: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Html,
            label: String::new(),
            description: markup.into(),
            default: None,
            options: Vec::new(),
            reactive: false,
        }
    }

    /// Marks this field as reactive.
    pub fn reactive(mut self) -> Self {
        self.reactive = true;
        self
    }
}

// =============================================================================
// FieldPatch
// =============================================================================

/// A shallow patch applied to an existing [`FieldDefinition`].
///
/// Only the set members replace the corresponding field; unset members
/// leave the existing value untouched.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    /// New control kind.
    pub kind: Option<FieldKind>,
    /// New display label.
    pub label: Option<String>,
    /// New description / markup.
    pub description: Option<String>,
    /// New default value.
    pub default: Option<ConfigValue>,
    /// New options list.
    pub options: Option<Vec<SelectOption>>,
    /// New reactive flag.
    pub reactive: Option<bool>,
}

impl FieldPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options list.
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the display label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn apply_to(self, def: &mut FieldDefinition) {
        if let Some(kind) = self.kind {
            def.kind = kind;
        }
        if let Some(label) = self.label {
            def.label = label;
        }
        if let Some(description) = self.description {
            def.description = description;
        }
        if let Some(default) = self.default {
            def.default = Some(default);
        }
        if let Some(options) = self.options {
            def.options = options;
        }
        if let Some(reactive) = self.reactive {
            def.reactive = reactive;
        }
    }
}

impl From<FieldDefinition> for FieldPatch {
    /// A full patch: every member of `def` except the key replaces the
    /// existing definition's.
    fn from(def: FieldDefinition) -> Self {
        Self {
            kind: Some(def.kind),
            label: Some(def.label),
            description: Some(def.description),
            default: def.default,
            options: Some(def.options),
            reactive: Some(def.reactive),
        }
    }
}

// =============================================================================
// ConfigSchema
// =============================================================================

/// An ordered, key-unique set of field definitions.
///
/// Insertion order is significant — the host renders fields in sequence.
/// All mutations are synchronous and visible to the next
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    fields: Vec<FieldDefinition>,
}

impl ConfigSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    /// Whether a field with `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the definition for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Inserts `def` immediately after the field named `after`, or appends
    /// it when `after` is `None` or names no existing field.
    ///
    /// If a field with the same key already exists the definition is
    /// updated in place instead, keeping its position — the schema never
    /// holds two fields with one key.
    pub fn add_field(&mut self, def: FieldDefinition, after: Option<&str>) {
        if let Some(pos) = self.position(&def.key) {
            debug!(key = %def.key, "add_field on existing key, updating in place");
            self.fields[pos] = def;
            return;
        }
        let at = after
            .and_then(|key| self.position(key))
            .map(|pos| pos + 1)
            .unwrap_or(self.fields.len());
        self.fields.insert(at, def);
    }

    /// Shallow-merges `patch` into the field named `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] when no such field exists.
    pub fn update_field(&mut self, key: &str, patch: FieldPatch) -> SchemaResult<()> {
        let pos = self.position(key).ok_or_else(|| SchemaError::not_found(key))?;
        patch.apply_to(&mut self.fields[pos]);
        Ok(())
    }

    /// Removes the field named `key`. Removing an absent key is a no-op.
    pub fn remove_field(&mut self, key: &str) {
        if let Some(pos) = self.position(key) {
            self.fields.remove(pos);
        }
    }

    /// The current ordered field list.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// SchemaHandle
// =============================================================================

/// Shared handle to a live schema.
///
/// This is the configuration-UI contract object: the host renders from
/// [`snapshot`](Self::snapshot) and the reactive registry mutates through
/// the same handle. Cloning is cheap; all clones observe the same schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaHandle {
    inner: Arc<RwLock<ConfigSchema>>,
}

impl SchemaHandle {
    /// Creates a handle around an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`ConfigSchema::add_field`].
    pub fn add_field(&self, def: FieldDefinition, after: Option<&str>) {
        self.inner.write().add_field(def, after);
    }

    /// See [`ConfigSchema::update_field`].
    pub fn update_field(&self, key: &str, patch: FieldPatch) -> SchemaResult<()> {
        self.inner.write().update_field(key, patch)
    }

    /// See [`ConfigSchema::remove_field`].
    pub fn remove_field(&self, key: &str) {
        self.inner.write().remove_field(key);
    }

    /// Whether a field with `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains(key)
    }

    /// Returns an ordered clone of the current schema.
    pub fn snapshot(&self) -> ConfigSchema {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> ConfigSchema {
        let mut schema = ConfigSchema::new();
        schema.add_field(FieldDefinition::text("prefix", "Prefix", "#", ""), None);
        schema.add_field(FieldDefinition::boolean("enabled", "Enabled", true, ""), None);
        schema.add_field(FieldDefinition::text("url", "URL", "", ""), None);
        schema
    }

    #[test]
    fn add_field_appends_by_default() {
        let schema = sample_schema();
        let keys: Vec<_> = schema.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["prefix", "enabled", "url"]);
    }

    #[test]
    fn add_field_inserts_after_named_key() {
        let mut schema = sample_schema();
        schema.add_field(
            FieldDefinition::text("extra", "Extra", "", ""),
            Some("prefix"),
        );
        let keys: Vec<_> = schema.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["prefix", "extra", "enabled", "url"]);
    }

    #[test]
    fn add_field_falls_back_to_append_for_unknown_anchor() {
        let mut schema = sample_schema();
        schema.add_field(
            FieldDefinition::text("extra", "Extra", "", ""),
            Some("nope"),
        );
        assert_eq!(schema.fields().last().unwrap().key, "extra");
    }

    #[test]
    fn add_field_never_duplicates_a_key() {
        let mut schema = sample_schema();
        schema.add_field(FieldDefinition::text("prefix", "New label", "!", ""), None);

        assert_eq!(schema.len(), 3);
        let count = schema.fields().iter().filter(|f| f.key == "prefix").count();
        assert_eq!(count, 1);
        assert_eq!(schema.get("prefix").unwrap().label, "New label");
        // Position is preserved.
        assert_eq!(schema.fields()[0].key, "prefix");
    }

    #[test]
    fn update_field_merges_shallowly() {
        let mut schema = sample_schema();
        schema
            .update_field(
                "url",
                FieldPatch::new()
                    .description("changed")
                    .options(vec![SelectOption::new("A", "a")]),
            )
            .unwrap();

        let field = schema.get("url").unwrap();
        assert_eq!(field.description, "changed");
        assert_eq!(field.options.len(), 1);
        // Untouched members keep their values.
        assert_eq!(field.label, "URL");
        assert_eq!(field.kind, FieldKind::Text);
    }

    #[test]
    fn update_field_fails_on_absent_key() {
        let mut schema = sample_schema();
        let err = schema.update_field("missing", FieldPatch::new()).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { key } if key == "missing"));
    }

    #[test]
    fn remove_field_is_noop_on_absent_key() {
        let mut schema = sample_schema();
        schema.remove_field("missing");
        schema.remove_field("enabled");
        schema.remove_field("enabled");
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn keys_stay_unique_under_mixed_mutations() {
        let mut schema = sample_schema();
        schema.add_field(FieldDefinition::text("url", "", "", ""), Some("prefix"));
        schema.remove_field("enabled");
        schema.add_field(FieldDefinition::text("enabled", "", "", ""), None);
        schema.add_field(FieldDefinition::text("enabled", "", "", ""), Some("url"));

        let mut keys: Vec<_> = schema.fields().iter().map(|f| f.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), schema.len());
    }

    #[test]
    fn handle_mutations_are_visible_to_snapshots() {
        let handle = SchemaHandle::new();
        handle.add_field(FieldDefinition::text("a", "A", "", ""), None);
        assert!(handle.snapshot().contains("a"));

        handle.remove_field("a");
        assert!(!handle.snapshot().contains("a"));
    }

    #[test]
    fn html_fields_carry_no_value() {
        let field = FieldDefinition::html("welcome", "<h3>Hi</h3>");
        assert_eq!(field.kind, FieldKind::Html);
        assert_eq!(field.default, None);
        assert_eq!(field.description, "<h3>Hi</h3>");
    }

    #[test]
    fn definitions_serialize_with_wire_type_names() {
        let field = FieldDefinition::multi_select(
            "features",
            "Features",
            vec![SelectOption::new("Version Info", "version")],
            vec!["version".to_string()],
            "Pick some",
        );
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "multiSelect");
        assert_eq!(json["options"][0]["value"], "version");
        assert_eq!(json["default"], serde_json::json!(["version"]));
    }
}
