//! Reactive resolver registry.
//!
//! A *trigger* field's value can determine the definition of a *dependent*
//! field. Each [`ResolverBinding`] couples a trigger key to a resolver
//! function; whenever the trigger's value changes, the registry invokes the
//! resolver and applies its result against the schema:
//!
//! | Resolver result | Dependent key state | Applied as |
//! |-----------------|---------------------|------------|
//! | `Some(def)` | absent | `add_field` (positioned after the trigger) |
//! | `Some(def)` | present | `update_field` with a full patch |
//! | `None` | any | `remove_field` |
//!
//! Resolvers are async — a real implementation may look the dependent
//! definition up over the network. Invocations are serialized per registry:
//! only one resolution is ever in flight, so the presence check and the
//! schema mutation it guards can never interleave with another resolution
//! and duplicate a key.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ingot_core::ConfigValue;

use crate::schema::{FieldDefinition, FieldPatch, SchemaHandle};

/// An async resolver: trigger value in, dependent definition (or `None`
/// meaning "remove the dependent field") out.
pub type ResolveFn =
    Arc<dyn Fn(ConfigValue) -> BoxFuture<'static, Option<FieldDefinition>> + Send + Sync>;

/// Wraps a synchronous resolver function as a [`ResolveFn`].
pub fn sync_resolver<F>(f: F) -> ResolveFn
where
    F: Fn(&ConfigValue) -> Option<FieldDefinition> + Send + Sync + 'static,
{
    Arc::new(move |value| futures::future::ready(f(&value)).boxed())
}

/// One trigger→dependent coupling.
#[derive(Clone)]
struct ResolverBinding {
    trigger_key: String,
    dependent_key: String,
    resolve: ResolveFn,
}

/// Registry of reactive field bindings.
///
/// At most one binding exists per dependent key; registering a second
/// binding for the same dependent replaces the first.
#[derive(Default)]
pub struct ResolverRegistry {
    bindings: RwLock<Vec<ResolverBinding>>,
    /// Serializes resolutions: one in-flight resolver per registry.
    gate: Mutex<()>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a binding from `trigger_key` to `dependent_key`.
    ///
    /// Replaces any existing binding with the same dependent key.
    pub fn register(
        &self,
        trigger_key: impl Into<String>,
        dependent_key: impl Into<String>,
        resolve: ResolveFn,
    ) {
        let binding = ResolverBinding {
            trigger_key: trigger_key.into(),
            dependent_key: dependent_key.into(),
            resolve,
        };
        let mut bindings = self.bindings.write();
        bindings.retain(|b| b.dependent_key != binding.dependent_key);
        bindings.push(binding);
    }

    /// Whether any binding listens on `key`.
    pub fn has_trigger(&self, key: &str) -> bool {
        self.bindings.read().iter().any(|b| b.trigger_key == key)
    }

    /// Number of installed bindings.
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Whether the registry holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Runs every resolver bound to `trigger_key` against `value` and
    /// applies the results to `schema`.
    pub async fn on_trigger_changed(
        &self,
        trigger_key: &str,
        value: &ConfigValue,
        schema: &SchemaHandle,
    ) {
        let matching: Vec<ResolverBinding> = self
            .bindings
            .read()
            .iter()
            .filter(|b| b.trigger_key == trigger_key)
            .cloned()
            .collect();
        if matching.is_empty() {
            return;
        }

        // One resolution at a time: the presence check below must not race
        // another invocation for the same dependent key.
        let _in_flight = self.gate.lock().await;

        for binding in matching {
            let resolved = (binding.resolve)(value.clone()).await;
            match resolved {
                Some(def) => {
                    if schema.contains(&binding.dependent_key) {
                        debug!(
                            trigger = %trigger_key,
                            dependent = %binding.dependent_key,
                            "resolver updated dependent field"
                        );
                        if let Err(e) =
                            schema.update_field(&binding.dependent_key, FieldPatch::from(def))
                        {
                            warn!(
                                dependent = %binding.dependent_key,
                                error = %e,
                                "dependent field vanished during resolution"
                            );
                        }
                    } else {
                        debug!(
                            trigger = %trigger_key,
                            dependent = %binding.dependent_key,
                            "resolver added dependent field"
                        );
                        schema.add_field(def, Some(&binding.trigger_key));
                    }
                }
                None => {
                    debug!(
                        trigger = %trigger_key,
                        dependent = %binding.dependent_key,
                        "resolver removed dependent field"
                    );
                    schema.remove_field(&binding.dependent_key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SelectOption;

    fn test_resolver() -> ResolveFn {
        sync_resolver(|value: &ConfigValue| {
            let text = value.as_text().unwrap_or("");
            if text.is_empty() {
                return None;
            }
            Some(FieldDefinition::multi_select(
                "dependent",
                "Dependent",
                vec![SelectOption::new(format!("{text}/a"), "/a")],
                Vec::new(),
                format!("derived from {text}"),
            ))
        })
    }

    fn seeded_schema() -> SchemaHandle {
        let schema = SchemaHandle::new();
        schema.add_field(FieldDefinition::text("trigger", "Trigger", "", ""), None);
        schema.add_field(FieldDefinition::text("tail", "Tail", "", ""), None);
        schema
    }

    #[tokio::test]
    async fn resolver_adds_then_updates_then_removes() {
        let registry = ResolverRegistry::new();
        registry.register("trigger", "dependent", test_resolver());
        let schema = seeded_schema();

        registry
            .on_trigger_changed("trigger", &ConfigValue::from("one"), &schema)
            .await;
        let snap = schema.snapshot();
        let field = snap.get("dependent").unwrap();
        assert_eq!(field.options[0].label, "one/a");
        // Positioned right after the trigger field.
        assert_eq!(snap.fields()[1].key, "dependent");

        registry
            .on_trigger_changed("trigger", &ConfigValue::from("two"), &schema)
            .await;
        let snap = schema.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.get("dependent").unwrap().options[0].label, "two/a");

        registry
            .on_trigger_changed("trigger", &ConfigValue::from(""), &schema)
            .await;
        assert!(!schema.contains("dependent"));
    }

    #[tokio::test]
    async fn unbound_trigger_is_ignored() {
        let registry = ResolverRegistry::new();
        registry.register("trigger", "dependent", test_resolver());
        let schema = seeded_schema();

        registry
            .on_trigger_changed("other", &ConfigValue::from("x"), &schema)
            .await;
        assert!(!schema.contains("dependent"));
    }

    #[test]
    fn register_replaces_binding_with_same_dependent() {
        let registry = ResolverRegistry::new();
        registry.register("a", "dependent", test_resolver());
        registry.register("b", "dependent", test_resolver());

        assert_eq!(registry.len(), 1);
        assert!(!registry.has_trigger("a"));
        assert!(registry.has_trigger("b"));
    }

    #[tokio::test]
    async fn repeated_resolutions_never_duplicate_the_dependent_key() {
        let registry = ResolverRegistry::new();
        registry.register("trigger", "dependent", test_resolver());
        let schema = seeded_schema();

        for text in ["a", "b", "c", "d"] {
            registry
                .on_trigger_changed("trigger", &ConfigValue::from(text), &schema)
                .await;
        }

        let snap = schema.snapshot();
        let count = snap
            .fields()
            .iter()
            .filter(|f| f.key == "dependent")
            .count();
        assert_eq!(count, 1);
    }
}
