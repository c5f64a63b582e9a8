//! Metadata registry keyed by schema identity.
//!
//! Schemas are immutable once built, so metadata lives beside the graph
//! rather than inside it. Identity is the `Arc` pointer: two clones of the
//! same `Arc<Schema>` share one entry, two structurally identical schemas
//! do not. The registry holds a clone of each registered `Arc` so a key
//! can never be freed and reused while its entry is alive.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::Schema;
use crate::value::Value;

/// Metadata attached to one schema.
#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    /// Stable identifier; exporters use it for `$defs` names. Unlike the
    /// other fields, an id is never inherited through an origin chain.
    pub id: Option<String>,
    /// Human-readable title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Example values.
    pub examples: Vec<Value>,
    /// Free-form extra metadata.
    pub extra: IndexMap<String, serde_json::Value>,
}

impl RegistryEntry {
    /// Empty entry.
    pub fn new() -> Self {
        RegistryEntry::default()
    }

    /// Sets the stable identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an example value.
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Adds a free-form metadata field.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

fn key_of(schema: &Arc<Schema>) -> usize {
    Arc::as_ptr(schema) as usize
}

/// A collection of schema → metadata associations.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<usize, (Arc<Schema>, RegistryEntry)>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers (or replaces) the entry for `schema`.
    pub fn add(&mut self, schema: &Arc<Schema>, entry: RegistryEntry) {
        debug!(kind = schema.kind_name(), id = ?entry.id, "registering schema metadata");
        self.entries
            .insert(key_of(schema), (schema.clone(), entry));
    }

    /// The entry registered directly on `schema`, ignoring origins.
    pub fn get(&self, schema: &Arc<Schema>) -> Option<&RegistryEntry> {
        self.entries.get(&key_of(schema)).map(|(_, entry)| entry)
    }

    /// Removes and returns the entry for `schema`.
    pub fn remove(&mut self, schema: &Arc<Schema>) -> Option<RegistryEntry> {
        self.entries.remove(&key_of(schema)).map(|(_, entry)| entry)
    }

    /// Whether `schema` has a directly registered entry.
    pub fn contains(&self, schema: &Arc<Schema>) -> bool {
        self.entries.contains_key(&key_of(schema))
    }

    /// Registered schemas and their entries, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<Schema>, &RegistryEntry)> {
        self.entries.values().map(|(schema, entry)| (schema, entry))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective metadata for `schema`: its own entry, with gaps filled by
    /// walking the origin chain (a schema derived via `pick`/`omit`/...
    /// inherits descriptive metadata from its source). The `id` field is
    /// exempt — an inherited id would alias two different schemas.
    pub fn resolve(&self, schema: &Arc<Schema>) -> RegistryEntry {
        let mut resolved = self.get(schema).cloned().unwrap_or_default();
        let mut current = schema.origin().cloned();
        while let Some(ancestor) = current {
            if let Some(entry) = self.get(&ancestor) {
                if resolved.title.is_none() {
                    resolved.title = entry.title.clone();
                }
                if resolved.description.is_none() {
                    resolved.description = entry.description.clone();
                }
                if resolved.examples.is_empty() {
                    resolved.examples = entry.examples.clone();
                }
                for (key, value) in &entry.extra {
                    if !resolved.extra.contains_key(key) {
                        resolved.extra.insert(key.clone(), value.clone());
                    }
                }
            }
            current = ancestor.origin().cloned();
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::pick;
    use crate::schema::{number, object, string};

    #[test]
    fn test_identity_is_pointer_not_structure() {
        let a = Arc::new(string());
        let b = Arc::new(string());
        let mut registry = Registry::new();
        registry.add(&a, RegistryEntry::new().with_title("a"));
        assert!(registry.contains(&a));
        assert!(!registry.contains(&b));
        assert!(registry.contains(&a.clone()));
    }

    #[test]
    fn test_resolve_inherits_through_origin_chain() {
        let source = Arc::new(object([("name", string()), ("age", number())]));
        let derived = Arc::new(pick(&source, &["name"]).unwrap());

        let mut registry = Registry::new();
        registry.add(
            &source,
            RegistryEntry::new()
                .with_id("person")
                .with_title("Person")
                .with_description("a person"),
        );
        registry.add(&derived, RegistryEntry::new().with_title("Person name"));

        let resolved = registry.resolve(&derived);
        assert_eq!(resolved.title.as_deref(), Some("Person name"));
        assert_eq!(resolved.description.as_deref(), Some("a person"));
        // The source id must not leak onto the derived schema.
        assert_eq!(resolved.id, None);
    }

    #[test]
    fn test_remove_drops_entry() {
        let schema = Arc::new(string());
        let mut registry = Registry::new();
        registry.add(&schema, RegistryEntry::new().with_id("s"));
        assert!(registry.remove(&schema).is_some());
        assert!(registry.is_empty());
    }
}
