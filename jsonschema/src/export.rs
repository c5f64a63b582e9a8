//! Schema-graph → JSON Schema rendering.
//!
//! A single walk over the graph, memoized per node identity. Nodes are
//! two-colored while walking: re-entering a node that is still in
//! progress proves a true reference cycle (as opposed to mere reuse of a
//! shared sub-schema), and such nodes are extracted into `$defs` and
//! referenced by pointer. Nodes carrying a registry `id` are extracted
//! the same way under [`ReusePolicy::Ref`]; everything else reused is
//! inlined.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, json};
use tracing::debug;

use runtype_core::registry::Registry;
use runtype_core::schema::{Catchall, Def, Schema};
use runtype_core::value::Value;

use crate::error::ExportError;

/// How reused (but acyclic) sub-schemas are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReusePolicy {
    /// Duplicate the rendered schema at every use site.
    #[default]
    Inline,
    /// Extract registry-id nodes into `$defs` and `$ref` them.
    Ref,
}

/// What to do with schema kinds JSON Schema cannot express (bigint, map,
/// set, transform outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnrepresentableBehavior {
    /// Fail the export.
    #[default]
    Error,
    /// Emit the empty schema `{}`, which accepts anything.
    Any,
}

/// Export configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions<'a> {
    /// Metadata source for titles, descriptions, and `$defs` ids.
    pub registry: Option<&'a Registry>,
    /// Reuse rendering policy.
    pub reuse: ReusePolicy,
    /// Handling of inexpressible kinds.
    pub unrepresentable: UnrepresentableBehavior,
}

enum NodeState {
    InProgress,
    Done(serde_json::Value),
}

struct Exporter<'a> {
    options: ExportOptions<'a>,
    states: HashMap<usize, NodeState>,
    cyclic: HashSet<usize>,
    names: HashMap<usize, String>,
    defs: Map<String, serde_json::Value>,
    anonymous: usize,
}

fn key_of(schema: &Arc<Schema>) -> usize {
    Arc::as_ptr(schema) as usize
}

fn ref_to(name: &str) -> serde_json::Value {
    json!({ "$ref": format!("#/$defs/{name}") })
}

fn to_json(value: &Value) -> Result<serde_json::Value, ExportError> {
    serde_json::Value::try_from(value.clone()).map_err(|e| ExportError::Value(e.to_string()))
}

impl<'a> Exporter<'a> {
    fn new(options: ExportOptions<'a>) -> Self {
        Exporter {
            options,
            states: HashMap::new(),
            cyclic: HashSet::new(),
            names: HashMap::new(),
            defs: Map::new(),
            anonymous: 0,
        }
    }

    fn direct_id(&self, schema: &Arc<Schema>) -> Option<String> {
        self.options
            .registry
            .and_then(|registry| registry.get(schema))
            .and_then(|entry| entry.id.clone())
    }

    fn assign_name(&mut self, schema: &Arc<Schema>, key: usize) -> String {
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        let mut name = self.direct_id(schema).unwrap_or_else(|| {
            self.anonymous += 1;
            format!("__schema{}", self.anonymous)
        });
        while self.names.values().any(|taken| taken == &name) {
            name.push('_');
        }
        self.names.insert(key, name.clone());
        name
    }

    fn unrepresentable(&self, kind: &'static str) -> Result<serde_json::Value, ExportError> {
        match self.options.unrepresentable {
            UnrepresentableBehavior::Error => Err(ExportError::Unrepresentable(kind)),
            UnrepresentableBehavior::Any => Ok(json!({})),
        }
    }

    fn convert(&mut self, schema: &Arc<Schema>) -> Result<serde_json::Value, ExportError> {
        let key = key_of(schema);
        if let Some(name) = self.names.get(&key) {
            return Ok(ref_to(name));
        }
        match self.states.get(&key) {
            Some(NodeState::InProgress) => {
                debug!(kind = schema.kind_name(), "reference cycle detected");
                self.cyclic.insert(key);
                let name = self.assign_name(schema, key);
                return Ok(ref_to(&name));
            }
            Some(NodeState::Done(body)) => return Ok(body.clone()),
            None => {}
        }

        self.states.insert(key, NodeState::InProgress);
        let mut body = self.convert_def(schema)?;
        self.apply_metadata(schema, &mut body)?;

        let wants_def = self.cyclic.contains(&key)
            || (self.options.reuse == ReusePolicy::Ref && self.direct_id(schema).is_some());
        if wants_def {
            let name = self.assign_name(schema, key);
            self.defs.insert(name.clone(), body);
            Ok(ref_to(&name))
        } else {
            self.states.insert(key, NodeState::Done(body.clone()));
            Ok(body)
        }
    }

    fn apply_metadata(
        &self,
        schema: &Arc<Schema>,
        body: &mut serde_json::Value,
    ) -> Result<(), ExportError> {
        let Some(registry) = self.options.registry else {
            return Ok(());
        };
        let Some(map) = body.as_object_mut() else {
            return Ok(());
        };
        let entry = registry.resolve(schema);
        if let Some(title) = entry.title {
            map.insert("title".to_string(), json!(title));
        }
        if let Some(description) = entry.description {
            map.insert("description".to_string(), json!(description));
        }
        if !entry.examples.is_empty() {
            let examples: Vec<serde_json::Value> = entry
                .examples
                .iter()
                .map(to_json)
                .collect::<Result<_, _>>()?;
            map.insert("examples".to_string(), json!(examples));
        }
        for (key, value) in entry.extra {
            map.entry(key).or_insert(value);
        }
        Ok(())
    }

    fn convert_def(&mut self, schema: &Arc<Schema>) -> Result<serde_json::Value, ExportError> {
        let bag = schema.bag();
        match schema.def() {
            Def::String { .. } => {
                let mut out = Map::new();
                out.insert("type".to_string(), json!("string"));
                if let Some(min) = bag.min_length {
                    out.insert("minLength".to_string(), json!(min));
                }
                if let Some(max) = bag.max_length {
                    out.insert("maxLength".to_string(), json!(max));
                }
                if let Some(pattern) = &bag.pattern {
                    out.insert("pattern".to_string(), json!(pattern));
                }
                if let Some(format) = bag.format {
                    out.insert("format".to_string(), json!(format.name()));
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Number { .. } => {
                let mut out = Map::new();
                out.insert("type".to_string(), json!("number"));
                if let Some(bound) = &bag.minimum {
                    let keyword = if bound.inclusive { "minimum" } else { "exclusiveMinimum" };
                    out.insert(keyword.to_string(), json!(bound.value));
                }
                if let Some(bound) = &bag.maximum {
                    let keyword = if bound.inclusive { "maximum" } else { "exclusiveMaximum" };
                    out.insert(keyword.to_string(), json!(bound.value));
                }
                if let Some(divisor) = bag.multiple_of {
                    out.insert("multipleOf".to_string(), json!(divisor));
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Boolean { .. } => Ok(json!({ "type": "boolean" })),
            Def::BigInt => self.unrepresentable("bigint"),
            Def::Date => Ok(json!({ "type": "string", "format": "date-time" })),
            Def::Literal(value) => Ok(json!({ "const": to_json(value)? })),
            Def::Enum(values) => {
                let rendered: Vec<serde_json::Value> =
                    values.iter().map(to_json).collect::<Result<_, _>>()?;
                Ok(json!({ "enum": rendered }))
            }
            Def::Any => Ok(json!({})),
            Def::Object { shape, catchall } => {
                let mut properties = Map::with_capacity(shape.len());
                let mut required = Vec::new();
                for (name, prop) in shape {
                    properties.insert(name.clone(), self.convert(prop)?);
                    if !prop.accepts_undefined_input() {
                        required.push(name.clone());
                    }
                }
                let mut out = Map::new();
                out.insert("type".to_string(), json!("object"));
                out.insert("properties".to_string(), serde_json::Value::Object(properties));
                if !required.is_empty() {
                    out.insert("required".to_string(), json!(required));
                }
                match catchall {
                    Catchall::Loose => {}
                    Catchall::Strict => {
                        out.insert("additionalProperties".to_string(), json!(false));
                    }
                    Catchall::Schema(rest) => {
                        out.insert("additionalProperties".to_string(), self.convert(rest)?);
                    }
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Array { element } => {
                let mut out = Map::new();
                out.insert("type".to_string(), json!("array"));
                out.insert("items".to_string(), self.convert(element)?);
                if let Some(min) = bag.min_length {
                    out.insert("minItems".to_string(), json!(min));
                }
                if let Some(max) = bag.max_length {
                    out.insert("maxItems".to_string(), json!(max));
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Tuple { items, rest } => {
                let prefix: Vec<serde_json::Value> = items
                    .iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<_, _>>()?;
                let required = items.len()
                    - items
                        .iter()
                        .rev()
                        .take_while(|slot| slot.accepts_undefined_input())
                        .count();
                let mut out = Map::new();
                out.insert("type".to_string(), json!("array"));
                out.insert("prefixItems".to_string(), json!(prefix));
                out.insert(
                    "items".to_string(),
                    match rest {
                        Some(rest) => self.convert(rest)?,
                        None => json!(false),
                    },
                );
                if required > 0 {
                    out.insert("minItems".to_string(), json!(required));
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Union { options } | Def::DiscriminatedUnion { options, .. } => {
                let rendered: Vec<serde_json::Value> = options
                    .iter()
                    .map(|option| self.convert(option))
                    .collect::<Result<_, _>>()?;
                Ok(json!({ "anyOf": rendered }))
            }
            Def::Intersection { left, right } => {
                let rendered = vec![self.convert(left)?, self.convert(right)?];
                Ok(json!({ "allOf": rendered }))
            }
            Def::Record { key, value } => {
                let mut out = Map::new();
                out.insert("type".to_string(), json!("object"));
                out.insert("additionalProperties".to_string(), self.convert(value)?);
                // A key schema that is more than a bare string is worth
                // surfacing as propertyNames.
                if !matches!(key.def(), Def::String { .. }) || !key.checks().is_empty() {
                    out.insert("propertyNames".to_string(), self.convert(key)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            Def::Map { .. } => self.unrepresentable("map"),
            Def::Set { .. } => self.unrepresentable("set"),
            Def::Optional { inner } => self.convert(inner),
            Def::Nullable { inner } | Def::Nullish { inner } => {
                let rendered = vec![self.convert(inner)?, json!({ "type": "null" })];
                Ok(json!({ "anyOf": rendered }))
            }
            Def::Default { inner, default } | Def::Prefault { inner, default } => {
                let mut body = self.convert(inner)?;
                if let Some(map) = body.as_object_mut() {
                    map.insert("default".to_string(), to_json(default)?);
                }
                Ok(body)
            }
            Def::Catch { inner, .. } | Def::NonOptional { inner } => self.convert(inner),
            Def::Pipe { left, right } => {
                // A pipe ending in a transform describes the left stage's
                // accepted input; the transform itself has no schema.
                if matches!(right.def(), Def::Transform { .. }) {
                    return self.convert(left);
                }
                let rendered = vec![self.convert(left)?, self.convert(right)?];
                Ok(json!({ "allOf": rendered }))
            }
            Def::Transform { .. } => self.unrepresentable("transform"),
            Def::Readonly { inner } => {
                let mut body = self.convert(inner)?;
                if let Some(map) = body.as_object_mut() {
                    map.insert("readOnly".to_string(), json!(true));
                }
                Ok(body)
            }
            Def::Lazy { slot } => match slot.get() {
                Some(inner) => self.convert(inner),
                None => Err(ExportError::UnresolvedLazy),
            },
        }
    }
}

/// Renders one schema graph as a JSON Schema document.
///
/// Shared sub-schemas are rendered once and memoized; cyclic ones land in
/// a `$defs` section at the document root.
pub fn to_json_schema(
    schema: &Arc<Schema>,
    options: &ExportOptions<'_>,
) -> Result<serde_json::Value, ExportError> {
    let mut exporter = Exporter::new(*options);
    let mut root = exporter.convert(schema)?;
    if !exporter.defs.is_empty() {
        if let Some(map) = root.as_object_mut() {
            map.insert(
                "$defs".to_string(),
                serde_json::Value::Object(exporter.defs),
            );
        }
    }
    Ok(root)
}

/// Renders every registry entry carrying an `id` into one document of the
/// form `{"$defs": {...}}`, with cross-references between entries.
pub fn registry_to_json_schema(
    registry: &Registry,
    options: &ExportOptions<'_>,
) -> Result<serde_json::Value, ExportError> {
    let mut options = *options;
    options.registry = Some(registry);
    options.reuse = ReusePolicy::Ref;
    let mut exporter = Exporter::new(options);

    // Deterministic output: walk id-carrying entries in id order.
    let mut roots: Vec<(&String, &Arc<Schema>)> = registry
        .iter()
        .filter_map(|(schema, entry)| entry.id.as_ref().map(|id| (id, schema)))
        .collect();
    roots.sort_by(|a, b| a.0.cmp(b.0));

    for (_, schema) in roots {
        exporter.convert(schema)?;
    }
    Ok(json!({ "$defs": serde_json::Value::Object(exporter.defs) }))
}
