//! Derived object operations: pick, omit, extend, merge, partial,
//! required.
//!
//! Each produces a fresh object schema from an existing one. The result
//! keeps the source's unknown-key policy, drops the source's attached
//! checks (they were written against the original shape), and records the
//! source as its origin so registry metadata resolution can walk back to
//! it.

use std::sync::Arc;

use crate::error::SchemaError;
use crate::schema::{Catchall, Def, ObjectShape, Schema, non_optional, optional};

fn object_parts<'a>(
    source: &'a Arc<Schema>,
    op: &'static str,
) -> Result<(&'a ObjectShape, &'a Catchall), SchemaError> {
    match source.def() {
        Def::Object { shape, catchall } => Ok((shape, catchall)),
        _ => Err(SchemaError::ExpectedObjectSchema(op)),
    }
}

fn assemble(source: &Arc<Schema>, shape: ObjectShape, catchall: Catchall) -> Schema {
    Schema::object_from_shape(shape, catchall).with_origin(source.clone())
}

/// Object schema with only the named keys of `source`.
///
/// Naming a key the source does not have is a definition error.
pub fn pick(source: &Arc<Schema>, keys: &[&str]) -> Result<Schema, SchemaError> {
    let (shape, catchall) = object_parts(source, "pick")?;
    let mut picked = ObjectShape::with_capacity(keys.len());
    for key in keys {
        match shape.get(*key) {
            Some(prop) => {
                picked.insert((*key).to_string(), prop.clone());
            }
            None => return Err(SchemaError::UnknownKey((*key).to_string())),
        }
    }
    Ok(assemble(source, picked, catchall.clone()))
}

/// Object schema with the named keys of `source` removed.
pub fn omit(source: &Arc<Schema>, keys: &[&str]) -> Result<Schema, SchemaError> {
    let (shape, catchall) = object_parts(source, "omit")?;
    for key in keys {
        if !shape.contains_key(*key) {
            return Err(SchemaError::UnknownKey((*key).to_string()));
        }
    }
    let remaining: ObjectShape = shape
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, prop)| (key.clone(), prop.clone()))
        .collect();
    Ok(assemble(source, remaining, catchall.clone()))
}

/// Object schema extending `source` with additional properties; a
/// property named like an existing one replaces it in place.
pub fn extend<K, S, I>(source: &Arc<Schema>, additions: I) -> Result<Schema, SchemaError>
where
    K: Into<String>,
    S: Into<Arc<Schema>>,
    I: IntoIterator<Item = (K, S)>,
{
    let (shape, catchall) = object_parts(source, "extend")?;
    let mut extended = shape.clone();
    for (key, prop) in additions {
        extended.insert(key.into(), prop.into());
    }
    Ok(assemble(source, extended, catchall.clone()))
}

/// Object schema combining the shapes of `left` and `right`; on key
/// collisions `right` wins. The result inherits `left`'s unknown-key
/// policy and origin.
pub fn merge(left: &Arc<Schema>, right: &Arc<Schema>) -> Result<Schema, SchemaError> {
    let (left_shape, catchall) = object_parts(left, "merge")?;
    let (right_shape, _) = object_parts(right, "merge")?;
    let mut merged = left_shape.clone();
    for (key, prop) in right_shape {
        merged.insert(key.clone(), prop.clone());
    }
    Ok(assemble(left, merged, catchall.clone()))
}

fn wrap_props<F>(
    source: &Arc<Schema>,
    keys: Option<&[&str]>,
    op: &'static str,
    wrap: F,
) -> Result<Schema, SchemaError>
where
    F: Fn(&Arc<Schema>) -> Arc<Schema>,
{
    let (shape, catchall) = object_parts(source, op)?;
    if let Some(keys) = keys {
        for key in keys {
            if !shape.contains_key(*key) {
                return Err(SchemaError::UnknownKey((*key).to_string()));
            }
        }
    }
    let wrapped: ObjectShape = shape
        .iter()
        .map(|(key, prop)| {
            let applies = keys.is_none_or(|keys| keys.contains(&key.as_str()));
            let prop = if applies { wrap(prop) } else { prop.clone() };
            (key.clone(), prop)
        })
        .collect();
    Ok(assemble(source, wrapped, catchall.clone()))
}

/// Object schema with properties made optional — all of them, or only the
/// named keys. Already-optional properties are left alone.
pub fn partial(source: &Arc<Schema>, keys: Option<&[&str]>) -> Result<Schema, SchemaError> {
    wrap_props(source, keys, "partial", |prop| {
        if matches!(prop.def(), Def::Optional { .. }) {
            prop.clone()
        } else {
            Arc::new(optional(prop.clone()))
        }
    })
}

/// Object schema with properties made required — all of them, or only the
/// named keys. Properties that already reject `undefined` are left alone.
pub fn required(source: &Arc<Schema>, keys: Option<&[&str]>) -> Result<Schema, SchemaError> {
    wrap_props(source, keys, "required", |prop| {
        if prop.accepts_undefined_input() {
            Arc::new(non_optional(prop.clone()))
        } else {
            prop.clone()
        }
    })
}
