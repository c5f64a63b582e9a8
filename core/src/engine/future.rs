//! Asynchronous execution twin.
//!
//! Mirrors the synchronous engine node for node: children are awaited in
//! declaration order, so the issue list an async parse produces is
//! identical to what the synchronous parse would produce for the same
//! schema and input (modulo the asynchronous work itself). Leaf parsing
//! and check policy are shared with the synchronous path; only the
//! recursion is rewritten around `await`.

use std::future::Future;
use std::pin::Pin;

use crate::error::ExecError;
use crate::issue::{IssueCode, PathSegment};
use crate::schema::{Catchall, Def, Schema, Transformer, literal_key};
use crate::value::Value;

use super::composite::{merge_values, splice};
use super::primitive::push_type_issue;
use super::{Payload, checks, primitive};

/// A boxed, sendable future; the shape asynchronous predicates and
/// transforms return.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs one node asynchronously: its own parse, then its checks.
pub(crate) fn run_async<'a>(
    schema: &'a Schema,
    payload: &'a mut Payload,
) -> BoxFuture<'a, Result<(), ExecError>> {
    Box::pin(async move {
        let before = payload.issues.len();
        parse_node_async(schema, payload).await?;
        checks::run_checks_async(schema, payload, before).await
    })
}

async fn parse_node_async(schema: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
    match schema.def() {
        Def::String { .. }
        | Def::Number { .. }
        | Def::Boolean { .. }
        | Def::BigInt
        | Def::Date
        | Def::Literal(_)
        | Def::Enum(_)
        | Def::Any => {
            primitive::parse_primitive(schema, payload);
            Ok(())
        }
        Def::Object { shape, catchall } => {
            let mut input = match payload.value.take() {
                Value::Object(map) => map,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "object");
                    return Ok(());
                }
            };
            let mut output = indexmap::IndexMap::with_capacity(shape.len());
            for (key, prop) in shape {
                let (present, value) = match input.shift_remove(key) {
                    Some(v) => (true, v),
                    None => (false, Value::Undefined),
                };
                let mut child = Payload::new(value);
                run_async(prop, &mut child).await?;
                if !child.issues.is_empty()
                    && !present
                    && prop.accepts_undefined_input()
                    && prop.produces_undefined_output()
                {
                    continue;
                }
                splice(payload, child.issues, PathSegment::Key(key.clone()));
                if child.value.is_undefined() {
                    if present {
                        output.insert(key.clone(), Value::Undefined);
                    }
                } else {
                    output.insert(key.clone(), child.value);
                }
            }
            match catchall {
                Catchall::Loose => {}
                Catchall::Strict => {
                    if !input.is_empty() {
                        let keys: Vec<String> = input.keys().cloned().collect();
                        let issue = schema.make_issue(
                            IssueCode::UnrecognizedKeys { keys },
                            Value::Object(input.clone()),
                        );
                        payload.issues.push(issue);
                    }
                }
                Catchall::Schema(rest) => {
                    for (key, value) in input {
                        let mut child = Payload::new(value);
                        run_async(rest, &mut child).await?;
                        splice(payload, child.issues, PathSegment::Key(key.clone()));
                        output.insert(key, child.value);
                    }
                }
            }
            payload.value = Value::Object(output);
            Ok(())
        }
        Def::Array { element } => {
            let items = match payload.value.take() {
                Value::Array(items) => items,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "array");
                    return Ok(());
                }
            };
            let mut output = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let mut child = Payload::new(item);
                run_async(element, &mut child).await?;
                splice(payload, child.issues, PathSegment::Index(index));
                output.push(child.value);
            }
            payload.value = Value::Array(output);
            Ok(())
        }
        Def::Tuple { items, rest } => {
            let input = match payload.value.take() {
                Value::Array(items) => items,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "tuple");
                    return Ok(());
                }
            };
            let required = items.len()
                - items
                    .iter()
                    .rev()
                    .take_while(|slot| slot.accepts_undefined_input())
                    .count();
            if input.len() < required {
                let issue = schema.make_issue(
                    IssueCode::TooSmall {
                        minimum: required as f64,
                        inclusive: true,
                    },
                    Value::Array(input.clone()),
                );
                payload.issues.push(issue);
            }
            if rest.is_none() && input.len() > items.len() {
                let issue = schema.make_issue(
                    IssueCode::TooBig {
                        maximum: items.len() as f64,
                        inclusive: true,
                    },
                    Value::Array(input.clone()),
                );
                payload.issues.push(issue);
            }
            let mut output = Vec::with_capacity(input.len());
            for (index, item) in input.into_iter().enumerate() {
                let slot = match items.get(index) {
                    Some(slot) => slot,
                    None => match rest {
                        Some(rest) => rest,
                        None => continue,
                    },
                };
                let mut child = Payload::new(item);
                run_async(slot, &mut child).await?;
                splice(payload, child.issues, PathSegment::Index(index));
                output.push(child.value);
            }
            payload.value = Value::Array(output);
            Ok(())
        }
        Def::Union { options } => {
            let input = payload.value.clone();
            let mut failures = Vec::with_capacity(options.len());
            for option in options {
                let mut child = Payload::new(input.clone());
                run_async(option, &mut child).await?;
                if child.issues.is_empty() {
                    payload.value = child.value;
                    return Ok(());
                }
                failures.push(child.issues);
            }
            let issue = schema.make_issue(IssueCode::InvalidUnion { options: failures }, input);
            payload.issues.push(issue);
            Ok(())
        }
        Def::DiscriminatedUnion {
            discriminator,
            options,
            lookup,
            fallback,
        } => {
            let tag = match &payload.value {
                Value::Object(map) => {
                    map.get(discriminator).cloned().unwrap_or(Value::Undefined)
                }
                _ => {
                    push_type_issue(schema, payload, "object");
                    return Ok(());
                }
            };
            let table = lookup.get_or_init(|| {
                let mut table = std::collections::HashMap::new();
                for (index, option) in options.iter().enumerate() {
                    let Def::Object { shape, .. } = option.def() else {
                        continue;
                    };
                    let Some(prop) = shape.get(discriminator) else {
                        continue;
                    };
                    if let Some(keys) = crate::schema::discriminator_keys(prop) {
                        for key in keys {
                            table.insert(key, index);
                        }
                    }
                }
                table
            });
            match literal_key(&tag).and_then(|key| table.get(&key).copied()) {
                Some(index) => run_async(&options[index], payload).await,
                None if *fallback => {
                    let input = payload.value.clone();
                    let mut failures = Vec::with_capacity(options.len());
                    for option in options {
                        let mut child = Payload::new(input.clone());
                        run_async(option, &mut child).await?;
                        if child.issues.is_empty() {
                            payload.value = child.value;
                            return Ok(());
                        }
                        failures.push(child.issues);
                    }
                    let issue =
                        schema.make_issue(IssueCode::InvalidUnion { options: failures }, input);
                    payload.issues.push(issue);
                    Ok(())
                }
                None => {
                    let values: Vec<Value> = options
                        .iter()
                        .filter_map(|option| match option.def() {
                            Def::Object { shape, .. } => shape.get(discriminator),
                            _ => None,
                        })
                        .flat_map(|prop| match prop.def() {
                            Def::Literal(value) => vec![value.clone()],
                            Def::Enum(values) => values.clone(),
                            _ => Vec::new(),
                        })
                        .collect();
                    let mut issue = schema.make_issue(IssueCode::InvalidValue { values }, tag);
                    issue.path.push(PathSegment::Key(discriminator.to_string()));
                    payload.issues.push(issue);
                    Ok(())
                }
            }
        }
        Def::Intersection { left, right } => {
            let input = payload.value.take();
            let mut left_payload = Payload::new(input.clone());
            run_async(left, &mut left_payload).await?;
            let mut right_payload = Payload::new(input);
            run_async(right, &mut right_payload).await?;
            if left_payload.issues.is_empty() && right_payload.issues.is_empty() {
                match merge_values(&left_payload.value, &right_payload.value) {
                    Ok(merged) => payload.value = merged,
                    Err(conflict) => return Err(ExecError::IntersectionConflict(conflict)),
                }
            } else {
                payload.value = left_payload.value;
                payload.issues.extend(left_payload.issues);
                payload.issues.extend(right_payload.issues);
            }
            Ok(())
        }
        Def::Record { key, value } => {
            let mut input = match payload.value.take() {
                Value::Object(map) => map,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "object");
                    return Ok(());
                }
            };
            let mut output = indexmap::IndexMap::with_capacity(input.len());
            if let Some(values) = &key.bag().values {
                let known: Vec<String> = values
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect();
                for k in &known {
                    let (present, item) = match input.shift_remove(k) {
                        Some(v) => (true, v),
                        None => (false, Value::Undefined),
                    };
                    let mut child = Payload::new(item);
                    run_async(value, &mut child).await?;
                    if !child.issues.is_empty()
                        && !present
                        && value.accepts_undefined_input()
                        && value.produces_undefined_output()
                    {
                        continue;
                    }
                    splice(payload, child.issues, PathSegment::Key(k.clone()));
                    if child.value.is_undefined() {
                        if present {
                            output.insert(k.clone(), Value::Undefined);
                        }
                    } else {
                        output.insert(k.clone(), child.value);
                    }
                }
                if !input.is_empty() {
                    let keys: Vec<String> = input.keys().cloned().collect();
                    let issue = schema.make_issue(
                        IssueCode::UnrecognizedKeys { keys },
                        Value::Object(input.clone()),
                    );
                    payload.issues.push(issue);
                }
            } else {
                for (k, item) in input {
                    let mut key_payload = Payload::new(Value::String(k.clone()));
                    run_async(key, &mut key_payload).await?;
                    let output_key = if key_payload.issues.is_empty() {
                        match key_payload.value {
                            Value::String(s) => s,
                            _ => k.clone(),
                        }
                    } else {
                        let mut issue = schema.make_issue(
                            IssueCode::InvalidKey {
                                issues: key_payload.issues,
                            },
                            Value::String(k.clone()),
                        );
                        issue.path.push(PathSegment::Key(k.clone()));
                        payload.issues.push(issue);
                        k.clone()
                    };
                    let mut child = Payload::new(item);
                    run_async(value, &mut child).await?;
                    splice(payload, child.issues, PathSegment::Key(k.clone()));
                    output.insert(output_key, child.value);
                }
            }
            payload.value = Value::Object(output);
            Ok(())
        }
        Def::Map { key, value } => {
            let entries = match payload.value.take() {
                Value::Map(entries) => entries,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "map");
                    return Ok(());
                }
            };
            let mut output = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let mut key_payload = Payload::new(k.clone());
                run_async(key, &mut key_payload).await?;
                if !key_payload.issues.is_empty() {
                    let issue = schema.make_issue(
                        IssueCode::InvalidKey {
                            issues: key_payload.issues,
                        },
                        k.clone(),
                    );
                    payload.issues.push(issue);
                }
                let original = v.clone();
                let mut value_payload = Payload::new(v);
                run_async(value, &mut value_payload).await?;
                if !value_payload.issues.is_empty() {
                    let issue = schema.make_issue(
                        IssueCode::InvalidElement {
                            issues: value_payload.issues,
                        },
                        original,
                    );
                    payload.issues.push(issue);
                }
                output.push((key_payload.value, value_payload.value));
            }
            payload.value = Value::Map(output);
            Ok(())
        }
        Def::Set { element } => {
            let items = match payload.value.take() {
                Value::Set(items) => items,
                other => {
                    payload.value = other;
                    push_type_issue(schema, payload, "set");
                    return Ok(());
                }
            };
            let mut output = Vec::with_capacity(items.len());
            for item in items {
                let original = item.clone();
                let mut child = Payload::new(item);
                run_async(element, &mut child).await?;
                if !child.issues.is_empty() {
                    let issue = schema.make_issue(
                        IssueCode::InvalidElement {
                            issues: child.issues,
                        },
                        original,
                    );
                    payload.issues.push(issue);
                }
                output.push(child.value);
            }
            payload.value = Value::Set(output);
            Ok(())
        }
        Def::Optional { inner } => {
            if payload.value.is_undefined() && !inner.accepts_undefined_input() {
                return Ok(());
            }
            run_async(inner, payload).await
        }
        Def::Nullable { inner } => {
            if payload.value.is_null() && !inner.accepts_null_input() {
                return Ok(());
            }
            run_async(inner, payload).await
        }
        Def::Nullish { inner } => {
            if payload.value.is_undefined() && !inner.accepts_undefined_input() {
                return Ok(());
            }
            if payload.value.is_null() && !inner.accepts_null_input() {
                return Ok(());
            }
            run_async(inner, payload).await
        }
        Def::Default { inner, default } => {
            if payload.value.is_undefined() {
                payload.value = default.clone();
                return Ok(());
            }
            run_async(inner, payload).await
        }
        Def::Prefault { inner, default } => {
            if payload.value.is_undefined() {
                payload.value = default.clone();
            }
            run_async(inner, payload).await
        }
        Def::Catch { inner, fallback } => {
            let snapshot = payload.value.clone();
            let start = payload.issues.len();
            run_async(inner, payload).await?;
            if payload.issues.len() > start {
                let caught: Vec<_> = payload.issues.drain(start..).collect();
                payload.value = fallback(&snapshot, &caught);
            }
            Ok(())
        }
        Def::NonOptional { inner } => {
            let start = payload.issues.len();
            run_async(inner, payload).await?;
            if payload.value.is_undefined() && payload.issues.len() == start {
                let issue = schema.make_issue(
                    IssueCode::InvalidType {
                        expected: "!undefined".to_string(),
                        received: "undefined".to_string(),
                    },
                    Value::Undefined,
                );
                payload.issues.push(issue);
            }
            Ok(())
        }
        Def::Pipe { left, right } => {
            let start = payload.issues.len();
            run_async(left, payload).await?;
            if payload.aborted_since(start) {
                return Ok(());
            }
            run_async(right, payload).await
        }
        Def::Transform { transformer } => {
            match transformer {
                Transformer::Sync(f) => payload.value = f(payload.value.take()),
                Transformer::Async(f) => payload.value = f(payload.value.take()).await,
            }
            Ok(())
        }
        Def::Readonly { inner } => run_async(inner, payload).await,
        Def::Lazy { slot } => match slot.get() {
            Some(inner) => run_async(inner, payload).await,
            None => Err(ExecError::UnresolvedLazy),
        },
    }
}
