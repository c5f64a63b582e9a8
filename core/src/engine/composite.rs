//! Structural schema kinds: object, array, tuple, unions, intersection,
//! record, map, set.
//!
//! Each validator constructs child payloads, runs them in declaration
//! order, and splices child issues back into the parent with the child's
//! path segment prefixed.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::ExecError;
use crate::issue::{Issue, IssueCode, PathSegment};
use crate::schema::{Catchall, Def, ObjectShape, Schema, discriminator_keys, literal_key};
use crate::value::Value;

use super::primitive::push_type_issue;
use super::{Payload, run};

pub(super) fn splice(payload: &mut Payload, issues: Vec<Issue>, segment: PathSegment) {
    payload
        .issues
        .extend(issues.into_iter().map(|issue| issue.prefixed(segment.clone())));
}

pub(super) fn parse_object(
    schema: &Schema,
    shape: &ObjectShape,
    catchall: &Catchall,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let mut input = match payload.value.take() {
        Value::Object(map) => map,
        other => {
            payload.value = other;
            push_type_issue(schema, payload, "object");
            return Ok(());
        }
    };

    let mut output = IndexMap::with_capacity(shape.len());
    for (key, prop) in shape {
        let (present, value) = match input.shift_remove(key) {
            Some(v) => (true, v),
            None => (false, Value::Undefined),
        };
        let mut child = Payload::new(value);
        run(prop, &mut child)?;

        if !child.issues.is_empty()
            && !present
            && prop.accepts_undefined_input()
            && prop.produces_undefined_output()
        {
            // Genuinely absent optional property: suppress the failure and
            // leave the key absent in the output.
            continue;
        }
        splice(payload, child.issues, PathSegment::Key(key.clone()));

        if child.value.is_undefined() {
            // Distinguish "key absent" from "key present with undefined".
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
                run(rest, &mut child)?;
                splice(payload, child.issues, PathSegment::Key(key.clone()));
                output.insert(key, child.value);
            }
        }
    }

    payload.value = Value::Object(output);
    Ok(())
}

pub(super) fn parse_array(
    schema: &Schema,
    element: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
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
        run(element, &mut child)?;
        splice(payload, child.issues, PathSegment::Index(index));
        output.push(child.value);
    }
    payload.value = Value::Array(output);
    Ok(())
}

pub(super) fn parse_tuple(
    schema: &Schema,
    items: &[std::sync::Arc<Schema>],
    rest: Option<&std::sync::Arc<Schema>>,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let input = match payload.value.take() {
        Value::Array(items) => items,
        other => {
            payload.value = other;
            push_type_issue(schema, payload, "tuple");
            return Ok(());
        }
    };

    // Trailing optional slots lower the minimum length; a rest schema
    // removes the maximum.
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
        run(slot, &mut child)?;
        splice(payload, child.issues, PathSegment::Index(index));
        output.push(child.value);
    }
    payload.value = Value::Array(output);
    Ok(())
}

pub(super) fn parse_union(
    schema: &Schema,
    options: &[std::sync::Arc<Schema>],
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let input = payload.value.clone();
    let mut failures = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let mut child = Payload::new(input.clone());
        run(option, &mut child)?;
        if child.issues.is_empty() {
            trace!(option = index, "union option matched");
            payload.value = child.value;
            return Ok(());
        }
        failures.push(child.issues);
    }
    let issue = schema.make_issue(IssueCode::InvalidUnion { options: failures }, input);
    payload.issues.push(issue);
    Ok(())
}

pub(super) fn parse_discriminated_union(
    schema: &Schema,
    discriminator: &str,
    options: &[std::sync::Arc<Schema>],
    lookup: &OnceCell<HashMap<String, usize>>,
    fallback: bool,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let tag = match &payload.value {
        Value::Object(map) => map.get(discriminator).cloned().unwrap_or(Value::Undefined),
        _ => {
            push_type_issue(schema, payload, "object");
            return Ok(());
        }
    };

    let table = lookup.get_or_init(|| {
        debug!(
            discriminator,
            options = options.len(),
            "building discriminated-union dispatch map"
        );
        let mut table = HashMap::new();
        for (index, option) in options.iter().enumerate() {
            let Def::Object { shape, .. } = option.def() else {
                continue;
            };
            let Some(prop) = shape.get(discriminator) else {
                continue;
            };
            if let Some(keys) = discriminator_keys(prop) {
                for key in keys {
                    table.insert(key, index);
                }
            }
        }
        table
    });

    match literal_key(&tag).and_then(|key| table.get(&key).copied()) {
        Some(index) => run(&options[index], payload),
        None if fallback => parse_union(schema, options, payload),
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

/// Deep-structural merge of two intersection outputs.
///
/// A conflict here is a schema-modeling bug, not bad input, so the caller
/// escalates it to [`ExecError::IntersectionConflict`].
pub(super) fn merge_values(a: &Value, b: &Value) -> Result<Value, String> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            let mut out = x.clone();
            for (key, bv) in y {
                let merged = match out.get(key) {
                    Some(av) => merge_values(av, bv)?,
                    None => bv.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Ok(Value::Object(out))
        }
        (Value::Array(x), Value::Array(y)) => {
            if x.len() != y.len() {
                return Err(format!(
                    "arrays of different lengths ({} vs {})",
                    x.len(),
                    y.len()
                ));
            }
            x.iter()
                .zip(y)
                .map(|(av, bv)| merge_values(av, bv))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        _ if a == b => Ok(a.clone()),
        _ => Err(format!(
            "cannot merge {} with {}",
            a.type_name(),
            b.type_name()
        )),
    }
}

pub(super) fn parse_intersection(
    left: &Schema,
    right: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let input = payload.value.take();
    let mut left_payload = Payload::new(input.clone());
    run(left, &mut left_payload)?;
    let mut right_payload = Payload::new(input);
    run(right, &mut right_payload)?;

    if left_payload.issues.is_empty() && right_payload.issues.is_empty() {
        match merge_values(&left_payload.value, &right_payload.value) {
            Ok(merged) => payload.value = merged,
            Err(conflict) => return Err(ExecError::IntersectionConflict(conflict)),
        }
    } else {
        // With issues to explain the failure, the merge is skipped and the
        // issues alone are reported.
        payload.value = left_payload.value;
        payload.issues.extend(left_payload.issues);
        payload.issues.extend(right_payload.issues);
    }
    Ok(())
}

pub(super) fn parse_record(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let mut input = match payload.value.take() {
        Value::Object(map) => map,
        other => {
            payload.value = other;
            push_type_issue(schema, payload, "object");
            return Ok(());
        }
    };

    let mut output = IndexMap::with_capacity(input.len());

    if let Some(values) = &key_schema.bag().values {
        // Closed-domain optimization: the key schema enumerates its values,
        // so only known keys are iterated and the rest are flagged.
        let known: Vec<String> = values
            .iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        for key in &known {
            let (present, value) = match input.shift_remove(key) {
                Some(v) => (true, v),
                None => (false, Value::Undefined),
            };
            let mut child = Payload::new(value);
            run(value_schema, &mut child)?;
            if !child.issues.is_empty()
                && !present
                && value_schema.accepts_undefined_input()
                && value_schema.produces_undefined_output()
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
        if !input.is_empty() {
            let keys: Vec<String> = input.keys().cloned().collect();
            let issue = schema.make_issue(
                IssueCode::UnrecognizedKeys { keys },
                Value::Object(input.clone()),
            );
            payload.issues.push(issue);
        }
    } else {
        for (key, value) in input {
            let mut key_payload = Payload::new(Value::String(key.clone()));
            run(key_schema, &mut key_payload)?;
            let output_key = if key_payload.issues.is_empty() {
                // Key checks may rewrite the key (trimming etc.).
                match key_payload.value {
                    Value::String(s) => s,
                    _ => key.clone(),
                }
            } else {
                let mut issue = schema.make_issue(
                    IssueCode::InvalidKey {
                        issues: key_payload.issues,
                    },
                    Value::String(key.clone()),
                );
                issue.path.push(PathSegment::Key(key.clone()));
                payload.issues.push(issue);
                key.clone()
            };

            let mut child = Payload::new(value);
            run(value_schema, &mut child)?;
            splice(payload, child.issues, PathSegment::Key(key.clone()));
            output.insert(output_key, child.value);
        }
    }

    payload.value = Value::Object(output);
    Ok(())
}

pub(super) fn parse_map(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let entries = match payload.value.take() {
        Value::Map(entries) => entries,
        other => {
            payload.value = other;
            push_type_issue(schema, payload, "map");
            return Ok(());
        }
    };

    let mut output = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        // Container keys need not be strings, so failures attribute the
        // offending entry through the issue input rather than a path
        // segment.
        let mut key_payload = Payload::new(key.clone());
        run(key_schema, &mut key_payload)?;
        if !key_payload.issues.is_empty() {
            let issue = schema.make_issue(
                IssueCode::InvalidKey {
                    issues: key_payload.issues,
                },
                key.clone(),
            );
            payload.issues.push(issue);
        }

        let original = value.clone();
        let mut value_payload = Payload::new(value);
        run(value_schema, &mut value_payload)?;
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

pub(super) fn parse_set(
    schema: &Schema,
    element: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
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
        run(element, &mut child)?;
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
