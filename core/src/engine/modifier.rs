//! Wrapper schema kinds: optional/nullable/nullish short-circuits,
//! default and prefault substitution, catch recovery, pipe and transform.

use crate::error::ExecError;
use crate::issue::IssueCode;
use crate::schema::{CatchFn, Schema, Transformer};
use crate::value::Value;

use super::{Payload, run};

pub(super) fn parse_optional(inner: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
    // Short-circuit on absence unless the inner schema has its own opinion
    // about `undefined` (a default, another optional layer, ...).
    if payload.value.is_undefined() && !inner.accepts_undefined_input() {
        return Ok(());
    }
    run(inner, payload)
}

pub(super) fn parse_nullable(inner: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
    if payload.value.is_null() && !inner.accepts_null_input() {
        return Ok(());
    }
    run(inner, payload)
}

pub(super) fn parse_nullish(inner: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
    if payload.value.is_undefined() && !inner.accepts_undefined_input() {
        return Ok(());
    }
    if payload.value.is_null() && !inner.accepts_null_input() {
        return Ok(());
    }
    run(inner, payload)
}

pub(super) fn parse_default(
    inner: &Schema,
    default: &Value,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    if payload.value.is_undefined() {
        // The default is trusted as-is; only real input is validated.
        payload.value = default.clone();
        return Ok(());
    }
    run(inner, payload)
}

pub(super) fn parse_prefault(
    inner: &Schema,
    default: &Value,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    if payload.value.is_undefined() {
        payload.value = default.clone();
    }
    run(inner, payload)
}

pub(super) fn parse_catch(
    inner: &Schema,
    fallback: &CatchFn,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let snapshot = payload.value.clone();
    let start = payload.issues.len();
    run(inner, payload)?;
    if payload.issues.len() > start {
        let caught: Vec<_> = payload.issues.drain(start..).collect();
        payload.value = fallback(&snapshot, &caught);
    }
    Ok(())
}

pub(super) fn parse_non_optional(
    schema: &Schema,
    inner: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let start = payload.issues.len();
    run(inner, payload)?;
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

pub(super) fn parse_pipe(
    left: &Schema,
    right: &Schema,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    let start = payload.issues.len();
    run(left, payload)?;
    if payload.aborted_since(start) {
        return Ok(());
    }
    run(right, payload)
}

pub(super) fn parse_transform(
    transformer: &Transformer,
    payload: &mut Payload,
) -> Result<(), ExecError> {
    match transformer {
        Transformer::Sync(f) => {
            payload.value = f(payload.value.take());
            Ok(())
        }
        Transformer::Async(_) => Err(ExecError::AsyncInSyncContext),
    }
}
