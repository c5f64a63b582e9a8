//! Runs a node's attached checks after its own parse.
//!
//! Checks run in attachment order. Once the payload is aborted (by the
//! node parse or by a failing `.aborting()` check), remaining checks are
//! skipped unless marked `.always()`. Checks against a value the rule does
//! not apply to (a `min_length` on a number, say) are skipped silently;
//! the node parse has already reported the type mismatch.

use crate::error::ExecError;
use crate::issue::IssueCode;
use crate::metadata::Bound;
use crate::schema::Schema;
use crate::value::Value;

use super::Payload;
use crate::check::{Check, CheckKind};

pub(crate) fn run_checks(
    schema: &Schema,
    payload: &mut Payload,
    before: usize,
) -> Result<(), ExecError> {
    let mut aborted = payload.aborted_since(before);
    for check in schema.checks() {
        if aborted && !check.always_run {
            continue;
        }
        if let Some(when) = &check.when {
            if !when(&payload.value) {
                continue;
            }
        }
        let failed = apply(schema, check, payload)?;
        if failed && check.abort {
            aborted = true;
        }
    }
    Ok(())
}

/// Numeric magnitude of a value for ordered comparisons; dates compare by
/// epoch milliseconds.
fn magnitude(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::BigInt(n) => Some(*n as f64),
        Value::Date(d) => Some(d.timestamp_millis() as f64),
        _ => None,
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn size(value: &Value) -> Option<usize> {
    match value {
        Value::Map(entries) => Some(entries.len()),
        Value::Set(items) => Some(items.len()),
        _ => None,
    }
}

fn push_failure(schema: &Schema, check: &Check, payload: &mut Payload, code: IssueCode) -> bool {
    let mut issue = schema.make_check_issue(check, code, payload.value.clone());
    issue.can_continue = !check.abort;
    payload.issues.push(issue);
    true
}

/// Applies one check; returns whether it failed.
fn apply(schema: &Schema, check: &Check, payload: &mut Payload) -> Result<bool, ExecError> {
    let failed = match check.kind() {
        CheckKind::MinValue {
            bound: Bound { value, inclusive },
        } => match magnitude(&payload.value) {
            Some(m) if (*inclusive && m < *value) || (!*inclusive && m <= *value) => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooSmall {
                    minimum: *value,
                    inclusive: *inclusive,
                },
            ),
            _ => false,
        },
        CheckKind::MaxValue {
            bound: Bound { value, inclusive },
        } => match magnitude(&payload.value) {
            Some(m) if (*inclusive && m > *value) || (!*inclusive && m >= *value) => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooBig {
                    maximum: *value,
                    inclusive: *inclusive,
                },
            ),
            _ => false,
        },
        CheckKind::MultipleOf { divisor } => match payload.value {
            Value::Number(n) if n % divisor != 0.0 => push_failure(
                schema,
                check,
                payload,
                IssueCode::NotMultipleOf { divisor: *divisor },
            ),
            _ => false,
        },
        CheckKind::MinLength { min } => match length(&payload.value) {
            Some(len) if len < *min => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooSmall {
                    minimum: *min as f64,
                    inclusive: true,
                },
            ),
            _ => false,
        },
        CheckKind::MaxLength { max } => match length(&payload.value) {
            Some(len) if len > *max => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooBig {
                    maximum: *max as f64,
                    inclusive: true,
                },
            ),
            _ => false,
        },
        CheckKind::MinSize { min } => match size(&payload.value) {
            Some(len) if len < *min => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooSmall {
                    minimum: *min as f64,
                    inclusive: true,
                },
            ),
            _ => false,
        },
        CheckKind::MaxSize { max } => match size(&payload.value) {
            Some(len) if len > *max => push_failure(
                schema,
                check,
                payload,
                IssueCode::TooBig {
                    maximum: *max as f64,
                    inclusive: true,
                },
            ),
            _ => false,
        },
        CheckKind::Pattern { regex } => match &payload.value {
            Value::String(s) if !regex.is_match(s) => {
                let code = IssueCode::InvalidFormat {
                    format: "regex".to_string(),
                    pattern: Some(regex.as_str().to_string()),
                };
                push_failure(schema, check, payload, code)
            }
            _ => false,
        },
        CheckKind::Format { format } => match &payload.value {
            Value::String(s) if !format.validate(s) => {
                let code = IssueCode::InvalidFormat {
                    format: format.name().to_string(),
                    pattern: format.pattern().map(str::to_string),
                };
                push_failure(schema, check, payload, code)
            }
            _ => false,
        },
        CheckKind::Trim => {
            if let Value::String(s) = &mut payload.value {
                *s = s.trim().to_string();
            }
            false
        }
        CheckKind::Lowercase => {
            if let Value::String(s) = &mut payload.value {
                *s = s.to_lowercase();
            }
            false
        }
        CheckKind::Uppercase => {
            if let Value::String(s) = &mut payload.value {
                *s = s.to_uppercase();
            }
            false
        }
        CheckKind::Custom { name, test } => {
            if test(&payload.value) {
                false
            } else {
                push_failure(
                    schema,
                    check,
                    payload,
                    IssueCode::Custom { note: name.clone() },
                )
            }
        }
        CheckKind::CustomAsync { .. } => return Err(ExecError::AsyncInSyncContext),
    };
    Ok(failed)
}

/// Async twin of [`run_checks`]: identical policy, `CustomAsync` awaited
/// in place.
pub(crate) async fn run_checks_async(
    schema: &Schema,
    payload: &mut Payload,
    before: usize,
) -> Result<(), ExecError> {
    let mut aborted = payload.aborted_since(before);
    for check in schema.checks() {
        if aborted && !check.always_run {
            continue;
        }
        if let Some(when) = &check.when {
            if !when(&payload.value) {
                continue;
            }
        }
        let failed = match check.kind() {
            CheckKind::CustomAsync { name, test } => {
                if test(payload.value.clone()).await {
                    false
                } else {
                    push_failure(
                        schema,
                        check,
                        payload,
                        IssueCode::Custom { note: name.clone() },
                    )
                }
            }
            _ => apply(schema, check, payload)?,
        };
        if failed && check.abort {
            aborted = true;
        }
    }
    Ok(())
}
