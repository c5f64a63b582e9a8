//! Leaf schema kinds: type checks with optional input coercion.

use crate::issue::IssueCode;
use crate::schema::{Def, Schema};
use crate::value::{Value, fmt_number};

use super::Payload;

/// Parses a primitive node: optional coercion first, then the type check.
/// Mismatches push `invalid_type`; nothing here can suspend or error.
pub(super) fn parse_primitive(schema: &Schema, payload: &mut Payload) {
    match schema.def() {
        Def::String { coerce } => {
            if *coerce {
                coerce_string(&mut payload.value);
            }
            if !matches!(payload.value, Value::String(_)) {
                push_type_issue(schema, payload, "string");
            }
        }
        Def::Number { coerce } => {
            if *coerce {
                coerce_number(&mut payload.value);
            }
            if !matches!(payload.value, Value::Number(_)) {
                push_type_issue(schema, payload, "number");
            }
        }
        Def::Boolean { coerce } => {
            if *coerce {
                coerce_boolean(&mut payload.value);
            }
            if !matches!(payload.value, Value::Bool(_)) {
                push_type_issue(schema, payload, "boolean");
            }
        }
        Def::BigInt => {
            if !matches!(payload.value, Value::BigInt(_)) {
                push_type_issue(schema, payload, "bigint");
            }
        }
        Def::Date => {
            if !matches!(payload.value, Value::Date(_)) {
                push_type_issue(schema, payload, "date");
            }
        }
        Def::Literal(expected) => {
            if payload.value != *expected {
                let issue = schema.make_issue(
                    IssueCode::InvalidValue {
                        values: vec![expected.clone()],
                    },
                    payload.value.clone(),
                );
                payload.issues.push(issue);
            }
        }
        Def::Enum(values) => {
            if !values.contains(&payload.value) {
                let issue = schema.make_issue(
                    IssueCode::InvalidValue {
                        values: values.clone(),
                    },
                    payload.value.clone(),
                );
                payload.issues.push(issue);
            }
        }
        Def::Any => {}
        _ => {}
    }
}

pub(super) fn push_type_issue(schema: &Schema, payload: &mut Payload, expected: &str) {
    let issue = schema.make_issue(
        IssueCode::InvalidType {
            expected: expected.to_string(),
            received: payload.value.type_name().to_string(),
        },
        payload.value.clone(),
    );
    payload.issues.push(issue);
}

fn coerce_string(value: &mut Value) {
    let coerced = match &*value {
        Value::Number(n) => fmt_number(*n),
        Value::BigInt(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Date(d) => d.to_rfc3339(),
        _ => return,
    };
    *value = Value::String(coerced);
}

fn coerce_number(value: &mut Value) {
    let coerced = match &*value {
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return,
        },
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::BigInt(n) => *n as f64,
        Value::Date(d) => d.timestamp_millis() as f64,
        _ => return,
    };
    *value = Value::Number(coerced);
}

fn coerce_boolean(value: &mut Value) {
    let coerced = match &*value {
        Value::String(s) => match s.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return,
        },
        Value::Number(n) if *n == 1.0 => true,
        Value::Number(n) if *n == 0.0 => false,
        _ => return,
    };
    *value = Value::Bool(coerced);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{bigint, boolean, literal, number, string};

    fn run_on(schema: &Schema, value: Value) -> Payload {
        let mut payload = Payload::new(value);
        parse_primitive(schema, &mut payload);
        payload
    }

    #[test]
    fn test_type_mismatch_pushes_invalid_type() {
        let payload = run_on(&number(), Value::String("x".into()));
        assert_eq!(payload.issues.len(), 1);
        assert_eq!(payload.issues[0].code.tag(), "invalid_type");
        // Value is left untouched on failure
        assert_eq!(payload.value, Value::String("x".into()));
    }

    #[test]
    fn test_number_coercion_from_string() {
        let payload = run_on(&number().coerce(), Value::String(" 4.5 ".into()));
        assert!(payload.issues.is_empty());
        assert_eq!(payload.value, Value::Number(4.5));

        let payload = run_on(&number().coerce(), Value::String("not a number".into()));
        assert_eq!(payload.issues.len(), 1);
    }

    #[test]
    fn test_string_coercion_from_scalars() {
        let payload = run_on(&string().coerce(), Value::Number(5.0));
        assert_eq!(payload.value, Value::String("5".into()));

        let payload = run_on(&string().coerce(), Value::BigInt(7));
        assert_eq!(payload.value, Value::String("7".into()));
    }

    #[test]
    fn test_boolean_coercion() {
        let payload = run_on(&boolean().coerce(), Value::String("true".into()));
        assert_eq!(payload.value, Value::Bool(true));

        let payload = run_on(&boolean().coerce(), Value::Number(0.0));
        assert_eq!(payload.value, Value::Bool(false));

        let payload = run_on(&boolean().coerce(), Value::String("yes".into()));
        assert_eq!(payload.issues.len(), 1);
    }

    #[test]
    fn test_literal_reports_invalid_value() {
        let payload = run_on(&literal("a"), Value::String("b".into()));
        assert_eq!(payload.issues[0].code.tag(), "invalid_value");
    }

    #[test]
    fn test_bigint_does_not_accept_number() {
        let payload = run_on(&bigint(), Value::Number(1.0));
        assert_eq!(payload.issues.len(), 1);
    }
}
