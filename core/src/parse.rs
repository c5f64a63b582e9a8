//! The public parse boundary.
//!
//! Four entry points per execution mode: `parse` returns the output value
//! or errors, `safe_parse` returns a [`Parsed`] outcome that only errors
//! on contract violations, and each has a `_with` variant taking an
//! explicit [`ParseConfig`]. Issue messages are finalized here — inside
//! the engine an issue is pure data.

use tracing::debug;

use crate::config::{ParseConfig, default_config};
use crate::engine::{self, Payload};
use crate::error::{ExecError, ParseError, ValidationError};
use crate::schema::Schema;
use crate::value::Value;

/// The outcome of a `safe_parse`: the validated (possibly transformed)
/// output, or the recorded issues.
#[derive(Debug)]
pub enum Parsed {
    /// Validation succeeded; carries the output value.
    Valid(Value),
    /// Validation failed; carries the finalized issues.
    Invalid(ValidationError),
}

impl Parsed {
    /// Whether validation succeeded.
    pub fn success(&self) -> bool {
        matches!(self, Parsed::Valid(_))
    }

    /// The output value, if validation succeeded.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Parsed::Valid(value) => Some(value),
            Parsed::Invalid(_) => None,
        }
    }

    /// The validation error, if validation failed.
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Parsed::Valid(_) => None,
            Parsed::Invalid(error) => Some(error),
        }
    }

    /// Converts into a plain `Result`, consuming the outcome.
    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self {
            Parsed::Valid(value) => Ok(value),
            Parsed::Invalid(error) => Err(error),
        }
    }
}

fn finish(schema: &Schema, payload: Payload, config: &ParseConfig) -> Parsed {
    if payload.issues.is_empty() {
        Parsed::Valid(payload.value)
    } else {
        debug!(
            kind = schema.kind_name(),
            issues = payload.issues.len(),
            "validation failed"
        );
        Parsed::Invalid(ValidationError::new(payload.issues, config))
    }
}

/// Validates `input` against `schema`, returning the outcome.
///
/// Invalid input is a [`Parsed::Invalid`] outcome, not an `Err`; only
/// contract violations ([`ExecError`]) escape as errors.
pub fn safe_parse(schema: &Schema, input: Value) -> Result<Parsed, ExecError> {
    safe_parse_with(schema, input, &default_config())
}

/// [`safe_parse`] with an explicit configuration.
pub fn safe_parse_with(
    schema: &Schema,
    input: Value,
    config: &ParseConfig,
) -> Result<Parsed, ExecError> {
    let mut payload = Payload::new(input);
    engine::run(schema, &mut payload)?;
    Ok(finish(schema, payload, config))
}

/// Validates `input` against `schema`, returning the output value or the
/// failure as an error.
pub fn parse(schema: &Schema, input: Value) -> Result<Value, ParseError> {
    parse_with(schema, input, &default_config())
}

/// [`parse`] with an explicit configuration.
pub fn parse_with(
    schema: &Schema,
    input: Value,
    config: &ParseConfig,
) -> Result<Value, ParseError> {
    match safe_parse_with(schema, input, config)? {
        Parsed::Valid(value) => Ok(value),
        Parsed::Invalid(error) => Err(error.into()),
    }
}

/// Asynchronous [`safe_parse`]; required for schemas containing
/// asynchronous transforms or refinements.
pub async fn safe_parse_async(schema: &Schema, input: Value) -> Result<Parsed, ExecError> {
    safe_parse_async_with(schema, input, &default_config()).await
}

/// [`safe_parse_async`] with an explicit configuration.
pub async fn safe_parse_async_with(
    schema: &Schema,
    input: Value,
    config: &ParseConfig,
) -> Result<Parsed, ExecError> {
    let mut payload = Payload::new(input);
    engine::future::run_async(schema, &mut payload).await?;
    Ok(finish(schema, payload, config))
}

/// Asynchronous [`parse`].
pub async fn parse_async(schema: &Schema, input: Value) -> Result<Value, ParseError> {
    parse_async_with(schema, input, &default_config()).await
}

/// [`parse_async`] with an explicit configuration.
pub async fn parse_async_with(
    schema: &Schema,
    input: Value,
    config: &ParseConfig,
) -> Result<Value, ParseError> {
    match safe_parse_async_with(schema, input, config).await? {
        Parsed::Valid(value) => Ok(value),
        Parsed::Invalid(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{refine_async, trim};
    use crate::schema::{number, pipe, string, transform};
    use crate::value::Value;

    #[test]
    fn test_safe_parse_valid() {
        let schema = string();
        let outcome = safe_parse(&schema, Value::from("hello")).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.data(), Some(&Value::from("hello")));
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_safe_parse_invalid_is_ok() {
        let schema = number();
        let outcome = safe_parse(&schema, Value::from("nope")).unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.error().unwrap().issues().len(), 1);
    }

    #[test]
    fn test_parse_propagates_validation_error() {
        let schema = number();
        assert!(parse(&schema, Value::from("nope")).is_err());
        assert_eq!(parse(&schema, Value::from(5.0)).unwrap(), Value::from(5.0));
    }

    #[test]
    fn test_checks_rewrite_output() {
        let schema = string().check(trim());
        let value = parse(&schema, Value::from("  padded  ")).unwrap();
        assert_eq!(value, Value::from("padded"));
    }

    #[test]
    fn test_async_schema_rejected_by_sync_parse() {
        let schema = string().check(refine_async("always", |_| Box::pin(async { true })));
        let err = safe_parse(&schema, Value::from("x")).unwrap_err();
        assert!(matches!(err, ExecError::AsyncInSyncContext));
    }

    #[test]
    fn test_sync_transform_under_sync_parse() {
        let schema = pipe(
            string(),
            transform(|value| match value {
                Value::String(s) => Value::Number(s.len() as f64),
                other => other,
            }),
        );
        let value = parse(&schema, Value::from("four")).unwrap();
        assert_eq!(value, Value::Number(4.0));
    }
}
