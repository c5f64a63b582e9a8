//! Error types for schema construction, execution contracts, and validation
//! results.
//!
//! Three distinct families, kept separate on purpose:
//!
//! - [`SchemaError`] — schema-authoring mistakes caught at construction
//!   time (fail fast, never at validation time).
//! - [`ExecError`] — the contract errors that surface as hard errors even
//!   from `safe_parse`: a synchronous parse hitting asynchronous work, and
//!   an intersection whose outputs cannot be merged.
//! - [`ValidationError`] — the aggregate of validation issues, produced
//!   only at the parse boundary. Bad input is data, not an exception.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::config::ParseConfig;
use crate::issue::Issue;

/// Schema-authoring errors raised at construction time.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two discriminated-union options share a discriminator value.
    #[error("duplicate discriminator value across options: {0}")]
    DuplicateDiscriminator(String),

    /// A discriminated-union option has no literal-valued discriminator
    /// property.
    #[error("option is missing a literal-valued discriminator property '{0}'")]
    MissingDiscriminator(String),

    /// A discriminated-union option is not an object schema.
    #[error("discriminated union options must be object schemas, found {0}")]
    NonObjectOption(&'static str),

    /// A derived operation named a key the shape does not contain.
    #[error("unknown object key: {0}")]
    UnknownKey(String),

    /// A derived operation was applied to a non-object schema.
    #[error("expected an object schema, found {0}")]
    ExpectedObjectSchema(&'static str),

    /// A lazy schema slot was resolved more than once.
    #[error("lazy schema slot already resolved")]
    LazyAlreadyResolved,

    /// A pattern check failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Contract errors that escape even `safe_parse`.
///
/// These describe bugs in how the schema graph was built or invoked, not
/// bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// A synchronous parse reached an asynchronous transform or check.
    #[error("synchronous parse encountered asynchronous work; use parse_async")]
    AsyncInSyncContext,

    /// Both intersection sides validated but their outputs cannot merge.
    #[error("intersection outputs cannot be merged: {0}")]
    IntersectionConflict(String),

    /// A lazy schema was used before its slot was resolved.
    #[error("lazy schema used before its slot was resolved")]
    UnresolvedLazy,
}

/// The aggregate validation failure carried across the parse boundary.
///
/// Messages are finalized (localized) exactly once, when this error is
/// constructed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationError {
    issues: Vec<Issue>,
}

/// Wire-format diagnostic: root-level messages plus a dotted-path → message
/// mapping, ready for an HTTP layer to serialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenedErrors {
    /// Messages for issues at the validation root.
    pub root: Vec<String>,
    /// Messages grouped by dotted field path.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Finalizes messages on `issues` and wraps them.
    pub(crate) fn new(mut issues: Vec<Issue>, config: &ParseConfig) -> Self {
        for issue in &mut issues {
            config.finalize(issue);
        }
        ValidationError { issues }
    }

    /// The recorded issues, in validation order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Flattens issues into a field-path → message mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use runtype_core::{number, object, safe_parse};
    /// use runtype_core::check::gte;
    ///
    /// let schema = object([("age", number().check(gte(0.0)))]);
    /// let outcome = safe_parse(
    ///     &schema,
    ///     serde_json::json!({"age": -1}).into(),
    /// ).unwrap();
    ///
    /// let flat = outcome.error().unwrap().flatten();
    /// assert!(flat.fields["age"][0].contains("at least 0"));
    /// ```
    pub fn flatten(&self) -> FlattenedErrors {
        let mut out = FlattenedErrors::default();
        for issue in &self.issues {
            let message = issue
                .message
                .clone()
                .unwrap_or_else(|| issue.code.tag().to_string());
            if issue.path.is_empty() {
                out.root.push(message);
            } else {
                out.fields.entry(issue.dotted_path()).or_default().push(message);
            }
        }
        out
    }
}

/// Convenience alias for construction-time results.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Error returned by the throwing [`parse`](crate::parse) entry points.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A contract error (async-in-sync, unmergeable intersection).
    #[error(transparent)]
    Exec(#[from] ExecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueCode, PathSegment};
    use crate::value::Value;

    #[test]
    fn test_flatten_groups_by_dotted_path() {
        let mut nested = Issue::new(
            IssueCode::InvalidType {
                expected: "number".into(),
                received: "string".into(),
            },
            Value::String("x".into()),
        );
        nested.path = vec![
            PathSegment::Key("a".into()),
            PathSegment::Index(1),
        ];
        let root = Issue::new(
            IssueCode::Custom {
                note: "whole-object rule".into(),
            },
            Value::Null,
        );

        let err = ValidationError::new(vec![nested, root], &ParseConfig::default());
        let flat = err.flatten();
        assert_eq!(flat.root.len(), 1);
        assert_eq!(flat.fields["a.1"].len(), 1);
    }
}
