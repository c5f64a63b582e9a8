//! Composable post-validation checks.
//!
//! A check is an independent rule attached to a schema node at construction
//! time. Checks run in attachment order after the node's own type/shape
//! validation, can conditionally skip themselves, can abort later checks on
//! failure, and may rewrite the in-flight value (trimming, case folding) —
//! which is how non-failing "checks" implement transforms.
//!
//! # Examples
//!
//! ```
//! use runtype_core::{number, safe_parse, Value};
//! use runtype_core::check::{gte, lt};
//!
//! let schema = number().check(gte(0.0)).check(lt(100.0));
//! assert!(safe_parse(&schema, Value::Number(42.0)).unwrap().success());
//! assert!(!safe_parse(&schema, Value::Number(-1.0)).unwrap().success());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::engine::BoxFuture;
use crate::error::SchemaError;
use crate::formats::StringFormat;
use crate::metadata::Bound;
use crate::value::Value;

/// Predicate deciding whether a check applies to the current value.
pub type WhenPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A synchronous custom-refinement predicate.
pub type CustomPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// An asynchronous custom-refinement predicate.
pub type AsyncPredicate = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;

/// The closed set of check rules.
#[derive(Clone)]
pub enum CheckKind {
    /// Minimum numeric/temporal bound.
    MinValue {
        /// The bound.
        bound: Bound,
    },
    /// Maximum numeric/temporal bound.
    MaxValue {
        /// The bound.
        bound: Bound,
    },
    /// Value must be a multiple of the divisor.
    MultipleOf {
        /// The divisor.
        divisor: f64,
    },
    /// Minimum length for strings and arrays.
    MinLength {
        /// The minimum length.
        min: usize,
    },
    /// Maximum length for strings and arrays.
    MaxLength {
        /// The maximum length.
        max: usize,
    },
    /// Minimum entry count for maps and sets.
    MinSize {
        /// The minimum size.
        min: usize,
    },
    /// Maximum entry count for maps and sets.
    MaxSize {
        /// The maximum size.
        max: usize,
    },
    /// String must match a regex.
    Pattern {
        /// The compiled regex.
        regex: Regex,
    },
    /// String must satisfy a named format.
    Format {
        /// The format.
        format: StringFormat,
    },
    /// Strips leading/trailing whitespace (never fails).
    Trim,
    /// Lowercases the string (never fails).
    Lowercase,
    /// Uppercases the string (never fails).
    Uppercase,
    /// Custom named predicate.
    Custom {
        /// Name reported in the `custom` issue.
        name: String,
        /// The predicate.
        test: CustomPredicate,
    },
    /// Custom asynchronous predicate; only legal under `parse_async`.
    CustomAsync {
        /// Name reported in the `custom` issue.
        name: String,
        /// The predicate.
        test: AsyncPredicate,
    },
}

impl fmt::Debug for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::MinValue { .. } => "min_value",
            CheckKind::MaxValue { .. } => "max_value",
            CheckKind::MultipleOf { .. } => "multiple_of",
            CheckKind::MinLength { .. } => "min_length",
            CheckKind::MaxLength { .. } => "max_length",
            CheckKind::MinSize { .. } => "min_size",
            CheckKind::MaxSize { .. } => "max_size",
            CheckKind::Pattern { .. } => "pattern",
            CheckKind::Format { format } => return write!(f, "format({})", format.name()),
            CheckKind::Trim => "trim",
            CheckKind::Lowercase => "lowercase",
            CheckKind::Uppercase => "uppercase",
            CheckKind::Custom { name, .. } | CheckKind::CustomAsync { name, .. } => {
                return write!(f, "custom({name})");
            }
        };
        f.write_str(name)
    }
}

/// A check plus its execution policy.
#[derive(Clone)]
pub struct Check {
    pub(crate) kind: CheckKind,
    pub(crate) abort: bool,
    pub(crate) always_run: bool,
    pub(crate) when: Option<WhenPredicate>,
    pub(crate) message: Option<String>,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("kind", &self.kind)
            .field("abort", &self.abort)
            .field("always_run", &self.always_run)
            .field("conditional", &self.when.is_some())
            .field("message", &self.message)
            .finish()
    }
}

impl Check {
    fn new(kind: CheckKind) -> Self {
        Check {
            kind,
            abort: false,
            always_run: false,
            when: None,
            message: None,
        }
    }

    /// The rule this check enforces.
    pub fn kind(&self) -> &CheckKind {
        &self.kind
    }

    /// On failure, stop running subsequent checks on this path.
    pub fn aborting(mut self) -> Self {
        self.abort = true;
        self
    }

    /// Run even when the payload has already aborted.
    pub fn always(mut self) -> Self {
        self.always_run = true;
        self
    }

    /// Only run when `predicate` holds for the current value.
    pub fn when(mut self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(predicate));
        self
    }

    /// Overrides the issue message for failures of this check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Value must be strictly greater than `value`.
pub fn gt(value: f64) -> Check {
    Check::new(CheckKind::MinValue {
        bound: Bound {
            value,
            inclusive: false,
        },
    })
}

/// Value must be greater than or equal to `value`.
pub fn gte(value: f64) -> Check {
    Check::new(CheckKind::MinValue {
        bound: Bound {
            value,
            inclusive: true,
        },
    })
}

/// Value must be strictly less than `value`.
pub fn lt(value: f64) -> Check {
    Check::new(CheckKind::MaxValue {
        bound: Bound {
            value,
            inclusive: false,
        },
    })
}

/// Value must be less than or equal to `value`.
pub fn lte(value: f64) -> Check {
    Check::new(CheckKind::MaxValue {
        bound: Bound {
            value,
            inclusive: true,
        },
    })
}

/// Number must be a multiple of `divisor`.
pub fn multiple_of(divisor: f64) -> Check {
    Check::new(CheckKind::MultipleOf { divisor })
}

/// String/array length must be at least `min`.
pub fn min_length(min: usize) -> Check {
    Check::new(CheckKind::MinLength { min })
}

/// String/array length must be at most `max`.
pub fn max_length(max: usize) -> Check {
    Check::new(CheckKind::MaxLength { max })
}

/// Map/set entry count must be at least `min`.
pub fn min_size(min: usize) -> Check {
    Check::new(CheckKind::MinSize { min })
}

/// Map/set entry count must be at most `max`.
pub fn max_size(max: usize) -> Check {
    Check::new(CheckKind::MaxSize { max })
}

/// String must match `pattern`.
///
/// Fails fast at construction if the pattern does not compile.
pub fn pattern(pattern: &str) -> Result<Check, SchemaError> {
    let regex = Regex::new(pattern)?;
    Ok(Check::new(CheckKind::Pattern { regex }))
}

/// String must satisfy the given [`StringFormat`].
pub fn format(format: StringFormat) -> Check {
    Check::new(CheckKind::Format { format })
}

/// Strips leading and trailing whitespace; never fails.
pub fn trim() -> Check {
    Check::new(CheckKind::Trim)
}

/// Lowercases the string; never fails.
pub fn lowercase() -> Check {
    Check::new(CheckKind::Lowercase)
}

/// Uppercases the string; never fails.
pub fn uppercase() -> Check {
    Check::new(CheckKind::Uppercase)
}

/// Custom named predicate; failures produce a `custom` issue carrying
/// `name`.
pub fn refine(
    name: impl Into<String>,
    test: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> Check {
    Check::new(CheckKind::Custom {
        name: name.into(),
        test: Arc::new(test),
    })
}

/// Custom asynchronous predicate; running one under a synchronous parse is
/// a contract error.
pub fn refine_async(
    name: impl Into<String>,
    test: impl Fn(Value) -> BoxFuture<'static, bool> + Send + Sync + 'static,
) -> Check {
    Check::new(CheckKind::CustomAsync {
        name: name.into(),
        test: Arc::new(test),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_rejects_bad_regex() {
        assert!(pattern("[").is_err());
        assert!(pattern("^a+$").is_ok());
    }

    #[test]
    fn test_check_policy_builders() {
        let check = gte(0.0).aborting().always().message("non-negative");
        assert!(check.abort);
        assert!(check.always_run);
        assert_eq!(check.message.as_deref(), Some("non-negative"));
    }
}
