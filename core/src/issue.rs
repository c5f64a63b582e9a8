//! Validation issue model.
//!
//! Issues are data, never exceptions: they accumulate on the payload during
//! validation and are only turned into an error (with finalized messages) at
//! the `parse`/`safe_parse` boundary. The code taxonomy is closed; each code
//! carries exactly the fields needed to render a message and to be inspected
//! by machines.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::Value;

/// One step of the path from the validation root to a failure site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object property name.
    Key(String),
    /// An array or tuple index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// The closed issue-code taxonomy.
///
/// Serialized with a `code` tag in snake case, which is the wire contract
/// the surrounding framework renders diagnostics from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    /// The input's runtime type does not match the expected type.
    InvalidType {
        /// Expected type tag.
        expected: String,
        /// Observed type tag.
        received: String,
    },
    /// The input is not one of an enumerated set of allowed values.
    InvalidValue {
        /// The allowed values.
        values: Vec<Value>,
    },
    /// A maximum bound was violated.
    TooBig {
        /// The violated bound.
        maximum: f64,
        /// Whether the bound itself is allowed.
        inclusive: bool,
    },
    /// A minimum bound was violated.
    TooSmall {
        /// The violated bound.
        minimum: f64,
        /// Whether the bound itself is allowed.
        inclusive: bool,
    },
    /// A string format or pattern did not match.
    InvalidFormat {
        /// Format name (e.g. `email`, `uuid`, `regex`).
        format: String,
        /// Source pattern, for regex-backed formats.
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    /// A number is not a multiple of the required divisor.
    NotMultipleOf {
        /// The required divisor.
        divisor: f64,
    },
    /// An object or closed-domain record received unknown keys.
    UnrecognizedKeys {
        /// The offending key names.
        keys: Vec<String>,
    },
    /// A record/map key failed its key schema.
    InvalidKey {
        /// The key schema's own issues.
        issues: Vec<Issue>,
    },
    /// No union option matched; embeds every option's full issue list.
    InvalidUnion {
        /// Issues per option, in declaration order.
        options: Vec<Vec<Issue>>,
    },
    /// A map/set entry failed validation.
    InvalidElement {
        /// The element schema's own issues.
        issues: Vec<Issue>,
    },
    /// A custom refinement failed.
    Custom {
        /// The refinement's name.
        note: String,
    },
}

impl IssueCode {
    /// Returns the snake_case wire tag for this code.
    pub fn tag(&self) -> &'static str {
        match self {
            IssueCode::InvalidType { .. } => "invalid_type",
            IssueCode::InvalidValue { .. } => "invalid_value",
            IssueCode::TooBig { .. } => "too_big",
            IssueCode::TooSmall { .. } => "too_small",
            IssueCode::InvalidFormat { .. } => "invalid_format",
            IssueCode::NotMultipleOf { .. } => "not_multiple_of",
            IssueCode::UnrecognizedKeys { .. } => "unrecognized_keys",
            IssueCode::InvalidKey { .. } => "invalid_key",
            IssueCode::InvalidUnion { .. } => "invalid_union",
            IssueCode::InvalidElement { .. } => "invalid_element",
            IssueCode::Custom { .. } => "custom",
        }
    }
}

/// A single recorded validation failure.
///
/// `message` stays empty until the parse boundary unless a node- or
/// check-level override resolved it earlier; localization happens exactly
/// once, in [`ValidationError::new`](crate::ValidationError).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// What went wrong.
    #[serde(flatten)]
    pub code: IssueCode,
    /// Root-to-failure path.
    pub path: Vec<PathSegment>,
    /// The input value observed at the failure site.
    pub input: Value,
    /// Human-readable message, resolved at the parse boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When `true`, this issue does not abort later checks on its path.
    #[serde(skip)]
    pub can_continue: bool,
}

impl Issue {
    /// Creates an issue at the current location (empty path).
    pub fn new(code: IssueCode, input: Value) -> Self {
        Issue {
            code,
            path: Vec::new(),
            input,
            message: None,
            can_continue: false,
        }
    }

    /// Prepends a path segment, used when splicing child issues into a
    /// parent payload.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Renders the path as a dotted string (`a.b.1`), empty for the root.
    pub fn dotted_path(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.path.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&seg.to_string());
        }
        out
    }
}

/// A pluggable issue-to-message override.
///
/// Returning `None` lets resolution fall through to the next layer
/// (per-call map, global map, locale formatter).
pub type ErrorMapper = Arc<dyn Fn(&Issue) -> Option<String> + Send + Sync>;
