//! Schema node definitions and construction.
//!
//! A schema node is an immutable description of one validation rule or
//! shape: a closed `kind` tag with kind-specific configuration, an ordered
//! check list, and a metadata bag folded at construction time. Validation
//! never mutates a node; derived operations always build new nodes, sharing
//! unchanged children structurally through [`Arc`].
//!
//! Nodes are built with free constructor functions plus builder methods:
//!
//! ```
//! use runtype_core::{check::min_length, number, object, optional, string};
//!
//! let user = object([
//!     ("name", string().check(min_length(1))),
//!     ("age", optional(number())),
//! ]);
//! assert_eq!(user.kind_name(), "object");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::check::Check;
use crate::engine::BoxFuture;
use crate::error::{SchemaError, SchemaResult};
use crate::issue::{ErrorMapper, Issue, IssueCode};
use crate::metadata::MetadataBag;
use crate::value::Value;

/// Ordered property-name → child-schema mapping of an object schema.
pub type ObjectShape = IndexMap<String, Arc<Schema>>;

/// A synchronous value transform.
pub type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// An asynchronous value transform; the one place a schema graph may
/// introduce asynchronous work ad hoc.
pub type AsyncTransformFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// Fallback computation for [`catch`]: a function of the attempted input
/// and the issues the inner schema produced.
pub type CatchFn = Arc<dyn Fn(&Value, &[Issue]) -> Value + Send + Sync>;

/// A sync or async transform function.
#[derive(Clone)]
pub enum Transformer {
    /// Synchronous transform.
    Sync(TransformFn),
    /// Asynchronous transform; only legal under `parse_async`.
    Async(AsyncTransformFn),
}

/// Unknown-key policy for object schemas.
#[derive(Clone)]
pub enum Catchall {
    /// Unknown keys are silently dropped from the output.
    Loose,
    /// Unknown keys produce an `unrecognized_keys` issue.
    Strict,
    /// Unknown keys are validated against this schema and merged into the
    /// output.
    Schema(Arc<Schema>),
}

/// The indirection cell behind [`lazy`] schemas, resolved exactly once
/// after the full graph is constructed.
#[derive(Clone)]
pub struct LazySlot {
    cell: Arc<OnceCell<Arc<Schema>>>,
}

impl LazySlot {
    /// Resolves the slot to its target schema.
    ///
    /// Resolving twice is a schema-authoring error.
    pub fn resolve(&self, schema: impl Into<Arc<Schema>>) -> SchemaResult<()> {
        self.cell
            .set(schema.into())
            .map_err(|_| SchemaError::LazyAlreadyResolved)
    }

    /// The resolved target, if any.
    pub fn get(&self) -> Option<&Arc<Schema>> {
        self.cell.get()
    }
}

impl fmt::Debug for LazySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySlot")
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}

/// The closed, enumerable set of schema kinds.
#[derive(Clone)]
pub enum Def {
    /// String primitive; `coerce` stringifies scalars first.
    String {
        /// Attempt scalar-to-string coercion before the type check.
        coerce: bool,
    },
    /// Number primitive; `coerce` parses strings/booleans first.
    Number {
        /// Attempt coercion before the type check.
        coerce: bool,
    },
    /// Boolean primitive.
    Boolean {
        /// Attempt coercion before the type check.
        coerce: bool,
    },
    /// Bigint primitive.
    BigInt,
    /// Date primitive.
    Date,
    /// A single allowed value.
    Literal(Value),
    /// A finite set of allowed values.
    Enum(Vec<Value>),
    /// Accepts anything, including `undefined`.
    Any,
    /// Structural object with an ordered shape and unknown-key policy.
    Object {
        /// Declared properties, in order.
        shape: ObjectShape,
        /// Unknown-key policy.
        catchall: Catchall,
    },
    /// Homogeneous sequence.
    Array {
        /// Element schema.
        element: Arc<Schema>,
    },
    /// Positional sequence with optional overflow schema.
    Tuple {
        /// Per-slot schemas.
        items: Vec<Arc<Schema>>,
        /// Schema for overflow elements; removes the upper length bound.
        rest: Option<Arc<Schema>>,
    },
    /// First-match untagged union.
    Union {
        /// Options, tried in declaration order.
        options: Vec<Arc<Schema>>,
    },
    /// O(1)-dispatch union over object schemas sharing a literal-valued
    /// discriminator property.
    DiscriminatedUnion {
        /// The discriminator property name.
        discriminator: String,
        /// Object-schema options.
        options: Vec<Arc<Schema>>,
        /// Discriminator-value → option-index map, built at first use.
        lookup: OnceCell<std::collections::HashMap<String, usize>>,
        /// Fall back to plain union behavior when no discriminator
        /// matches.
        fallback: bool,
    },
    /// Validates against both sides, then deep-merges the outputs.
    Intersection {
        /// Left operand.
        left: Arc<Schema>,
        /// Right operand.
        right: Arc<Schema>,
    },
    /// String-keyed mapping with key and value schemas.
    Record {
        /// Key schema.
        key: Arc<Schema>,
        /// Value schema.
        value: Arc<Schema>,
    },
    /// Map container with arbitrary keys.
    Map {
        /// Key schema.
        key: Arc<Schema>,
        /// Value schema.
        value: Arc<Schema>,
    },
    /// Set container.
    Set {
        /// Element schema.
        element: Arc<Schema>,
    },
    /// Accepts `undefined` in addition to the inner schema.
    Optional {
        /// Inner schema.
        inner: Arc<Schema>,
    },
    /// Accepts `null` in addition to the inner schema.
    Nullable {
        /// Inner schema.
        inner: Arc<Schema>,
    },
    /// Accepts `undefined` and `null` in addition to the inner schema.
    Nullish {
        /// Inner schema.
        inner: Arc<Schema>,
    },
    /// Substitutes a trusted default for `undefined` without validating
    /// it.
    Default {
        /// Inner schema.
        inner: Arc<Schema>,
        /// The trusted default.
        default: Value,
    },
    /// Substitutes a seed value for `undefined` and validates it.
    Prefault {
        /// Inner schema.
        inner: Arc<Schema>,
        /// The seed value, which is validated.
        default: Value,
    },
    /// Converts inner-schema failure into a computed fallback value.
    Catch {
        /// Inner schema.
        inner: Arc<Schema>,
        /// Fallback computation over (input, issues).
        fallback: CatchFn,
    },
    /// Rejects an `undefined` result the inner schema would allow.
    NonOptional {
        /// Inner schema.
        inner: Arc<Schema>,
    },
    /// Chains two schemas left-to-right; aborting in the left stage skips
    /// the right.
    Pipe {
        /// First stage.
        left: Arc<Schema>,
        /// Second stage, fed the first stage's output.
        right: Arc<Schema>,
    },
    /// Applies an arbitrary value transform.
    Transform {
        /// The transform function.
        transformer: Transformer,
    },
    /// Marks the output as read-only.
    Readonly {
        /// Inner schema.
        inner: Arc<Schema>,
    },
    /// Deferred self-reference, resolved after graph construction.
    Lazy {
        /// The indirection cell.
        slot: LazySlot,
    },
}

/// An immutable schema node.
#[derive(Clone)]
pub struct Schema {
    def: Def,
    checks: Vec<Check>,
    bag: MetadataBag,
    error: Option<ErrorMapper>,
    origin: Option<Arc<Schema>>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind_name())
            .field("checks", &self.checks)
            .finish()
    }
}

impl Schema {
    fn from_def(def: Def) -> Self {
        let mut bag = MetadataBag::default();
        match &def {
            Def::Literal(value) => bag.values = Some(vec![value.clone()]),
            Def::Enum(values) => bag.values = Some(values.clone()),
            _ => {}
        }
        Schema {
            def,
            checks: Vec::new(),
            bag,
            error: None,
            origin: None,
        }
    }

    /// The node's kind-specific definition.
    pub fn def(&self) -> &Def {
        &self.def
    }

    /// Attached checks, in attachment order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// The derived metadata bag.
    pub fn bag(&self) -> &MetadataBag {
        &self.bag
    }

    /// The node this one was derived from, if any.
    pub fn origin(&self) -> Option<&Arc<Schema>> {
        self.origin.as_ref()
    }

    /// The closed kind tag.
    pub fn kind_name(&self) -> &'static str {
        match &self.def {
            Def::String { .. } => "string",
            Def::Number { .. } => "number",
            Def::Boolean { .. } => "boolean",
            Def::BigInt => "bigint",
            Def::Date => "date",
            Def::Literal(_) => "literal",
            Def::Enum(_) => "enum",
            Def::Any => "any",
            Def::Object { .. } => "object",
            Def::Array { .. } => "array",
            Def::Tuple { .. } => "tuple",
            Def::Union { .. } => "union",
            Def::DiscriminatedUnion { .. } => "discriminated_union",
            Def::Intersection { .. } => "intersection",
            Def::Record { .. } => "record",
            Def::Map { .. } => "map",
            Def::Set { .. } => "set",
            Def::Optional { .. } => "optional",
            Def::Nullable { .. } => "nullable",
            Def::Nullish { .. } => "nullish",
            Def::Default { .. } => "default",
            Def::Prefault { .. } => "prefault",
            Def::Catch { .. } => "catch",
            Def::NonOptional { .. } => "non_optional",
            Def::Pipe { .. } => "pipe",
            Def::Transform { .. } => "transform",
            Def::Readonly { .. } => "readonly",
            Def::Lazy { .. } => "lazy",
        }
    }

    /// Attaches a check and immediately folds its constraint into the
    /// metadata bag.
    pub fn check(mut self, check: Check) -> Self {
        self.bag.fold(check.kind());
        self.checks.push(check);
        self
    }

    /// Installs a per-node error mapper consulted first during message
    /// finalization.
    pub fn with_error(
        mut self,
        mapper: impl Fn(&Issue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.error = Some(Arc::new(mapper));
        self
    }

    /// Overrides every message produced directly by this node.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.with_error(move |_| Some(message.clone()))
    }

    /// Enables input coercion on string/number/boolean primitives; no-op
    /// for other kinds.
    pub fn coerce(mut self) -> Self {
        match &mut self.def {
            Def::String { coerce }
            | Def::Number { coerce }
            | Def::Boolean { coerce } => *coerce = true,
            _ => {}
        }
        self
    }

    /// On a discriminated union, fall back to plain union dispatch when no
    /// discriminator value matches; no-op for other kinds.
    pub fn fallback_to_union(mut self) -> Self {
        if let Def::DiscriminatedUnion { fallback, .. } = &mut self.def {
            *fallback = true;
        }
        self
    }

    /// Whether this node accepts a missing value on its input side.
    pub fn accepts_undefined_input(&self) -> bool {
        match &self.def {
            Def::Optional { .. }
            | Def::Nullish { .. }
            | Def::Default { .. }
            | Def::Prefault { .. }
            | Def::Any => true,
            Def::Literal(value) => value.is_undefined(),
            Def::Catch { inner, .. } | Def::Readonly { inner } => {
                inner.accepts_undefined_input()
            }
            Def::Pipe { left, .. } => left.accepts_undefined_input(),
            Def::Lazy { slot } => slot.get().is_some_and(|s| s.accepts_undefined_input()),
            Def::Union { options, .. } | Def::DiscriminatedUnion { options, .. } => {
                options.iter().any(|o| o.accepts_undefined_input())
            }
            Def::Intersection { left, right } => {
                left.accepts_undefined_input() && right.accepts_undefined_input()
            }
            _ => false,
        }
    }

    /// Whether this node may produce a missing value on its output side.
    pub fn produces_undefined_output(&self) -> bool {
        match &self.def {
            Def::Optional { .. } | Def::Nullish { .. } | Def::Any => true,
            Def::Literal(value) => value.is_undefined(),
            Def::Default { inner, .. } | Def::Prefault { inner, .. } => {
                inner.produces_undefined_output()
            }
            Def::Catch { inner, .. } | Def::Readonly { inner } => {
                inner.produces_undefined_output()
            }
            Def::Pipe { right, .. } => right.produces_undefined_output(),
            Def::Lazy { slot } => slot.get().is_some_and(|s| s.produces_undefined_output()),
            Def::Union { options, .. } | Def::DiscriminatedUnion { options, .. } => {
                options.iter().any(|o| o.produces_undefined_output())
            }
            Def::Intersection { left, right } => {
                left.produces_undefined_output() && right.produces_undefined_output()
            }
            Def::NonOptional { .. } => false,
            _ => false,
        }
    }

    /// Whether this node accepts `null` on its input side.
    pub fn accepts_null_input(&self) -> bool {
        match &self.def {
            Def::Nullable { .. } | Def::Nullish { .. } => true,
            Def::Literal(value) => value.is_null(),
            Def::Enum(values) => values.iter().any(Value::is_null),
            Def::Catch { inner, .. } | Def::Readonly { inner } => inner.accepts_null_input(),
            Def::Pipe { left, .. } => left.accepts_null_input(),
            Def::Lazy { slot } => slot.get().is_some_and(|s| s.accepts_null_input()),
            Def::Union { options, .. } => options.iter().any(|o| o.accepts_null_input()),
            _ => false,
        }
    }

    /// Builds an issue at this node, applying the node-level error mapper.
    pub(crate) fn make_issue(&self, code: IssueCode, input: Value) -> Issue {
        let mut issue = Issue::new(code, input);
        if let Some(mapper) = &self.error {
            issue.message = mapper(&issue);
        }
        issue
    }

    /// Per-check message override, falling back to the node mapper.
    pub(crate) fn make_check_issue(
        &self,
        check: &Check,
        code: IssueCode,
        input: Value,
    ) -> Issue {
        let mut issue = self.make_issue(code, input);
        if let Some(message) = &check.message {
            issue.message = Some(message.clone());
        }
        issue
    }

    /// Builds an object schema from an existing shape; used by the derived
    /// operations.
    pub fn object_from_shape(shape: ObjectShape, catchall: Catchall) -> Schema {
        Schema::from_def(Def::Object { shape, catchall })
    }

    pub(crate) fn with_origin(mut self, origin: Arc<Schema>) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// A stable dispatch key for a literal value, if the value is
/// discriminator-eligible (string, number, bigint, or boolean).
pub(crate) fn literal_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(format!("s:{s}")),
        Value::Number(n) => Some(format!("n:{n}")),
        Value::BigInt(n) => Some(format!("i:{n}")),
        Value::Bool(b) => Some(format!("b:{b}")),
        _ => None,
    }
}

/// Discriminator dispatch keys contributed by one option's discriminator
/// property: one for a literal, several for an enum.
pub(crate) fn discriminator_keys(prop: &Schema) -> Option<Vec<String>> {
    match prop.def() {
        Def::Literal(value) => literal_key(value).map(|k| vec![k]),
        Def::Enum(values) => values.iter().map(literal_key).collect(),
        _ => None,
    }
}

/// String schema.
pub fn string() -> Schema {
    Schema::from_def(Def::String { coerce: false })
}

/// Number schema.
pub fn number() -> Schema {
    Schema::from_def(Def::Number { coerce: false })
}

/// Boolean schema.
pub fn boolean() -> Schema {
    Schema::from_def(Def::Boolean { coerce: false })
}

/// Bigint schema.
pub fn bigint() -> Schema {
    Schema::from_def(Def::BigInt)
}

/// Date schema.
pub fn date() -> Schema {
    Schema::from_def(Def::Date)
}

/// Schema accepting exactly one value.
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::from_def(Def::Literal(value.into()))
}

/// Schema accepting one of a finite set of values.
pub fn enumeration<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Schema {
    Schema::from_def(Def::Enum(values.into_iter().map(Into::into).collect()))
}

/// Schema accepting anything.
pub fn any() -> Schema {
    Schema::from_def(Def::Any)
}

fn collect_shape<K, S, I>(shape: I) -> ObjectShape
where
    K: Into<String>,
    S: Into<Arc<Schema>>,
    I: IntoIterator<Item = (K, S)>,
{
    shape
        .into_iter()
        .map(|(k, s)| (k.into(), s.into()))
        .collect()
}

/// Object schema that silently drops unknown keys.
pub fn object<K, S, I>(shape: I) -> Schema
where
    K: Into<String>,
    S: Into<Arc<Schema>>,
    I: IntoIterator<Item = (K, S)>,
{
    Schema::from_def(Def::Object {
        shape: collect_shape(shape),
        catchall: Catchall::Loose,
    })
}

/// Object schema that reports unknown keys as `unrecognized_keys`.
pub fn strict_object<K, S, I>(shape: I) -> Schema
where
    K: Into<String>,
    S: Into<Arc<Schema>>,
    I: IntoIterator<Item = (K, S)>,
{
    Schema::from_def(Def::Object {
        shape: collect_shape(shape),
        catchall: Catchall::Strict,
    })
}

/// Object schema validating unknown keys against `rest` and merging them
/// into the output.
pub fn object_with_rest<K, S, I>(shape: I, rest: impl Into<Arc<Schema>>) -> Schema
where
    K: Into<String>,
    S: Into<Arc<Schema>>,
    I: IntoIterator<Item = (K, S)>,
{
    Schema::from_def(Def::Object {
        shape: collect_shape(shape),
        catchall: Catchall::Schema(rest.into()),
    })
}

/// Array schema over one element schema.
pub fn array(element: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Array {
        element: element.into(),
    })
}

/// Tuple schema with one schema per slot.
pub fn tuple<S: Into<Arc<Schema>>>(items: impl IntoIterator<Item = S>) -> Schema {
    Schema::from_def(Def::Tuple {
        items: items.into_iter().map(Into::into).collect(),
        rest: None,
    })
}

/// Tuple schema with a trailing rest schema for overflow elements.
pub fn tuple_with_rest<S: Into<Arc<Schema>>>(
    items: impl IntoIterator<Item = S>,
    rest: impl Into<Arc<Schema>>,
) -> Schema {
    Schema::from_def(Def::Tuple {
        items: items.into_iter().map(Into::into).collect(),
        rest: Some(rest.into()),
    })
}

/// Untagged union; options are tried in declaration order and the first
/// one with zero issues wins.
pub fn union<S: Into<Arc<Schema>>>(options: impl IntoIterator<Item = S>) -> Schema {
    Schema::from_def(Def::Union {
        options: options.into_iter().map(Into::into).collect(),
    })
}

/// Discriminated union over object schemas sharing a literal-valued
/// `discriminator` property.
///
/// Rejects, at construction time: non-object options, options whose
/// discriminator property is not literal/enum-valued, and duplicate
/// discriminator values across options.
///
/// # Examples
///
/// ```
/// use runtype_core::{discriminated_union, literal, number, object, string};
///
/// let shape = discriminated_union("type", [
///     object([("type", literal("circle")), ("radius", number())]),
///     object([("type", literal("square")), ("side", number())]),
/// ]).unwrap();
/// assert_eq!(shape.kind_name(), "discriminated_union");
///
/// // Duplicate discriminator values fail fast
/// assert!(discriminated_union("type", [
///     object([("type", literal("circle")), ("radius", number())]),
///     object([("type", literal("circle")), ("side", string())]),
/// ]).is_err());
/// ```
pub fn discriminated_union<S: Into<Arc<Schema>>>(
    discriminator: &str,
    options: impl IntoIterator<Item = S>,
) -> SchemaResult<Schema> {
    let options: Vec<Arc<Schema>> = options.into_iter().map(Into::into).collect();
    let mut seen: HashSet<String> = HashSet::new();
    for option in &options {
        let Def::Object { shape, .. } = option.def() else {
            return Err(SchemaError::NonObjectOption(option.kind_name()));
        };
        let prop = shape
            .get(discriminator)
            .ok_or_else(|| SchemaError::MissingDiscriminator(discriminator.to_string()))?;
        let keys = discriminator_keys(prop)
            .ok_or_else(|| SchemaError::MissingDiscriminator(discriminator.to_string()))?;
        for key in keys {
            if !seen.insert(key.clone()) {
                return Err(SchemaError::DuplicateDiscriminator(key));
            }
        }
    }
    Ok(Schema::from_def(Def::DiscriminatedUnion {
        discriminator: discriminator.to_string(),
        options,
        lookup: OnceCell::new(),
        fallback: false,
    }))
}

/// Intersection of two schemas; outputs are deep-merged.
pub fn intersection(left: impl Into<Arc<Schema>>, right: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Intersection {
        left: left.into(),
        right: right.into(),
    })
}

/// Record schema over string keys.
pub fn record(key: impl Into<Arc<Schema>>, value: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Record {
        key: key.into(),
        value: value.into(),
    })
}

/// Map-container schema.
pub fn map_of(key: impl Into<Arc<Schema>>, value: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Map {
        key: key.into(),
        value: value.into(),
    })
}

/// Set-container schema.
pub fn set_of(element: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Set {
        element: element.into(),
    })
}

/// Accepts `undefined` in addition to `inner`.
pub fn optional(inner: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Optional {
        inner: inner.into(),
    })
}

/// Accepts `null` in addition to `inner`.
pub fn nullable(inner: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Nullable {
        inner: inner.into(),
    })
}

/// Accepts `undefined` and `null` in addition to `inner`.
pub fn nullish(inner: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Nullish {
        inner: inner.into(),
    })
}

/// Substitutes `default` for `undefined` input without validating it; the
/// default is trusted.
pub fn defaulted(inner: impl Into<Arc<Schema>>, default: impl Into<Value>) -> Schema {
    Schema::from_def(Def::Default {
        inner: inner.into(),
        default: default.into(),
    })
}

/// Substitutes `default` for `undefined` input and runs it through the
/// inner schema; the seed value is *not* trusted.
pub fn prefault(inner: impl Into<Arc<Schema>>, default: impl Into<Value>) -> Schema {
    Schema::from_def(Def::Prefault {
        inner: inner.into(),
        default: default.into(),
    })
}

/// Converts inner-schema failure into success with a computed fallback.
pub fn catch(
    inner: impl Into<Arc<Schema>>,
    fallback: impl Fn(&Value, &[Issue]) -> Value + Send + Sync + 'static,
) -> Schema {
    Schema::from_def(Def::Catch {
        inner: inner.into(),
        fallback: Arc::new(fallback),
    })
}

/// Rejects an `undefined` result the inner schema would allow.
pub fn non_optional(inner: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::NonOptional {
        inner: inner.into(),
    })
}

/// Chains two schemas left-to-right.
pub fn pipe(left: impl Into<Arc<Schema>>, right: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Pipe {
        left: left.into(),
        right: right.into(),
    })
}

/// Applies a synchronous value transform.
pub fn transform(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Schema {
    Schema::from_def(Def::Transform {
        transformer: Transformer::Sync(Arc::new(f)),
    })
}

/// Applies an asynchronous value transform; only legal under
/// `parse_async`.
pub fn transform_async(
    f: impl Fn(Value) -> BoxFuture<'static, Value> + Send + Sync + 'static,
) -> Schema {
    Schema::from_def(Def::Transform {
        transformer: Transformer::Async(Arc::new(f)),
    })
}

/// Marks the inner schema's output as read-only.
pub fn readonly(inner: impl Into<Arc<Schema>>) -> Schema {
    Schema::from_def(Def::Readonly {
        inner: inner.into(),
    })
}

/// A deferred self-reference for recursive schemas.
///
/// Returns the placeholder schema and the slot to resolve once the full
/// graph exists:
///
/// ```
/// use std::sync::Arc;
/// use runtype_core::{array, lazy, object, optional, string, safe_parse};
///
/// let (node_ref, slot) = lazy();
/// let node = Arc::new(object([
///     ("name", string()),
///     ("children", optional(array(node_ref))),
/// ]));
/// slot.resolve(node.clone()).unwrap();
///
/// let input = serde_json::json!({
///     "name": "root",
///     "children": [{"name": "leaf"}],
/// });
/// assert!(safe_parse(&node, input.into()).unwrap().success());
/// ```
pub fn lazy() -> (Schema, LazySlot) {
    let slot = LazySlot {
        cell: Arc::new(OnceCell::new()),
    };
    (
        Schema::from_def(Def::Lazy { slot: slot.clone() }),
        slot,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_attachment_folds_metadata() {
        use crate::check::{lt, lte};

        let schema = number().check(lt(10.0)).check(lte(5.0));
        let max = schema.bag().maximum.unwrap();
        assert_eq!(max.value, 5.0);
        assert!(max.inclusive);
    }

    #[test]
    fn test_discriminated_union_rejects_non_object_options() {
        let err = discriminated_union("type", [string()]).unwrap_err();
        assert!(matches!(err, SchemaError::NonObjectOption("string")));
    }

    #[test]
    fn test_discriminated_union_rejects_missing_discriminator() {
        let err =
            discriminated_union("type", [object([("name", string())])]).unwrap_err();
        assert!(matches!(err, SchemaError::MissingDiscriminator(_)));
    }

    #[test]
    fn test_optionality_flags_propagate_through_wrappers() {
        let schema = optional(string());
        assert!(schema.accepts_undefined_input());
        assert!(schema.produces_undefined_output());

        let piped = pipe(optional(string()), string());
        assert!(piped.accepts_undefined_input());
        assert!(!piped.produces_undefined_output());

        let defaulted = defaulted(string(), "fallback");
        assert!(defaulted.accepts_undefined_input());
        assert!(!defaulted.produces_undefined_output());
    }

    #[test]
    fn test_lazy_slot_resolves_once() {
        let (_schema, slot) = lazy();
        assert!(slot.resolve(string()).is_ok());
        assert!(matches!(
            slot.resolve(string()),
            Err(SchemaError::LazyAlreadyResolved)
        ));
    }
}
