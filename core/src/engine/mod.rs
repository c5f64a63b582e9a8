//! The parse/run execution engine.
//!
//! A [`Payload`] (current value plus accumulated issues) travels by mutable
//! reference through the schema graph. Each node's `run` is a thin wrapper:
//! the node's own type/shape parse first, then its attached checks in
//! attachment order with abort semantics. Composite nodes construct child
//! payloads and splice child issues back with the child's path segment
//! prefixed.
//!
//! Execution is dual: the synchronous path here fails fast with
//! [`ExecError::AsyncInSyncContext`] on reaching asynchronous work, and
//! [`future::run_async`] mirrors it with declaration-order awaits so issue
//! ordering is identical either way.

pub(crate) mod checks;
pub(crate) mod composite;
pub(crate) mod future;
pub(crate) mod modifier;
pub(crate) mod primitive;

pub use future::BoxFuture;

use crate::error::ExecError;
use crate::issue::Issue;
use crate::schema::{Def, Schema};
use crate::value::Value;

/// Ephemeral per-call state: the in-flight value and ordered issue list.
#[derive(Debug, Clone)]
pub(crate) struct Payload {
    pub(crate) value: Value,
    pub(crate) issues: Vec<Issue>,
}

impl Payload {
    pub(crate) fn new(value: Value) -> Self {
        Payload {
            value,
            issues: Vec::new(),
        }
    }

    /// Whether any issue pushed since `start` aborts further checks.
    pub(crate) fn aborted_since(&self, start: usize) -> bool {
        self.issues[start..].iter().any(|issue| !issue.can_continue)
    }
}

/// Runs one node: its own parse, then its checks.
pub(crate) fn run(schema: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
    let before = payload.issues.len();
    parse_node(schema, payload)?;
    checks::run_checks(schema, payload, before)
}

fn parse_node(schema: &Schema, payload: &mut Payload) -> Result<(), ExecError> {
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
            composite::parse_object(schema, shape, catchall, payload)
        }
        Def::Array { element } => composite::parse_array(schema, element, payload),
        Def::Tuple { items, rest } => {
            composite::parse_tuple(schema, items, rest.as_ref(), payload)
        }
        Def::Union { options } => composite::parse_union(schema, options, payload),
        Def::DiscriminatedUnion {
            discriminator,
            options,
            lookup,
            fallback,
        } => composite::parse_discriminated_union(
            schema,
            discriminator,
            options,
            lookup,
            *fallback,
            payload,
        ),
        Def::Intersection { left, right } => {
            composite::parse_intersection(left, right, payload)
        }
        Def::Record { key, value } => composite::parse_record(schema, key, value, payload),
        Def::Map { key, value } => composite::parse_map(schema, key, value, payload),
        Def::Set { element } => composite::parse_set(schema, element, payload),
        Def::Optional { inner } => modifier::parse_optional(inner, payload),
        Def::Nullable { inner } => modifier::parse_nullable(inner, payload),
        Def::Nullish { inner } => modifier::parse_nullish(inner, payload),
        Def::Default { inner, default } => modifier::parse_default(inner, default, payload),
        Def::Prefault { inner, default } => {
            modifier::parse_prefault(inner, default, payload)
        }
        Def::Catch { inner, fallback } => modifier::parse_catch(inner, fallback, payload),
        Def::NonOptional { inner } => modifier::parse_non_optional(schema, inner, payload),
        Def::Pipe { left, right } => modifier::parse_pipe(left, right, payload),
        Def::Transform { transformer } => modifier::parse_transform(transformer, payload),
        Def::Readonly { inner } => run(inner, payload),
        Def::Lazy { slot } => match slot.get() {
            Some(inner) => run(inner, payload),
            None => Err(ExecError::UnresolvedLazy),
        },
    }
}
