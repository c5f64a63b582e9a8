//! Composable runtime validation schemas.
//!
//! A schema is an immutable description of the shape a value must have.
//! Schemas are built from small constructors (`string()`, `object(...)`,
//! `union(...)`), refined with attached checks, and executed against a
//! [`Value`] to produce either the validated (possibly transformed)
//! output or an ordered list of localized [`Issue`]s.
//!
//! # Examples
//!
//! ```
//! use runtype_core::{object, optional, parse, string, number};
//! use runtype_core::check::{gte, min_length};
//!
//! let user = object([
//!     ("name", string().check(min_length(1))),
//!     ("age", number().check(gte(0.0))),
//!     ("nickname", optional(string())),
//! ]);
//!
//! let value = parse(&user, serde_json::json!({
//!     "name": "Ada",
//!     "age": 36,
//! }).into())?;
//! assert_eq!(value, serde_json::json!({"name": "Ada", "age": 36.0}).into());
//!
//! let bad = parse(&user, serde_json::json!({"name": "", "age": -1}).into());
//! assert!(bad.is_err());
//! # Ok::<(), runtype_core::ParseError>(())
//! ```
//!
//! Validation never panics on bad input: `safe_parse` reports failures as
//! data, and `parse` converts them into a [`ParseError`]. The only `Err`
//! a `safe_parse` produces is a contract violation such as running an
//! asynchronous schema under a synchronous parse.

pub mod check;
pub mod config;
mod engine;
pub mod error;
pub mod formats;
pub mod issue;
pub mod locale;
pub mod metadata;
pub mod ops;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod value;

pub use config::{ParseConfig, set_default_config};
pub use engine::BoxFuture;
pub use error::{
    ExecError, FlattenedErrors, ParseError, SchemaError, SchemaResult, ValidationError,
};
pub use issue::{ErrorMapper, Issue, IssueCode, PathSegment};
pub use locale::{En, Locale, Ru};
pub use ops::{extend, merge, omit, partial, pick, required};
pub use parse::{
    Parsed, parse, parse_async, parse_async_with, parse_with, safe_parse, safe_parse_async,
    safe_parse_async_with, safe_parse_with,
};
pub use registry::{Registry, RegistryEntry};
pub use schema::{
    Catchall, Def, LazySlot, ObjectShape, Schema, Transformer, any, array, bigint, boolean,
    catch, date, defaulted, discriminated_union, enumeration, intersection, lazy, literal,
    map_of, non_optional, nullable, nullish, number, object, object_with_rest, optional, pipe,
    prefault, readonly, record, set_of, strict_object, string, transform, transform_async,
    tuple, tuple_with_rest, union,
};
pub use value::Value;
