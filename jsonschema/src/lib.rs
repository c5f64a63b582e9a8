//! JSON Schema export for `runtype-core` schema graphs.
//!
//! Rendering is introspection-only: it never mutates the graph and never
//! runs validation. Coercions, catches, transforms, and custom checks
//! have no JSON Schema equivalent, so the exported document describes the
//! accepted input shape, not the parse output.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use runtype_core::{number, object, optional, string};
//! use runtype_jsonschema::{ExportOptions, to_json_schema};
//!
//! let user = Arc::new(object([
//!     ("name", string()),
//!     ("age", optional(number())),
//! ]));
//! let doc = to_json_schema(&user, &ExportOptions::default())?;
//! assert_eq!(doc["type"], "object");
//! assert_eq!(doc["required"], serde_json::json!(["name"]));
//! # Ok::<(), runtype_jsonschema::ExportError>(())
//! ```

mod error;
mod export;

pub use error::ExportError;
pub use export::{
    ExportOptions, ReusePolicy, UnrepresentableBehavior, registry_to_json_schema, to_json_schema,
};
