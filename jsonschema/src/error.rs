//! Export failures.

use thiserror::Error;

/// Why a schema graph could not be rendered as a JSON Schema document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The graph contains a kind JSON Schema has no vocabulary for, and
    /// the caller asked for strict export.
    #[error("schema kind `{0}` has no JSON Schema representation")]
    Unrepresentable(&'static str),
    /// A `lazy` slot was never resolved; the graph is incomplete.
    #[error("lazy schema slot was never resolved")]
    UnresolvedLazy,
    /// A literal, enum, or example value does not convert to JSON.
    #[error("value not representable in JSON: {0}")]
    Value(String),
}
