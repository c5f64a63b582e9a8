//! Pluggable locale formatters for issue messages.
//!
//! A locale is a pure `Issue -> String` function; pluralization and unit
//! nouns are locale-specific. Locales are consulted only at the parse
//! boundary, after node- and call-level overrides have had their chance.

mod en;
mod ru;

pub use en::En;
pub use ru::Ru;

use crate::issue::Issue;

/// A locale-specific issue formatter.
pub trait Locale: Send + Sync {
    /// A short identifier (`"en"`, `"ru"`), used in diagnostics.
    fn name(&self) -> &'static str;

    /// Renders the default message for one issue.
    fn message(&self, issue: &Issue) -> String;
}
