//! Parse-time configuration: locale and error-map overrides.
//!
//! Configuration is passed explicitly into the top-level parse calls and
//! read only when issues are finalized at the boundary — never earlier, so
//! the same issue list could be re-rendered under a different locale. A
//! process-wide default can be installed once at startup; after that the
//! configuration is read-only.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::issue::{ErrorMapper, Issue};
use crate::locale::{En, Locale};

static DEFAULT_CONFIG: OnceCell<ParseConfig> = OnceCell::new();

/// Per-call parse configuration.
#[derive(Clone)]
pub struct ParseConfig {
    locale: Arc<dyn Locale>,
    error_map: Option<ErrorMapper>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            locale: Arc::new(En),
            error_map: None,
        }
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("locale", &self.locale.name())
            .field("error_map", &self.error_map.is_some())
            .finish()
    }
}

impl ParseConfig {
    /// Uses the given locale for default messages.
    pub fn with_locale(mut self, locale: impl Locale + 'static) -> Self {
        self.locale = Arc::new(locale);
        self
    }

    /// Installs a per-call error map consulted before the locale.
    pub fn with_error_map(
        mut self,
        map: impl Fn(&Issue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.error_map = Some(Arc::new(map));
        self
    }

    /// Resolves the human-readable message for one issue.
    ///
    /// Resolution order, first non-empty wins: message already set by a
    /// node/check override, this call's error map, the process-global error
    /// map, the locale formatter, a generic fallback.
    pub(crate) fn finalize(&self, issue: &mut Issue) {
        if issue.message.is_some() {
            return;
        }
        if let Some(map) = &self.error_map {
            if let Some(message) = map(issue) {
                issue.message = Some(message);
                return;
            }
        }
        if let Some(global) = DEFAULT_CONFIG.get() {
            if let Some(map) = &global.error_map {
                if let Some(message) = map(issue) {
                    issue.message = Some(message);
                    return;
                }
            }
        }
        let message = self.locale.message(issue);
        issue.message = Some(if message.is_empty() {
            format!("invalid input ({})", issue.code.tag())
        } else {
            message
        });
    }
}

/// Installs the process-wide default configuration.
///
/// Returns `false` if a default was already installed (set-once semantics;
/// the first writer wins and later calls are ignored).
pub fn set_default_config(config: ParseConfig) -> bool {
    DEFAULT_CONFIG.set(config).is_ok()
}

/// The effective default configuration for calls without an explicit one.
pub(crate) fn default_config() -> ParseConfig {
    DEFAULT_CONFIG.get().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueCode;
    use crate::value::Value;

    #[test]
    fn test_finalize_prefers_existing_message() {
        let config = ParseConfig::default().with_error_map(|_| Some("mapped".into()));
        let mut issue = Issue::new(
            IssueCode::Custom {
                note: "rule".into(),
            },
            Value::Null,
        );
        issue.message = Some("from the node".into());
        config.finalize(&mut issue);
        assert_eq!(issue.message.as_deref(), Some("from the node"));
    }

    #[test]
    fn test_finalize_call_map_overrides_locale() {
        let config = ParseConfig::default().with_error_map(|issue| {
            matches!(issue.code, IssueCode::Custom { .. }).then(|| "mapped".to_string())
        });
        let mut custom = Issue::new(
            IssueCode::Custom {
                note: "rule".into(),
            },
            Value::Null,
        );
        config.finalize(&mut custom);
        assert_eq!(custom.message.as_deref(), Some("mapped"));

        let mut other = Issue::new(
            IssueCode::InvalidType {
                expected: "string".into(),
                received: "null".into(),
            },
            Value::Null,
        );
        config.finalize(&mut other);
        assert_eq!(
            other.message.as_deref(),
            Some("invalid type: expected string, received null")
        );
    }
}
