//! English (default) locale.

use super::Locale;
use crate::issue::{Issue, IssueCode};
use crate::value::{fmt_number, fmt_value};

/// The built-in English formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct En;

impl Locale for En {
    fn name(&self) -> &'static str {
        "en"
    }

    fn message(&self, issue: &Issue) -> String {
        match &issue.code {
            IssueCode::InvalidType { expected, received } => {
                format!("invalid type: expected {expected}, received {received}")
            }
            IssueCode::InvalidValue { values } => {
                let allowed = values.iter().map(fmt_value).collect::<Vec<_>>().join(", ");
                format!("invalid value: expected one of {allowed}")
            }
            IssueCode::TooBig { maximum, inclusive } => {
                if *inclusive {
                    format!("must be at most {}", fmt_number(*maximum))
                } else {
                    format!("must be less than {}", fmt_number(*maximum))
                }
            }
            IssueCode::TooSmall { minimum, inclusive } => {
                if *inclusive {
                    format!("must be at least {}", fmt_number(*minimum))
                } else {
                    format!("must be greater than {}", fmt_number(*minimum))
                }
            }
            IssueCode::InvalidFormat { format, .. } => format!("invalid {format}"),
            IssueCode::NotMultipleOf { divisor } => {
                format!("must be a multiple of {}", fmt_number(*divisor))
            }
            IssueCode::UnrecognizedKeys { keys } => {
                let noun = if keys.len() == 1 { "key" } else { "keys" };
                format!("unrecognized {noun}: {}", keys.join(", "))
            }
            IssueCode::InvalidKey { .. } => "invalid key".to_string(),
            IssueCode::InvalidUnion { options } => {
                format!("no union option matched ({} tried)", options.len())
            }
            IssueCode::InvalidElement { .. } => "invalid element".to_string(),
            IssueCode::Custom { note } => note.clone(),
        }
    }
}
