//! Russian locale, including three-form Slavic plural selection.

use super::Locale;
use crate::issue::{Issue, IssueCode};
use crate::value::{fmt_number, fmt_value};

/// The built-in Russian formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ru;

/// Selects the Russian plural form for `count`: one (1, 21, …), few (2–4,
/// 22–24, …), many (everything else, including 11–14).
fn plural<'a>(count: usize, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let tail2 = count % 100;
    let tail1 = count % 10;
    if tail1 == 1 && tail2 != 11 {
        one
    } else if (2..=4).contains(&tail1) && !(12..=14).contains(&tail2) {
        few
    } else {
        many
    }
}

impl Locale for Ru {
    fn name(&self) -> &'static str {
        "ru"
    }

    fn message(&self, issue: &Issue) -> String {
        match &issue.code {
            IssueCode::InvalidType { expected, received } => {
                format!("неверный тип: ожидается {expected}, получено {received}")
            }
            IssueCode::InvalidValue { values } => {
                let allowed = values.iter().map(fmt_value).collect::<Vec<_>>().join(", ");
                format!("недопустимое значение: ожидается одно из {allowed}")
            }
            IssueCode::TooBig { maximum, inclusive } => {
                if *inclusive {
                    format!("должно быть не больше {}", fmt_number(*maximum))
                } else {
                    format!("должно быть меньше {}", fmt_number(*maximum))
                }
            }
            IssueCode::TooSmall { minimum, inclusive } => {
                if *inclusive {
                    format!("должно быть не меньше {}", fmt_number(*minimum))
                } else {
                    format!("должно быть больше {}", fmt_number(*minimum))
                }
            }
            IssueCode::InvalidFormat { format, .. } => {
                format!("неверный формат: {format}")
            }
            IssueCode::NotMultipleOf { divisor } => {
                format!("должно быть кратно {}", fmt_number(*divisor))
            }
            IssueCode::UnrecognizedKeys { keys } => {
                let noun = plural(
                    keys.len(),
                    "нераспознанный ключ",
                    "нераспознанных ключа",
                    "нераспознанных ключей",
                );
                format!("{} {noun}: {}", keys.len(), keys.join(", "))
            }
            IssueCode::InvalidKey { .. } => "недопустимый ключ".to_string(),
            IssueCode::InvalidUnion { options } => {
                let noun = plural(options.len(), "вариант", "варианта", "вариантов");
                format!(
                    "ни один вариант объединения не подошёл (проверено {} {noun})",
                    options.len()
                )
            }
            IssueCode::InvalidElement { .. } => "недопустимый элемент".to_string(),
            IssueCode::Custom { note } => note.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_plural_form_selection() {
        assert_eq!(plural(1, "ключ", "ключа", "ключей"), "ключ");
        assert_eq!(plural(3, "ключ", "ключа", "ключей"), "ключа");
        assert_eq!(plural(5, "ключ", "ключа", "ключей"), "ключей");
        assert_eq!(plural(11, "ключ", "ключа", "ключей"), "ключей");
        assert_eq!(plural(21, "ключ", "ключа", "ключей"), "ключ");
        assert_eq!(plural(24, "ключ", "ключа", "ключей"), "ключа");
    }

    #[test]
    fn test_unrecognized_keys_message_uses_plural() {
        let issue = Issue::new(
            IssueCode::UnrecognizedKeys {
                keys: vec!["a".into(), "b".into()],
            },
            Value::Null,
        );
        assert_eq!(Ru.message(&issue), "2 нераспознанных ключа: a, b");
    }
}
