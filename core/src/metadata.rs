//! Derived metadata cached on schema nodes.
//!
//! The bag is folded once, at check-attachment time, and read only by
//! introspection (JSON-Schema export) and a few engine optimizations
//! (closed-domain records, discriminated-union dispatch). Validation never
//! writes to it.

use crate::check::CheckKind;
use crate::formats::StringFormat;
use crate::value::Value;

/// An inclusive or exclusive numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// The bound value.
    pub value: f64,
    /// Whether the bound value itself is allowed.
    pub inclusive: bool,
}

impl Bound {
    /// Whether `self` is a tighter *minimum* than `other`.
    ///
    /// Higher value wins; on a tie the exclusive bound is strictly tighter.
    fn tighter_min(&self, other: &Bound) -> bool {
        self.value > other.value || (self.value == other.value && !self.inclusive)
    }

    /// Whether `self` is a tighter *maximum* than `other`.
    fn tighter_max(&self, other: &Bound) -> bool {
        self.value < other.value || (self.value == other.value && !self.inclusive)
    }
}

/// Facts inferred from a node's definition and attached checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataBag {
    /// Tightest minimum-value bound seen.
    pub minimum: Option<Bound>,
    /// Tightest maximum-value bound seen.
    pub maximum: Option<Bound>,
    /// Tightest minimum length (strings, arrays).
    pub min_length: Option<usize>,
    /// Tightest maximum length (strings, arrays).
    pub max_length: Option<usize>,
    /// Tightest minimum size (maps, sets).
    pub min_size: Option<usize>,
    /// Tightest maximum size (maps, sets).
    pub max_size: Option<usize>,
    /// Most recent multiple-of divisor.
    pub multiple_of: Option<f64>,
    /// Most recent regex pattern source.
    pub pattern: Option<String>,
    /// Most recent string format.
    pub format: Option<StringFormat>,
    /// Enumerable finite value set (literal/enum nodes).
    pub values: Option<Vec<Value>>,
}

impl MetadataBag {
    /// Folds one check's constraint into the bag, keeping the tightest
    /// bound seen so far.
    pub(crate) fn fold(&mut self, kind: &CheckKind) {
        match kind {
            CheckKind::MinValue { bound } => {
                if self.minimum.is_none_or(|cur| bound.tighter_min(&cur)) {
                    self.minimum = Some(*bound);
                }
            }
            CheckKind::MaxValue { bound } => {
                if self.maximum.is_none_or(|cur| bound.tighter_max(&cur)) {
                    self.maximum = Some(*bound);
                }
            }
            CheckKind::MinLength { min } => {
                if self.min_length.is_none_or(|cur| *min > cur) {
                    self.min_length = Some(*min);
                }
            }
            CheckKind::MaxLength { max } => {
                if self.max_length.is_none_or(|cur| *max < cur) {
                    self.max_length = Some(*max);
                }
            }
            CheckKind::MinSize { min } => {
                if self.min_size.is_none_or(|cur| *min > cur) {
                    self.min_size = Some(*min);
                }
            }
            CheckKind::MaxSize { max } => {
                if self.max_size.is_none_or(|cur| *max < cur) {
                    self.max_size = Some(*max);
                }
            }
            CheckKind::MultipleOf { divisor } => self.multiple_of = Some(*divisor),
            CheckKind::Pattern { regex } => self.pattern = Some(regex.as_str().to_string()),
            CheckKind::Format { format } => {
                self.format = Some(*format);
                if self.pattern.is_none() {
                    self.pattern = format.pattern().map(str::to_string);
                }
            }
            CheckKind::Trim
            | CheckKind::Lowercase
            | CheckKind::Uppercase
            | CheckKind::Custom { .. }
            | CheckKind::CustomAsync { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_keeps_tightest_maximum() {
        let mut bag = MetadataBag::default();
        bag.fold(&CheckKind::MaxValue {
            bound: Bound {
                value: 10.0,
                inclusive: false,
            },
        });
        bag.fold(&CheckKind::MaxValue {
            bound: Bound {
                value: 5.0,
                inclusive: false,
            },
        });
        bag.fold(&CheckKind::MaxValue {
            bound: Bound {
                value: 7.0,
                inclusive: true,
            },
        });

        assert_eq!(
            bag.maximum,
            Some(Bound {
                value: 5.0,
                inclusive: false
            })
        );
    }

    #[test]
    fn test_fold_tie_prefers_exclusive_bound() {
        let mut bag = MetadataBag::default();
        bag.fold(&CheckKind::MinValue {
            bound: Bound {
                value: 3.0,
                inclusive: true,
            },
        });
        bag.fold(&CheckKind::MinValue {
            bound: Bound {
                value: 3.0,
                inclusive: false,
            },
        });

        assert_eq!(
            bag.minimum,
            Some(Bound {
                value: 3.0,
                inclusive: false
            })
        );
    }
}
