//! Conversion and validation of raw choice values.
//!
//! Every [`Source`](crate::source::Source) runs the conversions registered for a
//! choice over its own raw value, so a bad value is reported against the source
//! it came from. Conversions are pure: they take a [`Value`] and return a new
//! one, and running a conversion over a value it already produced is a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Range, RangeInclusive};

use thiserror::Error;

use crate::value::Value;

/// Conversions registered per choice key, applied in registration order.
pub type ConversionTable = BTreeMap<String, Vec<Conversion>>;

/// A rule that validates and coerces one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Decimal digits only; becomes [`Value::Integer`].
    Integer,
    /// `true` or `false`, any case; becomes [`Value::Boolean`].
    Boolean,
    /// Comma-separated string becomes [`Value::List`]. There is no way to escape
    /// a comma.
    StringList,
    /// The value (or every element of a list) must be one of these.
    OneOf(Vec<String>),
    /// A list's length must satisfy the arity.
    Length(Arity),
}

impl Conversion {
    pub fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        match self {
            Conversion::Integer => to_integer(value),
            Conversion::Boolean => to_boolean(value),
            Conversion::StringList => Ok(to_list(value)),
            Conversion::OneOf(allowed) => check_membership(value, allowed),
            Conversion::Length(arity) => check_length(value, *arity),
        }
    }

    pub fn checks_length(&self) -> bool {
        matches!(self, Conversion::Length(_))
    }
}

/// Run `conversions` over `value` in order. The first failure wins.
pub fn convert_all(value: Value, conversions: &[Conversion]) -> Result<Value, ConversionError> {
    conversions
        .iter()
        .try_fold(value, |value, conversion| conversion.convert(value))
}

fn to_integer(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Integer(_) => Ok(value),
        Value::String(s) => {
            if !s.is_empty()
                && s.bytes().all(|b| b.is_ascii_digit())
                && let Ok(n) = s.parse::<i64>()
            {
                return Ok(Value::Integer(n));
            }
            Err(ConversionError::BadFormat {
                expected: "an integer",
                value: s,
            })
        }
        other => Err(ConversionError::BadFormat {
            expected: "an integer",
            value: other.to_string(),
        }),
    }
}

fn to_boolean(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Boolean(_) => Ok(value),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
        other => Err(ConversionError::BadFormat {
            expected: "a boolean",
            value: other.to_string(),
        }),
    }
}

fn to_list(value: Value) -> Value {
    match value {
        Value::List(_) => value,
        Value::String(s) if s.is_empty() => Value::List(Vec::new()),
        Value::String(s) => Value::List(s.split(',').map(str::to_string).collect()),
        other => Value::List(vec![other.to_string()]),
    }
}

fn check_membership(value: Value, allowed: &[String]) -> Result<Value, ConversionError> {
    let rejected = match &value {
        Value::List(items) => items.iter().find(|item| !allowed.contains(item)).cloned(),
        other => {
            let text = other.to_string();
            (!allowed.contains(&text)).then_some(text)
        }
    };
    match rejected {
        Some(value) => Err(ConversionError::InvalidValue {
            value,
            allowed: allowed.to_vec(),
        }),
        None => Ok(value),
    }
}

fn check_length(value: Value, arity: Arity) -> Result<Value, ConversionError> {
    match &value {
        Value::List(items) if arity.admits(items.len()) => Ok(value),
        Value::List(items) => Err(ArityMismatch::new(items.len(), arity).into()),
        other => Err(ConversionError::BadFormat {
            expected: "a list",
            value: other.to_string(),
        }),
    }
}

/// A required element count: exact, or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn admits(&self, n: usize) -> bool {
        match *self {
            Arity::Exactly(expected) => n == expected,
            Arity::Between(min, max) => (min..=max).contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::Between(min, max) if min == max => write!(f, "{min}"),
            Arity::Between(min, max) if max == min + 1 => write!(f, "{min} or {max}"),
            Arity::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

impl From<usize> for Arity {
    fn from(n: usize) -> Self {
        Arity::Exactly(n)
    }
}

impl From<RangeInclusive<usize>> for Arity {
    fn from(range: RangeInclusive<usize>) -> Self {
        Arity::Between(*range.start(), *range.end())
    }
}

impl From<Range<usize>> for Arity {
    /// The exclusive end is moved down by one: `2..5` admits 2 to 4.
    fn from(range: Range<usize>) -> Self {
        Arity::Between(range.start, range.end.saturating_sub(1))
    }
}

/// A list of the wrong length, rendered as `"3 arguments given, 1 or 2 expected."`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{given} argument{} given, {expected} expected.", plural(.given))]
pub struct ArityMismatch {
    pub given: usize,
    pub expected: Arity,
}

impl ArityMismatch {
    pub fn new(given: usize, expected: Arity) -> Self {
        Self { given, expected }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("must be {expected}, and '{value}' doesn't look right.")]
    BadFormat {
        expected: &'static str,
        value: String,
    },

    #[error("must be one of {}, and '{value}' doesn't look right.", alternatives(.allowed))]
    InvalidValue { value: String, allowed: Vec<String> },

    #[error(transparent)]
    Arity(#[from] ArityMismatch),
}

impl ConversionError {
    /// Describe the failure for the choice a source knows as `external_name`.
    pub fn describe(&self, external_name: &str) -> String {
        match self {
            ConversionError::Arity(mismatch) => format!("{external_name}: {mismatch}"),
            other => format!("{external_name}'s value {other}"),
        }
    }
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 { "" } else { "s" }
}

fn alternatives(allowed: &[String]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|a| format!("'{a}'")).collect();
    match quoted.as_slice() {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|i| i.to_string()).collect())
    }

    #[test]
    fn integer_accepts_digits() {
        assert_eq!(Conversion::Integer.convert(s("19")), Ok(Value::Integer(19)));
    }

    #[test]
    fn integer_rejects_non_digits() {
        for bad in ["hi", "1d", "-5", "", " 3"] {
            assert_eq!(
                Conversion::Integer.convert(s(bad)),
                Err(ConversionError::BadFormat {
                    expected: "an integer",
                    value: bad.to_string(),
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn integer_overflow_is_bad_format() {
        let result = Conversion::Integer.convert(s("99999999999999999999999"));
        assert!(matches!(result, Err(ConversionError::BadFormat { .. })));
    }

    #[test]
    fn boolean_is_case_insensitive() {
        assert_eq!(Conversion::Boolean.convert(s("TRUE")), Ok(Value::Boolean(true)));
        assert_eq!(Conversion::Boolean.convert(s("False")), Ok(Value::Boolean(false)));
    }

    #[test]
    fn boolean_rejects_other_words() {
        let err = Conversion::Boolean.convert(s("yes")).unwrap_err();
        assert_eq!(
            err.describe("--ssh"),
            "--ssh's value must be a boolean, and 'yes' doesn't look right."
        );
    }

    #[test]
    fn converting_typed_values_again_is_a_no_op() {
        assert_eq!(
            Conversion::Integer.convert(Value::Integer(7)),
            Ok(Value::Integer(7))
        );
        assert_eq!(
            Conversion::Boolean.convert(Value::Boolean(false)),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            Conversion::StringList.convert(list(&["a", "b,c"])),
            Ok(list(&["a", "b,c"]))
        );
    }

    #[test]
    fn string_list_splits_on_commas() {
        assert_eq!(
            Conversion::StringList.convert(s("a,b,c")),
            Ok(list(&["a", "b", "c"]))
        );
    }

    #[test]
    fn string_list_of_empty_string_is_empty() {
        assert_eq!(Conversion::StringList.convert(s("")), Ok(list(&[])));
    }

    #[test]
    fn one_of_accepts_member() {
        let conv = Conversion::OneOf(vec!["a".into(), "b".into()]);
        assert_eq!(conv.convert(s("a")), Ok(s("a")));
    }

    #[test]
    fn one_of_rejects_non_member() {
        let conv = Conversion::OneOf(vec!["a".into(), "b".into()]);
        let err = conv.convert(s("not-a")).unwrap_err();
        assert_eq!(
            err.describe("--a-or-b"),
            "--a-or-b's value must be one of 'a' or 'b', and 'not-a' doesn't look right."
        );
    }

    #[test]
    fn one_of_checks_every_list_element() {
        let conv = Conversion::OneOf(vec!["x".into(), "y".into(), "z".into()]);
        let err = conv.convert(list(&["x", "q"])).unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidValue {
                value: "q".into(),
                allowed: vec!["x".into(), "y".into(), "z".into()],
            }
        );
        assert!(err.to_string().contains("'x', 'y', or 'z'"));
    }

    #[test]
    fn length_exact() {
        let conv = Conversion::Length(2.into());
        assert!(conv.convert(list(&["1", "2"])).is_ok());
        assert_eq!(
            conv.convert(list(&["1"])).unwrap_err().to_string(),
            "1 argument given, 2 expected."
        );
        assert_eq!(
            conv.convert(list(&["1", "2", "3"])).unwrap_err().to_string(),
            "3 arguments given, 2 expected."
        );
    }

    #[test]
    fn length_wide_range_renders_to() {
        let conv = Conversion::Length((2..=4).into());
        assert!(conv.convert(list(&["1", "2", "3"])).is_ok());
        assert_eq!(
            conv.convert(list(&["1"])).unwrap_err().to_string(),
            "1 argument given, 2 to 4 expected."
        );
        assert_eq!(
            conv.convert(list(&["1", "2", "3", "4", "5"]))
                .unwrap_err()
                .to_string(),
            "5 arguments given, 2 to 4 expected."
        );
    }

    #[test]
    fn length_narrow_range_renders_or() {
        let conv = Conversion::Length((1..=2).into());
        assert_eq!(
            conv.convert(list(&["1", "2", "3"])).unwrap_err().to_string(),
            "3 arguments given, 1 or 2 expected."
        );
    }

    #[test]
    fn exclusive_range_end_is_adjusted() {
        assert_eq!(Arity::from(2..5), Arity::Between(2, 4));
        assert_eq!(Arity::from(2..5).to_string(), "2 to 4");
        assert_eq!(Arity::from(0..2).to_string(), "0 or 1");
    }

    #[test]
    fn length_on_scalar_is_bad_format() {
        let err = Conversion::Length(1.into()).convert(s("x")).unwrap_err();
        assert!(matches!(err, ConversionError::BadFormat { expected: "a list", .. }));
    }

    #[test]
    fn first_failing_conversion_aborts() {
        let conversions = vec![
            Conversion::StringList,
            Conversion::Length(2.into()),
            Conversion::OneOf(vec!["never".into()]),
        ];
        let err = convert_all(s("a,b,c"), &conversions).unwrap_err();
        assert!(matches!(err, ConversionError::Arity(_)));
    }

    #[test]
    fn convert_all_chains_in_order() {
        let conversions = vec![Conversion::StringList, Conversion::Length((1..=2).into())];
        assert_eq!(convert_all(s("a,b"), &conversions), Ok(list(&["a", "b"])));
    }

    #[test]
    fn arity_describe_has_no_possessive() {
        let err = ConversionError::Arity(ArityMismatch::new(3, Arity::Exactly(2)));
        assert_eq!(err.describe("files"), "files: 3 arguments given, 2 expected.");
    }
}
