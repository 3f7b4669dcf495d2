//! Comparable values.
//!
//! Every observation the browser layer hands back is normalised into a
//! [`Value`] before it reaches the comparison engine. A missing attribute,
//! or text that does not read as a number, becomes [`Value::Absent`]
//! instead of an error.

use crate::relation::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tagged union of absent, text and real-number values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// No such value (missing attribute, unparsable number)
    #[default]
    Absent,
    /// String-kind value
    Text(String),
    /// Numeric-kind value
    Number(f64),
}

impl Value {
    /// Wrap an optional observed string
    #[must_use]
    pub fn from_observed(observed: Option<String>) -> Self {
        observed.map_or(Self::Absent, Self::Text)
    }

    /// Convert an optional observed string into a numeric value.
    ///
    /// Unparsable or missing text yields [`Value::Absent`].
    #[must_use]
    pub fn number_from_observed(observed: Option<&str>) -> Self {
        observed
            .and_then(parse_number)
            .map_or(Self::Absent, Self::Number)
    }

    /// Text value
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Whether the value is absent
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the value is present
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Whether the value is numeric
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Kind of a present value; `None` when absent
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Absent => None,
            Self::Text(_) => Some(ValueKind::Text),
            Self::Number(_) => Some(ValueKind::Number),
        }
    }

    /// Borrow the text, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a numeric value
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Reinterpret this value as a number.
    ///
    /// Text is parsed, numbers pass through, anything else is absent.
    #[must_use]
    pub fn to_number(&self) -> Self {
        match self {
            Self::Text(s) => Self::number_from_observed(Some(s.as_str())),
            Self::Number(n) => Self::Number(*n),
            Self::Absent => Self::Absent,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "no such value"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Option<String>> for Value {
    fn from(observed: Option<String>) -> Self {
        Self::from_observed(observed)
    }
}

/// Locale-independent real-number parse.
///
/// Surrounding whitespace is ignored. Only finite decimal literals count:
/// `NaN`, `inf` and friends are treated as non-numeric text.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str also accepts "inf"/"nan" spellings; a literal must carry a digit
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Shortest text that parses back to the same number (`42.0` renders as `42`)
#[must_use]
pub fn format_number(n: f64) -> String {
    format!("{n}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_trims_whitespace() {
            assert_eq!(parse_number("  42.0  "), Some(42.0));
            assert_eq!(parse_number("\t-3.5\n"), Some(-3.5));
        }

        #[test]
        fn test_parse_accepts_exponent_and_sign() {
            assert_eq!(parse_number("1e3"), Some(1000.0));
            assert_eq!(parse_number("+7"), Some(7.0));
            assert_eq!(parse_number(".5"), Some(0.5));
        }

        #[test]
        fn test_parse_rejects_text() {
            assert_eq!(parse_number("abc"), None);
            assert_eq!(parse_number(""), None);
            assert_eq!(parse_number("   "), None);
            assert_eq!(parse_number("12abc"), None);
        }

        #[test]
        fn test_parse_is_locale_independent() {
            assert_eq!(parse_number("1,5"), None);
            assert_eq!(parse_number("1 000"), None);
        }

        #[test]
        fn test_parse_rejects_non_finite_words() {
            assert_eq!(parse_number("NaN"), None);
            assert_eq!(parse_number("inf"), None);
            assert_eq!(parse_number("-Infinity"), None);
        }

        #[test]
        fn test_parse_rejects_overflow() {
            assert_eq!(parse_number("1e400"), None);
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_from_observed() {
            assert_eq!(Value::from_observed(None), Value::Absent);
            assert_eq!(Value::from_observed(Some("x".into())), Value::text("x"));
        }

        #[test]
        fn test_number_from_observed() {
            assert_eq!(Value::number_from_observed(Some(" 42 ")), Value::Number(42.0));
            assert_eq!(Value::number_from_observed(Some("abc")), Value::Absent);
            assert_eq!(Value::number_from_observed(None), Value::Absent);
        }

        #[test]
        fn test_kind() {
            assert_eq!(Value::Absent.kind(), None);
            assert_eq!(Value::text("a").kind(), Some(ValueKind::Text));
            assert_eq!(Value::Number(1.0).kind(), Some(ValueKind::Number));
        }

        #[test]
        fn test_to_number() {
            assert_eq!(Value::text("3.25").to_number(), Value::Number(3.25));
            assert_eq!(Value::text("three").to_number(), Value::Absent);
            assert_eq!(Value::Absent.to_number(), Value::Absent);
        }

        #[test]
        fn test_display() {
            assert_eq!(Value::Absent.to_string(), "no such value");
            assert_eq!(Value::text("Save").to_string(), "\"Save\"");
            assert_eq!(Value::Number(42.0).to_string(), "42");
            assert_eq!(Value::Number(0.5).to_string(), "0.5");
        }

        #[test]
        fn test_serde_tagging() {
            let json = serde_json::to_string(&Value::Number(1.5)).unwrap();
            assert_eq!(json, r#"{"kind":"number","value":1.5}"#);
            let back: Value = serde_json::from_str(r#"{"kind":"absent"}"#).unwrap();
            assert_eq!(back, Value::Absent);
        }
    }

    proptest! {
        /// Formatting then parsing preserves the numeric value
        #[test]
        fn prop_number_round_trip(n in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let parsed = parse_number(&format_number(n));
            prop_assert_eq!(parsed, Some(n));
        }

        /// Valid literals, padded or not, parse to their value and format back to it
        #[test]
        fn prop_literal_parse_format_round_trip(
            literal in "[+-]?[0-9]{1,6}(\\.[0-9]{0,6})?([eE][+-]?[0-9]{1,2})?",
            left in "[ \t]{0,2}",
            right in "[ \t]{0,2}",
        ) {
            let expected: f64 = literal.parse().unwrap();
            let parsed = parse_number(&format!("{left}{literal}{right}"));
            prop_assert_eq!(parsed, Some(expected));
            prop_assert_eq!(parse_number(&format_number(expected)), Some(expected));
            prop_assert!(Value::number_from_observed(Some(literal.as_str())).is_number());
        }

        /// Digit-free strings never parse
        #[test]
        fn prop_non_numeric_is_absent(s in "[a-zA-Z ,;:!?-]{0,16}") {
            prop_assert_eq!(parse_number(&s), None);
            prop_assert!(!Value::number_from_observed(Some(s.as_str())).is_number());
        }
    }
}
