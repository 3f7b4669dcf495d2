//! Comparison engine.
//!
//! Decides whether two [`Value`]s satisfy a [`Relation`]. Evaluation is total
//! over absent operands:
//!
//! | family    | absent operand | `not*` form |
//! |-----------|----------------|-------------|
//! | equality  | equal only to another absent | negation |
//! | substring | `false`        | `true`      |
//! | ordering  | `false`        | (none)      |
//!
//! so "element has no such attribute" reads as "does not contain X" while
//! never reading as "less than Y".
//!
//! Applying a relation to a kind it is not defined for is a programming
//! error and surfaces as [`BotError::MalformedRelation`].

use crate::relation::{Relation, RelationFamily, ValueKind};
use crate::result::{BotError, BotResult};
use crate::value::Value;
use regex::Regex;

/// Evaluate `actual <relation> expected`.
///
/// # Errors
///
/// [`BotError::MalformedRelation`] when an operand's kind does not support
/// the relation (or the operands disagree on kind), and
/// [`BotError::InvalidPattern`] when a `matches` pattern does not compile.
pub fn evaluate(relation: Relation, actual: &Value, expected: &Value) -> BotResult<bool> {
    validate(relation, actual, expected)?;

    match relation.family() {
        RelationFamily::Equality => {
            let equal = values_equal(actual, expected);
            Ok(if relation.is_negated() { !equal } else { equal })
        }
        RelationFamily::Substring => {
            let (Value::Text(actual), Value::Text(expected)) = (actual, expected) else {
                // Absent on either side: positive form false, negated form true
                return Ok(relation.is_negated());
            };
            let holds = substring_holds(relation.positive(), actual, expected)?;
            Ok(if relation.is_negated() { !holds } else { holds })
        }
        RelationFamily::Ordering => {
            let (Value::Number(actual), Value::Number(expected)) = (actual, expected) else {
                return Ok(false);
            };
            Ok(ordering_holds(relation, *actual, *expected))
        }
    }
}

/// Check that the present operands can be compared under `relation`.
///
/// # Errors
///
/// [`BotError::MalformedRelation`] on unsupported or mismatched kinds.
pub fn validate(relation: Relation, actual: &Value, expected: &Value) -> BotResult<()> {
    let kind = match (actual.kind(), expected.kind()) {
        (Some(a), Some(e)) if a != e => {
            return Err(BotError::MalformedRelation { relation, kind: a });
        }
        (Some(k), _) | (None, Some(k)) => k,
        (None, None) => return Ok(()),
    };

    if relation.supports(kind) {
        Ok(())
    } else {
        Err(BotError::MalformedRelation { relation, kind })
    }
}

/// Compile a pattern that must match the whole observed value
///
/// # Errors
///
/// [`BotError::InvalidPattern`] if the pattern does not compile.
pub fn whole_match_regex(pattern: &str) -> BotResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| BotError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Absent, Value::Absent) => true,
        (Value::Text(a), Value::Text(e)) => a == e,
        // IEEE-754: NaN != NaN, -0.0 == 0.0
        (Value::Number(a), Value::Number(e)) => a == e,
        _ => false,
    }
}

fn substring_holds(relation: Relation, actual: &str, expected: &str) -> BotResult<bool> {
    Ok(match relation {
        Relation::Contains => actual.contains(expected),
        Relation::StartsWith => actual.starts_with(expected),
        Relation::EndsWith => actual.ends_with(expected),
        Relation::Matches => whole_match_regex(expected)?.is_match(actual),
        other => {
            return Err(BotError::MalformedRelation {
                relation: other,
                kind: ValueKind::Text,
            })
        }
    })
}

fn ordering_holds(relation: Relation, actual: f64, expected: f64) -> bool {
    match relation {
        Relation::LessThan => actual < expected,
        Relation::LessThanOrEquals => actual <= expected,
        Relation::GreaterThan => actual > expected,
        Relation::GreaterThanOrEquals => actual >= expected,
        _ => false,
    }
}
