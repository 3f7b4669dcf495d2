//! Labeled assertion results and failure reporting.
//!
//! A query answers `bool`; an assertion wraps the same query and, on a
//! negative answer, hands a labeled [`AssertionFailure`] to a
//! [`FailureReporter`]. Failures are reported one at a time (fail fast).
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: stop at the first failed check with subject, expected and actual attached

use crate::compare;
use crate::relation::Relation;
use crate::result::{BotError, BotResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// A single labeled assertion failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Human-readable subject ("Url", "Text", an attribute name)
    pub subject: String,
    /// Relation that failed, if the check was relational
    pub relation: Option<Relation>,
    /// Expected operand
    pub expected: Value,
    /// Observed value
    pub actual: Value,
    /// Rendered message
    pub message: String,
    /// Location where the assertion was made (<file:line>)
    pub location: Option<String>,
}

impl AssertionFailure {
    /// Attach a source location
    #[must_use]
    pub fn at(mut self, location: &Location<'_>) -> Self {
        self.location = Some(format!("{}:{}", location.file(), location.line()));
        self
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AssertionFailure {}

/// Outcome of one labeled check
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionOutcome {
    /// Whether the check passed
    pub passed: bool,
    /// Subject label
    pub subject: String,
    /// Relation evaluated, if any
    pub relation: Option<Relation>,
    /// Expected operand
    pub expected: Value,
    /// Observed value
    pub actual: Value,
    /// Failure message (empty when passed)
    pub message: String,
}

impl AssertionOutcome {
    /// Evaluate `actual <relation> expected` and label the result.
    ///
    /// # Errors
    ///
    /// Propagates comparison errors (malformed relation, invalid pattern).
    pub fn evaluate(
        subject: impl Into<String>,
        relation: Relation,
        actual: Value,
        expected: Value,
    ) -> BotResult<Self> {
        let subject = subject.into();
        let passed = compare::evaluate(relation, &actual, &expected)?;
        let message = if passed {
            String::new()
        } else {
            render_failure(&subject, relation, &actual, &expected)
        };
        Ok(Self {
            passed,
            subject,
            relation: Some(relation),
            expected,
            actual,
            message,
        })
    }

    /// Create a passing outcome
    #[must_use]
    pub fn pass(subject: impl Into<String>, actual: Value) -> Self {
        Self {
            passed: true,
            subject: subject.into(),
            relation: None,
            expected: Value::Absent,
            actual,
            message: String::new(),
        }
    }

    /// Create a failing outcome with a custom message
    #[must_use]
    pub fn fail(subject: impl Into<String>, actual: Value, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            subject: subject.into(),
            relation: None,
            expected: Value::Absent,
            actual,
            message: message.into(),
        }
    }

    /// Pass or fail depending on `condition`
    #[must_use]
    pub fn from_condition(
        condition: bool,
        subject: impl Into<String>,
        actual: Value,
        message: impl Into<String>,
    ) -> Self {
        if condition {
            Self::pass(subject, actual)
        } else {
            Self::fail(subject, actual, message)
        }
    }

    /// Convert a failed outcome into an [`AssertionFailure`]
    #[must_use]
    pub fn into_failure(self) -> Option<AssertionFailure> {
        if self.passed {
            return None;
        }
        Some(AssertionFailure {
            subject: self.subject,
            relation: self.relation,
            expected: self.expected,
            actual: self.actual,
            message: self.message,
            location: None,
        })
    }

    /// Forward a failure to `reporter`; passing outcomes are `Ok(())`
    ///
    /// # Errors
    ///
    /// Whatever the reporter raises.
    #[track_caller]
    pub fn report_to<R: FailureReporter + ?Sized>(self, reporter: &R) -> BotResult<()> {
        let location = Location::caller();
        match self.into_failure() {
            None => Ok(()),
            Some(failure) => {
                let failure = failure.at(location);
                tracing::debug!(subject = %failure.subject, "{}", failure.message);
                reporter.report(failure)
            }
        }
    }

    /// Fail with [`BotError::AssertionFailed`] when the check did not pass
    ///
    /// # Errors
    ///
    /// [`BotError::AssertionFailed`] carrying the labeled failure.
    #[track_caller]
    pub fn into_result(self) -> BotResult<()> {
        self.report_to(&ErrorReporter)
    }
}

/// Render the message for a failed relational check
#[must_use]
pub fn render_failure(
    subject: &str,
    relation: Relation,
    actual: &Value,
    expected: &Value,
) -> String {
    let not = if relation.is_negated() { "not " } else { "" };
    let expected = display_operand(expected);
    if actual.is_absent() {
        format!(
            "{subject}: no such value, expected it {not}to {} {expected}!",
            relation.phrase()
        )
    } else {
        format!(
            "{subject}: expected {actual} {not}to {} {expected}!",
            relation.phrase()
        )
    }
}

fn display_operand(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("\"{}\"", s.trim()),
        other => other.to_string(),
    }
}

/// Sink for assertion failures.
///
/// Host test frameworks decide how a failure is raised; the engine only
/// needs "raise with message".
pub trait FailureReporter {
    /// Raise or record `failure`
    ///
    /// # Errors
    ///
    /// Implementations that raise by returning an error do so here.
    fn report(&self, failure: AssertionFailure) -> BotResult<()>;
}

/// Raises failures as [`BotError::AssertionFailed`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter;

impl FailureReporter for ErrorReporter {
    fn report(&self, failure: AssertionFailure) -> BotResult<()> {
        Err(BotError::AssertionFailed(failure))
    }
}

/// Raises failures by panicking, the way `assert!` does inside `#[test]`
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn report(&self, failure: AssertionFailure) -> BotResult<()> {
        panic!("{failure}");
    }
}
