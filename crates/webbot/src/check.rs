//! Property × relation checks.
//!
//! Instead of one hand-written query/assert pair per (property, relation)
//! combination, a [`Check`] names a property, a value kind and a relation,
//! and provides the query ([`Check::holds`]) and the assertion
//! ([`Check::verify`]) once for every cell of the matrix:
//!
//! ```ignore
//! check(Property::Url).contains("/users").verify(&page)?;
//! check(Property::Text).number().greater_than(40.0).verify(&counter)?;
//! check(Property::href()).not_ends_with(".pdf").holds(&link)?;
//! ```
//!
//! Presence, numeric-ness, class-token, collection-size and element-flag
//! checks live here as free functions.

use crate::assertion::{AssertionOutcome, ErrorReporter, FailureReporter};
use crate::clock::Clock;
use crate::compare;
use crate::observe::{Flag, Observe, OptionSnapshot, Property};
use crate::relation::{Relation, ValueKind};
use crate::result::{BotError, BotResult};
use crate::value::Value;
use crate::wait::Waiter;
use serde::Serialize;
use std::fmt;

/// Start a check on `property`
#[must_use]
pub fn check(property: Property) -> TextCheckBuilder {
    TextCheckBuilder { property }
}

/// One cell of the property × relation matrix, with its expected operand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    property: Property,
    kind: ValueKind,
    relation: Relation,
    expected: Value,
}

impl Check {
    /// Build a check from its parts.
    ///
    /// # Errors
    ///
    /// [`BotError::MalformedRelation`] if `relation` is not defined for
    /// `kind`, or `expected` is of another kind.
    pub fn from_parts(
        property: Property,
        kind: ValueKind,
        relation: Relation,
        expected: Value,
    ) -> BotResult<Self> {
        if !relation.supports(kind) {
            return Err(BotError::MalformedRelation { relation, kind });
        }
        if let Some(expected_kind) = expected.kind() {
            if expected_kind != kind {
                return Err(BotError::MalformedRelation {
                    relation,
                    kind: expected_kind,
                });
            }
        }
        Ok(Self {
            property,
            kind,
            relation,
            expected,
        })
    }

    /// Property observed
    #[must_use]
    pub const fn property(&self) -> &Property {
        &self.property
    }

    /// Value kind compared
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Relation evaluated
    #[must_use]
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// Expected operand
    #[must_use]
    pub const fn expected(&self) -> &Value {
        &self.expected
    }

    /// Subject label for messages
    #[must_use]
    pub fn label(&self) -> &str {
        self.property.label()
    }

    /// Read the current value of the property, converted to this check's kind
    ///
    /// # Errors
    ///
    /// Observation errors from `source`.
    pub fn observe<S: Observe + ?Sized>(&self, source: &S) -> BotResult<Value> {
        let observed = source.value_of(&self.property)?;
        Ok(match self.kind {
            ValueKind::Text => observed,
            ValueKind::Number => observed.to_number(),
        })
    }

    /// Query: does the check hold right now?
    ///
    /// # Errors
    ///
    /// Observation errors, or [`BotError::InvalidPattern`] for a bad regex.
    pub fn holds<S: Observe + ?Sized>(&self, source: &S) -> BotResult<bool> {
        let actual = self.observe(source)?;
        compare::evaluate(self.relation, &actual, &self.expected)
    }

    /// Labeled outcome of the check right now
    ///
    /// # Errors
    ///
    /// As [`Check::holds`].
    pub fn outcome<S: Observe + ?Sized>(&self, source: &S) -> BotResult<AssertionOutcome> {
        let actual = self.observe(source)?;
        AssertionOutcome::evaluate(self.label(), self.relation, actual, self.expected.clone())
    }

    /// Assertion: fail with [`BotError::AssertionFailed`] unless the check holds
    ///
    /// # Errors
    ///
    /// Observation errors are returned as-is; a negative answer becomes
    /// [`BotError::AssertionFailed`].
    #[track_caller]
    pub fn verify<S: Observe + ?Sized>(&self, source: &S) -> BotResult<()> {
        self.verify_with(source, &ErrorReporter)
    }

    /// Assertion that forwards failures to `reporter`
    ///
    /// # Errors
    ///
    /// Observation errors, or whatever `reporter` raises.
    #[track_caller]
    pub fn verify_with<S, R>(&self, source: &S, reporter: &R) -> BotResult<()>
    where
        S: Observe + ?Sized,
        R: FailureReporter + ?Sized,
    {
        self.outcome(source)?.report_to(reporter)
    }

    /// Query that waits: `true` as soon as the check holds, `false` on timeout
    ///
    /// # Errors
    ///
    /// Interruption and non-transient errors.
    pub fn holds_within<S, C>(&self, source: &S, waiter: &Waiter<C>) -> BotResult<bool>
    where
        S: Observe + ?Sized,
        C: Clock,
    {
        match self.wait(source, waiter) {
            Ok(()) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Assertion that waits for the check to hold
    ///
    /// # Errors
    ///
    /// [`BotError::Timeout`] with the last observed value,
    /// [`BotError::Interrupted`], or a non-transient observation error.
    pub fn verify_within<S, C>(&self, source: &S, waiter: &Waiter<C>) -> BotResult<()>
    where
        S: Observe + ?Sized,
        C: Clock,
    {
        self.wait(source, waiter)
    }

    fn wait<S, C>(&self, source: &S, waiter: &Waiter<C>) -> BotResult<()>
    where
        S: Observe + ?Sized,
        C: Clock,
    {
        let waited_for = self.to_string();
        waiter.until(
            &waited_for,
            || {
                let actual = self.observe(source)?;
                let passed = compare::evaluate(self.relation, &actual, &self.expected)?;
                Ok(Observation { actual, passed })
            },
            |observation| observation.passed,
        )?;
        Ok(())
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.relation.is_negated() { "not " } else { "" };
        write!(
            f,
            "{} {not}to {} {}",
            self.label(),
            self.relation.phrase(),
            self.expected
        )
    }
}

/// One polled observation; renders as the observed value in timeout reports
struct Observation {
    actual: Value,
    passed: bool,
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.actual)
    }
}

/// Builder for string-kind checks
#[derive(Debug, Clone)]
pub struct TextCheckBuilder {
    property: Property,
}

impl TextCheckBuilder {
    fn build(self, relation: Relation, expected: &str) -> Check {
        Check {
            property: self.property,
            kind: ValueKind::Text,
            relation,
            expected: Value::text(expected),
        }
    }

    /// Compare the property numerically instead
    #[must_use]
    pub fn number(self) -> NumberCheckBuilder {
        NumberCheckBuilder {
            property: self.property,
        }
    }

    /// `equals`
    #[must_use]
    pub fn equals(self, expected: &str) -> Check {
        self.build(Relation::Equals, expected)
    }

    /// `notEquals`
    #[must_use]
    pub fn not_equals(self, expected: &str) -> Check {
        self.build(Relation::NotEquals, expected)
    }

    /// `contains`
    #[must_use]
    pub fn contains(self, search_text: &str) -> Check {
        self.build(Relation::Contains, search_text)
    }

    /// `notContains`
    #[must_use]
    pub fn not_contains(self, search_text: &str) -> Check {
        self.build(Relation::NotContains, search_text)
    }

    /// `startsWith`
    #[must_use]
    pub fn starts_with(self, prefix: &str) -> Check {
        self.build(Relation::StartsWith, prefix)
    }

    /// `notStartsWith`
    #[must_use]
    pub fn not_starts_with(self, prefix: &str) -> Check {
        self.build(Relation::NotStartsWith, prefix)
    }

    /// `endsWith`
    #[must_use]
    pub fn ends_with(self, suffix: &str) -> Check {
        self.build(Relation::EndsWith, suffix)
    }

    /// `notEndsWith`
    #[must_use]
    pub fn not_ends_with(self, suffix: &str) -> Check {
        self.build(Relation::NotEndsWith, suffix)
    }

    /// `matches` (whole value)
    #[must_use]
    pub fn matches(self, pattern: &str) -> Check {
        self.build(Relation::Matches, pattern)
    }

    /// `notMatches`
    #[must_use]
    pub fn not_matches(self, pattern: &str) -> Check {
        self.build(Relation::NotMatches, pattern)
    }
}

/// Builder for numeric-kind checks
#[derive(Debug, Clone)]
pub struct NumberCheckBuilder {
    property: Property,
}

impl NumberCheckBuilder {
    fn build(self, relation: Relation, expected: f64) -> Check {
        Check {
            property: self.property,
            kind: ValueKind::Number,
            relation,
            expected: Value::Number(expected),
        }
    }

    /// `equals`
    #[must_use]
    pub fn equals(self, expected: f64) -> Check {
        self.build(Relation::Equals, expected)
    }

    /// `notEquals`
    #[must_use]
    pub fn not_equals(self, expected: f64) -> Check {
        self.build(Relation::NotEquals, expected)
    }

    /// `lessThan`
    #[must_use]
    pub fn less_than(self, expected: f64) -> Check {
        self.build(Relation::LessThan, expected)
    }

    /// `lessThanOrEquals`
    #[must_use]
    pub fn less_than_or_equals(self, expected: f64) -> Check {
        self.build(Relation::LessThanOrEquals, expected)
    }

    /// `greaterThan`
    #[must_use]
    pub fn greater_than(self, expected: f64) -> Check {
        self.build(Relation::GreaterThan, expected)
    }

    /// `greaterThanOrEquals`
    #[must_use]
    pub fn greater_than_or_equals(self, expected: f64) -> Check {
        self.build(Relation::GreaterThanOrEquals, expected)
    }
}

// =============================================================================
// MATRIX
// =============================================================================

/// Properties every generated surface exposes
#[must_use]
pub fn standard_properties() -> Vec<Property> {
    vec![
        Property::Url,
        Property::Title,
        Property::Text,
        Property::TagName,
        Property::id(),
        Property::name(),
        Property::value(),
        Property::href(),
        Property::class(),
    ]
}

/// Every valid (kind, relation) pair
pub fn matrix() -> impl Iterator<Item = (ValueKind, Relation)> {
    ValueKind::ALL
        .into_iter()
        .flat_map(|kind| kind.relations().iter().map(move |r| (kind, *r)))
}

/// Every (property, kind, relation) cell of the standard surface
pub fn surface() -> impl Iterator<Item = (Property, ValueKind, Relation)> {
    standard_properties()
        .into_iter()
        .flat_map(|p| matrix().map(move |(kind, r)| (p.clone(), kind, r)))
}

// =============================================================================
// PRESENCE
// =============================================================================

fn present(property: &Property, observed: &Value) -> bool {
    match property {
        Property::Text => observed.as_text().is_some_and(|t| !t.is_empty()),
        _ => observed.is_present(),
    }
}

/// Whether `property` has a value; text counts only when non-empty
///
/// # Errors
///
/// Observation errors from `source`.
pub fn has<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<bool> {
    Ok(present(property, &source.value_of(property)?))
}

/// Negation of [`has`]
///
/// # Errors
///
/// Observation errors from `source`.
pub fn has_not<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<bool> {
    has(source, property).map(|present| !present)
}

/// Assert [`has`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the value is missing.
#[track_caller]
pub fn assert_has<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<()> {
    let actual = source.value_of(property)?;
    let holds = present(property, &actual);
    let message = match property {
        Property::Text => format!("{} has no text!", source.describe()),
        other => format!("{} does not have the {other} attribute!", source.describe()),
    };
    AssertionOutcome::from_condition(holds, property.label(), actual, message).into_result()
}

/// Assert [`has_not`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the value is present.
#[track_caller]
pub fn assert_has_not<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<()> {
    let actual = source.value_of(property)?;
    let holds = !present(property, &actual);
    let message = match property {
        Property::Text => format!("{} has text {actual} when it shouldn't!", source.describe()),
        other => format!("{} has the {other} attribute when it shouldn't!", source.describe()),
    };
    AssertionOutcome::from_condition(holds, property.label(), actual, message).into_result()
}

// =============================================================================
// NUMBERS
// =============================================================================

/// Whether `property` currently reads as a number
///
/// # Errors
///
/// Observation errors from `source`.
pub fn is_number<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<bool> {
    Ok(source.value_of(property)?.to_number().is_number())
}

/// Negation of [`is_number`]
///
/// # Errors
///
/// Observation errors from `source`.
pub fn is_not_number<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<bool> {
    is_number(source, property).map(|n| !n)
}

/// Assert [`is_number`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the value is not numeric.
#[track_caller]
pub fn assert_is_number<S: Observe + ?Sized>(source: &S, property: &Property) -> BotResult<()> {
    let actual = source.value_of(property)?;
    let numeric = actual.to_number().is_number();
    let message = format!("{}: {actual} is no number!", property.label());
    AssertionOutcome::from_condition(numeric, property.label(), actual, message).into_result()
}

/// Assert [`is_not_number`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the value is numeric.
#[track_caller]
pub fn assert_is_not_number<S: Observe + ?Sized>(
    source: &S,
    property: &Property,
) -> BotResult<()> {
    let actual = source.value_of(property)?;
    let numeric = actual.to_number().is_number();
    let message = format!("{}: {actual} is a number when it shouldn't!", property.label());
    AssertionOutcome::from_condition(!numeric, property.label(), actual, message).into_result()
}

// =============================================================================
// CLASS TOKENS
// =============================================================================

fn tokens(classes: &Value) -> impl Iterator<Item = &str> {
    classes.as_text().unwrap_or_default().split_whitespace()
}

/// Whitespace-separated tokens of the `class` attribute; empty when absent
///
/// # Errors
///
/// Observation errors from `source`.
pub fn class_tokens<S: Observe + ?Sized>(source: &S) -> BotResult<Vec<String>> {
    let classes = source.value_of(&Property::class())?;
    Ok(tokens(&classes).map(str::to_string).collect())
}

/// Apply a class relation to an already observed `class` value
fn class_holds(classes: &Value, relation: Relation, operand: &str) -> BotResult<bool> {
    if !relation.supports(ValueKind::Text) {
        return Err(BotError::MalformedRelation {
            relation,
            kind: ValueKind::Text,
        });
    }
    let expected = Value::text(operand);
    let mut any = false;
    for token in tokens(classes) {
        if compare::evaluate(relation.positive(), &Value::text(token), &expected)? {
            any = true;
            break;
        }
    }
    Ok(if relation.is_negated() { !any } else { any })
}

/// Whether any class token satisfies `relation` against `operand`.
///
/// `not*` relations negate the whole answer: `NotContains` holds when no
/// token contains `operand`.
///
/// # Errors
///
/// [`BotError::MalformedRelation`] for ordering relations,
/// [`BotError::InvalidPattern`] for bad regexes, and observation errors.
pub fn has_class<S: Observe + ?Sized>(
    source: &S,
    relation: Relation,
    operand: &str,
) -> BotResult<bool> {
    class_holds(&source.value_of(&Property::class())?, relation, operand)
}

fn class_phrase(relation: Relation) -> &'static str {
    match relation.positive() {
        Relation::Contains => "class containing",
        Relation::StartsWith => "class starting with",
        Relation::EndsWith => "class ending with",
        Relation::Matches => "class matching",
        _ => "class",
    }
}

/// Assert [`has_class`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when no token (or, for `not*`, some token)
/// satisfies the relation.
#[track_caller]
pub fn assert_has_class<S: Observe + ?Sized>(
    source: &S,
    relation: Relation,
    operand: &str,
) -> BotResult<()> {
    let actual = source.value_of(&Property::class())?;
    let holds = class_holds(&actual, relation, operand)?;
    let phrase = class_phrase(relation);
    let operand = operand.trim();
    let message = if relation.is_negated() {
        format!("{} has {phrase} \"{operand}\" when it shouldn't!", source.describe())
    } else {
        format!("{} does not have {phrase} \"{operand}\"!", source.describe())
    };
    AssertionOutcome::from_condition(holds, "class", actual, message).into_result()
}

// =============================================================================
// OPTIONS
// =============================================================================

/// How an option of a select element is picked out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKey {
    /// Options whose visible text equals this
    Text(String),
    /// Options whose `value` attribute equals this
    Value(String),
    /// The option at this position
    Index(usize),
}

impl OptionKey {
    /// By visible text
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// By `value` attribute
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    /// By position
    #[must_use]
    pub const fn index(index: usize) -> Self {
        Self::Index(index)
    }

    fn picks(&self, option: &OptionSnapshot) -> bool {
        match self {
            Self::Text(text) => option.text == *text,
            Self::Value(value) => option.value.as_deref() == Some(value.as_str()),
            Self::Index(index) => option.index == *index,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "\"{}\"", text.trim()),
            Self::Value(value) => write!(f, "with value \"{}\"", value.trim()),
            Self::Index(index) => write!(f, "with index \"{index}\""),
        }
    }
}

/// State an option can be asserted to be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    /// Not disabled
    Enabled,
    /// Disabled
    Disabled,
    /// Selected
    Selected,
    /// Not selected
    Deselected,
}

impl OptionState {
    const fn holds_for(self, option: &OptionSnapshot) -> bool {
        match self {
            Self::Enabled => option.enabled,
            Self::Disabled => !option.enabled,
            Self::Selected => option.selected,
            Self::Deselected => !option.selected,
        }
    }

    const fn opposite(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
            Self::Selected => Self::Deselected,
            Self::Deselected => Self::Selected,
        }
    }

    const fn adjective(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Selected => "selected",
            Self::Deselected => "deselected",
        }
    }
}

fn picked<'a>(
    options: &'a [OptionSnapshot],
    key: &'a OptionKey,
) -> impl Iterator<Item = &'a OptionSnapshot> {
    options.iter().filter(move |option| key.picks(option))
}

/// Whether the select has an option matching `key`
///
/// # Errors
///
/// Observation errors from `source`.
pub fn has_option<S: Observe + ?Sized>(source: &S, key: &OptionKey) -> BotResult<bool> {
    let options = source.options()?;
    let found = picked(&options, key).next().is_some();
    Ok(found)
}

/// Negation of [`has_option`]
///
/// # Errors
///
/// Observation errors from `source`.
pub fn has_not_option<S: Observe + ?Sized>(source: &S, key: &OptionKey) -> BotResult<bool> {
    has_option(source, key).map(|found| !found)
}

/// Whether some option matching `key` is in `state`; `false` without a match
///
/// # Errors
///
/// Observation errors from `source`.
pub fn option_is<S: Observe + ?Sized>(
    source: &S,
    key: &OptionKey,
    state: OptionState,
) -> BotResult<bool> {
    let options = source.options()?;
    let any = picked(&options, key).any(|option| state.holds_for(option));
    Ok(any)
}

/// Whether every option is selected (vacuously true for no options)
///
/// # Errors
///
/// Observation errors from `source`.
pub fn all_options_are_selected<S: Observe + ?Sized>(source: &S) -> BotResult<bool> {
    Ok(source.options()?.iter().all(|option| option.selected))
}

/// Whether no option is selected
///
/// # Errors
///
/// Observation errors from `source`.
pub fn no_option_is_selected<S: Observe + ?Sized>(source: &S) -> BotResult<bool> {
    Ok(!source.options()?.iter().any(|option| option.selected))
}

fn selected_texts(options: &[OptionSnapshot]) -> Value {
    let texts: Vec<&str> = options
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.text.as_str())
        .collect();
    if texts.is_empty() {
        Value::Absent
    } else {
        Value::text(texts.join(", "))
    }
}

/// Assert [`has_option`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when no option matches.
#[track_caller]
pub fn assert_has_option<S: Observe + ?Sized>(source: &S, key: &OptionKey) -> BotResult<()> {
    let found = has_option(source, key)?;
    let message = format!("{} has no option {key}!", source.describe());
    AssertionOutcome::from_condition(found, "option", Value::Absent, message).into_result()
}

/// Assert [`has_not_option`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when an option matches.
#[track_caller]
pub fn assert_has_not_option<S: Observe + ?Sized>(source: &S, key: &OptionKey) -> BotResult<()> {
    let found = has_option(source, key)?;
    let message = format!("{} has option {key} when it shouldn't!", source.describe());
    AssertionOutcome::from_condition(!found, "option", Value::Absent, message).into_result()
}

/// Assert that the option matching `key` exists and none of its matches is
/// in the opposite of `state`
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the option is missing or in the wrong
/// state.
#[track_caller]
pub fn assert_option_is<S: Observe + ?Sized>(
    source: &S,
    key: &OptionKey,
    state: OptionState,
) -> BotResult<()> {
    let options = source.options()?;
    if picked(&options, key).next().is_none() {
        let message = format!("{} has no option {key}!", source.describe());
        return AssertionOutcome::fail("option", Value::Absent, message).into_result();
    }
    let wrong = picked(&options, key).any(|option| state.opposite().holds_for(option));
    let message = format!("Option {key} is not {}!", state.adjective());
    AssertionOutcome::from_condition(!wrong, "option", Value::Absent, message).into_result()
}

/// Assert [`all_options_are_selected`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when some option is not selected.
#[track_caller]
pub fn assert_all_options_are_selected<S: Observe + ?Sized>(source: &S) -> BotResult<()> {
    let options = source.options()?;
    let all = options.iter().all(|option| option.selected);
    AssertionOutcome::from_condition(
        all,
        "options",
        selected_texts(&options),
        "All options are not selected!",
    )
    .into_result()
}

/// Assert [`no_option_is_selected`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when some option is selected.
#[track_caller]
pub fn assert_no_option_is_selected<S: Observe + ?Sized>(source: &S) -> BotResult<()> {
    let options = source.options()?;
    let none = !options.iter().any(|option| option.selected);
    AssertionOutcome::from_condition(
        none,
        "options",
        selected_texts(&options),
        "All options are not deselected!",
    )
    .into_result()
}

// =============================================================================
// SIZE
// =============================================================================

/// Compare a collection size numerically
///
/// # Errors
///
/// [`BotError::MalformedRelation`] for string relations.
pub fn size_holds(relation: Relation, actual: usize, expected: usize) -> BotResult<bool> {
    compare::evaluate(
        relation,
        &Value::Number(actual as f64),
        &Value::Number(expected as f64),
    )
}

/// Assert a collection size, labeled "Size"
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the relation does not hold.
#[track_caller]
pub fn assert_size(relation: Relation, actual: usize, expected: usize) -> BotResult<()> {
    AssertionOutcome::evaluate(
        "Size",
        relation,
        Value::Number(actual as f64),
        Value::Number(expected as f64),
    )?
    .into_result()
}

// =============================================================================
// FLAGS
// =============================================================================

/// Whether `flag` is set.
///
/// A missing element is simply not displayed; for other flags a missing
/// element is an error.
///
/// # Errors
///
/// Observation errors other than a missing element being displayed.
pub fn is<S: Observe + ?Sized>(source: &S, flag: Flag) -> BotResult<bool> {
    match source.flag(flag) {
        Err(err) if flag == Flag::Displayed && err.is_transient() => Ok(false),
        other => other,
    }
}

/// Negation of [`is`]
///
/// # Errors
///
/// As [`is`].
pub fn is_not<S: Observe + ?Sized>(source: &S, flag: Flag) -> BotResult<bool> {
    is(source, flag).map(|set| !set)
}

/// Assert [`is`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the flag is not set.
#[track_caller]
pub fn assert_is<S: Observe + ?Sized>(source: &S, flag: Flag) -> BotResult<()> {
    let set = is(source, flag)?;
    let message = format!("{} is not {}!", source.describe(), flag.adjective());
    AssertionOutcome::from_condition(set, flag.adjective(), Value::Absent, message).into_result()
}

/// Assert [`is_not`]
///
/// # Errors
///
/// [`BotError::AssertionFailed`] when the flag is set.
#[track_caller]
pub fn assert_is_not<S: Observe + ?Sized>(source: &S, flag: Flag) -> BotResult<()> {
    let set = is(source, flag)?;
    let message = format!(
        "{} is {} when it shouldn't!",
        source.describe(),
        flag.adjective()
    );
    AssertionOutcome::from_condition(!set, flag.adjective(), Value::Absent, message).into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::observe::ElementSnapshot;
    use crate::wait::WaitOptions;
    use std::cell::Cell;
    use std::sync::Arc;

    fn link() -> ElementSnapshot {
        ElementSnapshot::new("a")
            .with_text("Download report")
            .with_attribute("href", "https://example.com/files/report.pdf")
            .with_attribute("class", "btn btn-link download-primary")
            .with_attribute("id", "report")
            .with_url("https://example.com/files")
            .with_title("Files - Example")
    }

    fn counter(text: &str) -> ElementSnapshot {
        ElementSnapshot::new("span").with_text(text)
    }

    mod matrix_tests {
        use super::*;

        #[test]
        fn test_matrix_has_sixteen_cells() {
            assert_eq!(matrix().count(), 16);
            assert_eq!(matrix().filter(|(k, _)| *k == ValueKind::Text).count(), 10);
            assert!(matrix().all(|(k, r)| r.supports(k)));
        }

        #[test]
        fn test_surface_enumerates_every_property() {
            assert_eq!(surface().count(), standard_properties().len() * 16);
        }

        #[test]
        fn test_every_surface_cell_evaluates_on_a_snapshot() {
            let el = link();
            for (property, kind, relation) in surface() {
                let expected = match kind {
                    ValueKind::Text => Value::text("x"),
                    ValueKind::Number => Value::Number(1.0),
                };
                let check = Check::from_parts(property, kind, relation, expected).unwrap();
                assert!(check.holds(&el).is_ok(), "{check}");
            }
        }

        #[test]
        fn test_from_parts_rejects_invalid_cells() {
            let text = |relation, expected| {
                Check::from_parts(Property::Text, ValueKind::Text, relation, expected)
            };
            let number = |relation, expected| {
                Check::from_parts(Property::Text, ValueKind::Number, relation, expected)
            };
            assert!(text(Relation::LessThan, Value::text("1")).is_err());
            assert!(number(Relation::Contains, Value::Number(1.0)).is_err());
            assert!(number(Relation::Equals, Value::text("1")).is_err());
            assert!(text(Relation::Equals, Value::Absent).is_ok());
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_text_relations() {
            let el = link();
            assert!(check(Property::Url).starts_with("https://").holds(&el).unwrap());
            assert!(check(Property::Title).ends_with("Example").holds(&el).unwrap());
            assert!(check(Property::href()).matches(r".*\.pdf").holds(&el).unwrap());
            assert!(check(Property::Text).not_contains("Upload").holds(&el).unwrap());
            assert!(check(Property::TagName).equals("a").holds(&el).unwrap());
            assert!(!check(Property::id()).not_equals("report").holds(&el).unwrap());
        }

        #[test]
        fn test_absent_attribute_semantics() {
            let el = link();
            assert!(!check(Property::name()).contains("foo").holds(&el).unwrap());
            assert!(check(Property::name()).not_contains("foo").holds(&el).unwrap());
            assert!(!check(Property::value()).number().less_than(1.0).holds(&el).unwrap());
            let at_least_one = check(Property::value()).number().greater_than_or_equals(1.0);
            assert!(!at_least_one.holds(&el).unwrap());
        }

        #[test]
        fn test_numeric_text() {
            let above_forty = check(Property::Text).number().greater_than(40.0);
            assert!(above_forty.holds(&counter("  42.0  ")).unwrap());
            assert!(!above_forty.holds(&counter("abc")).unwrap());
            assert!(check(Property::Text).number().equals(42.0).holds(&counter("42")).unwrap());
        }

        #[test]
        fn test_verify_failure_is_labeled() {
            let err = check(Property::Url).contains("/users").verify(&link()).unwrap_err();
            let failure = err.assertion_failure().unwrap();
            assert_eq!(failure.subject, "Url");
            assert_eq!(failure.relation, Some(Relation::Contains));
            assert_eq!(failure.actual, Value::text("https://example.com/files"));
            assert_eq!(
                failure.message,
                "Url: expected \"https://example.com/files\" to contain \"/users\"!"
            );
        }

        #[test]
        fn test_verify_does_not_swallow_observation_errors() {
            let err = check(Property::Text)
                .equals("x")
                .verify(&ElementSnapshot::missing())
                .unwrap_err();
            assert!(err.is_transient());
        }

        #[test]
        fn test_invalid_regex_surfaces() {
            let err = check(Property::Text).matches("(").holds(&link()).unwrap_err();
            assert!(matches!(err, BotError::InvalidPattern { .. }));
        }

        #[test]
        fn test_display() {
            assert_eq!(
                check(Property::Text).not_contains("x").to_string(),
                "Text not to contain \"x\""
            );
            assert_eq!(
                check(Property::value()).number().less_than(3.0).to_string(),
                "value to be less than 3"
            );
        }
    }

    mod waiting_check_tests {
        use super::*;

        /// Element whose text changes on every observation
        struct Ticker {
            reads: Cell<u32>,
        }

        impl Observe for Ticker {
            fn observe(&self, property: &Property) -> BotResult<Option<String>> {
                match property {
                    Property::Text => {
                        self.reads.set(self.reads.get() + 1);
                        Ok(Some(self.reads.get().to_string()))
                    }
                    _ => Ok(None),
                }
            }

            fn flag(&self, _flag: Flag) -> BotResult<bool> {
                Ok(true)
            }
        }

        fn waiter() -> Waiter<Arc<FakeClock>> {
            Waiter::with_clock(
                WaitOptions::new().with_timeout(1000).with_poll_interval(100),
                FakeClock::shared(),
            )
        }

        #[test]
        fn test_holds_within_waits_for_value() {
            let ticker = Ticker { reads: Cell::new(0) };
            let check = check(Property::Text).number().greater_than_or_equals(3.0);
            assert!(check.holds_within(&ticker, &waiter()).unwrap());
            assert_eq!(ticker.reads.get(), 3);
        }

        #[test]
        fn test_verify_within_times_out_with_last_value() {
            let err = check(Property::Text)
                .equals("ready")
                .verify_within(&counter("loading"), &waiter())
                .unwrap_err();
            match err {
                BotError::Timeout {
                    waited_for,
                    last_observation,
                    ..
                } => {
                    assert_eq!(waited_for, "Text to equal \"ready\"");
                    assert_eq!(last_observation.as_deref(), Some("\"loading\""));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_holds_within_false_on_timeout() {
            assert!(!check(Property::Text)
                .contains("done")
                .holds_within(&counter("pending"), &waiter())
                .unwrap());
        }

        #[test]
        fn test_invalid_pattern_is_not_retried() {
            let ticker = Ticker { reads: Cell::new(0) };
            let err = check(Property::Text)
                .matches("[")
                .verify_within(&ticker, &waiter())
                .unwrap_err();
            assert!(matches!(err, BotError::InvalidPattern { .. }));
            assert_eq!(ticker.reads.get(), 1);
        }
    }

    mod presence_tests {
        use super::*;

        #[test]
        fn test_has_attribute() {
            let el = link();
            assert!(has(&el, &Property::href()).unwrap());
            assert!(has_not(&el, &Property::name()).unwrap());
        }

        #[test]
        fn test_has_text_requires_non_empty() {
            assert!(has(&counter("1"), &Property::Text).unwrap());
            assert!(!has(&counter(""), &Property::Text).unwrap());
        }

        #[test]
        fn test_assert_has_messages() {
            let tag = r#"<a id="report" class="btn btn-link download-primary">"#;
            let err = assert_has(&link(), &Property::name()).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                format!("{tag} does not have the name attribute!")
            );
            let err = assert_has_not(&counter("7"), &Property::Text).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<span> has text \"7\" when it shouldn't!"
            );
            assert!(assert_has(&link(), &Property::id()).is_ok());
        }
    }

    mod number_tests {
        use super::*;

        #[test]
        fn test_is_number() {
            assert!(is_number(&counter(" 3.5 "), &Property::Text).unwrap());
            assert!(is_not_number(&counter("n/a"), &Property::Text).unwrap());
            assert!(is_not_number(&link(), &Property::value()).unwrap());
        }

        #[test]
        fn test_assert_is_number_message() {
            let err = assert_is_number(&counter("n/a"), &Property::Text).unwrap_err();
            assert_eq!(err.assertion_failure().unwrap().message, "Text: \"n/a\" is no number!");
            assert!(assert_is_not_number(&counter("n/a"), &Property::Text).is_ok());
        }
    }

    mod class_tests {
        use super::*;

        #[test]
        fn test_class_tokens() {
            assert_eq!(class_tokens(&link()).unwrap(), vec!["btn", "btn-link", "download-primary"]);
            assert!(class_tokens(&counter("x")).unwrap().is_empty());
        }

        #[test]
        fn test_has_class_relations() {
            let el = link();
            assert!(has_class(&el, Relation::Equals, "btn").unwrap());
            assert!(!has_class(&el, Relation::Equals, "btn-").unwrap());
            assert!(has_class(&el, Relation::StartsWith, "download").unwrap());
            assert!(has_class(&el, Relation::EndsWith, "-link").unwrap());
            assert!(has_class(&el, Relation::Matches, r"btn-\w+").unwrap());
            assert!(has_class(&el, Relation::NotContains, "danger").unwrap());
            assert!(!has_class(&el, Relation::NotEquals, "btn").unwrap());
        }

        #[test]
        fn test_no_class_attribute() {
            let el = counter("x");
            assert!(!has_class(&el, Relation::Contains, "a").unwrap());
            assert!(has_class(&el, Relation::NotContains, "a").unwrap());
        }

        #[test]
        fn test_ordering_on_classes_is_malformed() {
            assert!(has_class(&link(), Relation::LessThan, "a").is_err());
        }

        #[test]
        fn test_assert_has_class_messages() {
            let el = ElementSnapshot::new("li").with_attribute("class", "item active");
            let err = assert_has_class(&el, Relation::Contains, " selected ").unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<li class=\"item active\"> does not have class containing \"selected\"!"
            );
            let err = assert_has_class(&el, Relation::NotEquals, "active").unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<li class=\"item active\"> has class \"active\" when it shouldn't!"
            );
        }
    }

    mod single_read_tests {
        use super::*;

        /// Element whose class attribute disappears after the first read
        struct Flicker {
            reads: Cell<u32>,
        }

        impl Observe for Flicker {
            fn observe(&self, property: &Property) -> BotResult<Option<String>> {
                self.reads.set(self.reads.get() + 1);
                Ok(match property {
                    Property::Attribute(name) if name == "class" && self.reads.get() == 1 => {
                        Some("btn active".to_string())
                    }
                    _ => None,
                })
            }

            fn flag(&self, _flag: Flag) -> BotResult<bool> {
                Ok(true)
            }
        }

        fn flicker() -> Flicker {
            Flicker {
                reads: Cell::new(0),
            }
        }

        #[test]
        fn test_class_failure_reports_the_judged_value() {
            let el = flicker();
            let err = assert_has_class(&el, Relation::Contains, "zzz").unwrap_err();
            assert_eq!(el.reads.get(), 1);
            assert_eq!(
                err.assertion_failure().unwrap().actual,
                Value::text("btn active")
            );
        }

        #[test]
        fn test_has_not_failure_reports_the_judged_value() {
            let el = flicker();
            let err = assert_has_not(&el, &Property::class()).unwrap_err();
            assert_eq!(el.reads.get(), 1);
            assert_eq!(
                err.assertion_failure().unwrap().actual,
                Value::text("btn active")
            );
        }

        #[test]
        fn test_has_failure_reports_the_judged_value() {
            let err = assert_has(&counter(""), &Property::Text).unwrap_err();
            assert_eq!(err.assertion_failure().unwrap().actual, Value::text(""));
        }
    }

    mod option_tests {
        use super::*;

        fn colors() -> ElementSnapshot {
            ElementSnapshot::new("select")
                .with_attribute("name", "color")
                .with_option("Red", "r")
                .with_option_snapshot(
                    OptionSnapshot::new(0, "Green")
                        .with_value("g")
                        .selected(true),
                )
                .with_option_snapshot(
                    OptionSnapshot::new(0, "Blue")
                        .with_value("b")
                        .enabled(false),
                )
        }

        #[test]
        fn test_has_option_by_text_value_and_index() {
            let select = colors();
            assert!(has_option(&select, &OptionKey::text("Red")).unwrap());
            assert!(has_option(&select, &OptionKey::value("b")).unwrap());
            assert!(has_option(&select, &OptionKey::index(2)).unwrap());
            assert!(has_not_option(&select, &OptionKey::text("red")).unwrap());
            assert!(has_not_option(&select, &OptionKey::index(3)).unwrap());
        }

        #[test]
        fn test_option_states() {
            let select = colors();
            assert!(option_is(&select, &OptionKey::text("Green"), OptionState::Selected).unwrap());
            assert!(option_is(&select, &OptionKey::text("Red"), OptionState::Deselected).unwrap());
            assert!(option_is(&select, &OptionKey::value("b"), OptionState::Disabled).unwrap());
            assert!(option_is(&select, &OptionKey::index(0), OptionState::Enabled).unwrap());
            assert!(!option_is(&select, &OptionKey::text("Pink"), OptionState::Enabled).unwrap());
        }

        #[test]
        fn test_all_and_none_selected() {
            let select = colors();
            assert!(!all_options_are_selected(&select).unwrap());
            assert!(!no_option_is_selected(&select).unwrap());
            let empty = ElementSnapshot::new("select");
            assert!(all_options_are_selected(&empty).unwrap());
            assert!(no_option_is_selected(&empty).unwrap());
        }

        #[test]
        fn test_non_select_has_no_options() {
            assert!(has_not_option(&link(), &OptionKey::index(0)).unwrap());
            assert!(has_option(&ElementSnapshot::missing(), &OptionKey::index(0))
                .unwrap_err()
                .is_transient());
        }

        #[test]
        fn test_assert_option_messages() {
            let select = colors();
            let err = assert_has_option(&select, &OptionKey::text(" Pink ")).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<select name=\"color\"> has no option \"Pink\"!"
            );
            let err = assert_has_not_option(&select, &OptionKey::value("g")).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<select name=\"color\"> has option with value \"g\" when it shouldn't!"
            );
            assert!(assert_has_option(&select, &OptionKey::index(1)).is_ok());
        }

        #[test]
        fn test_assert_option_is() {
            let select = colors();
            let green = OptionKey::text("Green");
            assert!(assert_option_is(&select, &green, OptionState::Selected).is_ok());
            let err = assert_option_is(&select, &OptionKey::index(2), OptionState::Enabled)
                .unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "Option with index \"2\" is not enabled!"
            );
            let err = assert_option_is(&select, &OptionKey::text("Pink"), OptionState::Selected)
                .unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<select name=\"color\"> has no option \"Pink\"!"
            );
        }

        #[test]
        fn test_assert_selection_summaries() {
            let select = colors();
            let err = assert_all_options_are_selected(&select).unwrap_err();
            let failure = err.assertion_failure().unwrap();
            assert_eq!(failure.message, "All options are not selected!");
            assert_eq!(failure.actual, Value::text("Green"));
            let err = assert_no_option_is_selected(&select).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "All options are not deselected!"
            );
            assert!(assert_no_option_is_selected(&ElementSnapshot::new("select")).is_ok());
        }
    }

    mod size_tests {
        use super::*;

        #[test]
        fn test_size_relations() {
            assert!(size_holds(Relation::Equals, 3, 3).unwrap());
            assert!(size_holds(Relation::GreaterThan, 4, 3).unwrap());
            assert!(size_holds(Relation::LessThanOrEquals, 0, 0).unwrap());
            assert!(size_holds(Relation::Contains, 1, 1).is_err());
        }

        #[test]
        fn test_assert_size_message() {
            let err = assert_size(Relation::GreaterThanOrEquals, 1, 2).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "Size: expected 1 to be greater than or equal to 2!"
            );
        }
    }

    mod flag_tests {
        use super::*;

        #[test]
        fn test_missing_element_is_not_displayed() {
            assert!(!is(&ElementSnapshot::missing(), Flag::Displayed).unwrap());
            assert!(is_not(&ElementSnapshot::missing(), Flag::Displayed).unwrap());
            assert!(is(&ElementSnapshot::missing(), Flag::Selected).is_err());
        }

        #[test]
        fn test_flag_assertions() {
            let checkbox = ElementSnapshot::new("input").selected(true).enabled(false);
            assert!(assert_is(&checkbox, Flag::Selected).is_ok());
            let err = assert_is(&checkbox, Flag::Enabled).unwrap_err();
            assert_eq!(err.assertion_failure().unwrap().message, "<input> is not enabled!");
            let err = assert_is_not(&checkbox, Flag::Selected).unwrap_err();
            assert_eq!(
                err.assertion_failure().unwrap().message,
                "<input> is selected when it shouldn't!"
            );
        }
    }
}
