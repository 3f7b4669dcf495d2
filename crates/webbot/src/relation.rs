//! Relations: named comparison operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a comparable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// String values
    Text,
    /// Real numbers
    Number,
}

impl ValueKind {
    /// All kinds
    pub const ALL: [Self; 2] = [Self::Text, Self::Number];

    /// Relations defined for this kind
    #[must_use]
    pub const fn relations(self) -> &'static [Relation] {
        match self {
            Self::Text => &TEXT_RELATIONS,
            Self::Number => &NUMBER_RELATIONS,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// Relation family; decides how absent operands are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationFamily {
    /// `equals` / `notEquals`
    Equality,
    /// `contains`, `startsWith`, `endsWith`, `matches` and their negations
    Substring,
    /// `lessThan` .. `greaterThanOrEquals`
    Ordering,
}

/// Named comparison operator.
///
/// Relations read as `actual <relation> expected`: `GreaterThan` holds when
/// the observed value is greater than the expected operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Exact equality
    Equals,
    /// Negated equality
    NotEquals,
    /// Substring
    Contains,
    /// Negated substring
    NotContains,
    /// Prefix
    StartsWith,
    /// Negated prefix
    NotStartsWith,
    /// Suffix
    EndsWith,
    /// Negated suffix
    NotEndsWith,
    /// Whole-value regular expression match
    Matches,
    /// Negated regular expression match
    NotMatches,
    /// `actual < expected`
    LessThan,
    /// `actual <= expected`
    LessThanOrEquals,
    /// `actual > expected`
    GreaterThan,
    /// `actual >= expected`
    GreaterThanOrEquals,
}

const TEXT_RELATIONS: [Relation; 10] = [
    Relation::Equals,
    Relation::NotEquals,
    Relation::Contains,
    Relation::NotContains,
    Relation::StartsWith,
    Relation::NotStartsWith,
    Relation::EndsWith,
    Relation::NotEndsWith,
    Relation::Matches,
    Relation::NotMatches,
];

const NUMBER_RELATIONS: [Relation; 6] = [
    Relation::Equals,
    Relation::NotEquals,
    Relation::LessThan,
    Relation::LessThanOrEquals,
    Relation::GreaterThan,
    Relation::GreaterThanOrEquals,
];

impl Relation {
    /// Every relation
    pub const ALL: [Self; 14] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::NotStartsWith,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::Matches,
        Self::NotMatches,
        Self::LessThan,
        Self::LessThanOrEquals,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
    ];

    /// camelCase operator name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::NotStartsWith => "notStartsWith",
            Self::EndsWith => "endsWith",
            Self::NotEndsWith => "notEndsWith",
            Self::Matches => "matches",
            Self::NotMatches => "notMatches",
            Self::LessThan => "lessThan",
            Self::LessThanOrEquals => "lessThanOrEquals",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEquals => "greaterThanOrEquals",
        }
    }

    /// Family this relation belongs to
    #[must_use]
    pub const fn family(self) -> RelationFamily {
        match self {
            Self::Equals | Self::NotEquals => RelationFamily::Equality,
            Self::Contains
            | Self::NotContains
            | Self::StartsWith
            | Self::NotStartsWith
            | Self::EndsWith
            | Self::NotEndsWith
            | Self::Matches
            | Self::NotMatches => RelationFamily::Substring,
            Self::LessThan
            | Self::LessThanOrEquals
            | Self::GreaterThan
            | Self::GreaterThanOrEquals => RelationFamily::Ordering,
        }
    }

    /// Whether this is a `not*` relation
    #[must_use]
    pub const fn is_negated(self) -> bool {
        matches!(
            self,
            Self::NotEquals
                | Self::NotContains
                | Self::NotStartsWith
                | Self::NotEndsWith
                | Self::NotMatches
        )
    }

    /// The positive relation a `not*` relation negates; identity otherwise
    #[must_use]
    pub const fn positive(self) -> Self {
        match self {
            Self::NotEquals => Self::Equals,
            Self::NotContains => Self::Contains,
            Self::NotStartsWith => Self::StartsWith,
            Self::NotEndsWith => Self::EndsWith,
            Self::NotMatches => Self::Matches,
            other => other,
        }
    }

    /// Paired `not*` relation for equality/substring relations.
    ///
    /// Ordering relations have no negated counterpart: an absent operand
    /// satisfies neither `lessThan` nor its complement.
    #[must_use]
    pub const fn negated(self) -> Option<Self> {
        match self {
            Self::Equals => Some(Self::NotEquals),
            Self::NotEquals => Some(Self::Equals),
            Self::Contains => Some(Self::NotContains),
            Self::NotContains => Some(Self::Contains),
            Self::StartsWith => Some(Self::NotStartsWith),
            Self::NotStartsWith => Some(Self::StartsWith),
            Self::EndsWith => Some(Self::NotEndsWith),
            Self::NotEndsWith => Some(Self::EndsWith),
            Self::Matches => Some(Self::NotMatches),
            Self::NotMatches => Some(Self::Matches),
            _ => None,
        }
    }

    /// Ordering relation that holds exactly when this one fails, for present operands
    #[must_use]
    pub const fn complement(self) -> Option<Self> {
        match self {
            Self::LessThan => Some(Self::GreaterThanOrEquals),
            Self::LessThanOrEquals => Some(Self::GreaterThan),
            Self::GreaterThan => Some(Self::LessThanOrEquals),
            Self::GreaterThanOrEquals => Some(Self::LessThan),
            _ => None,
        }
    }

    /// Whether the relation is defined for operands of `kind`
    #[must_use]
    pub const fn supports(self, kind: ValueKind) -> bool {
        match self.family() {
            RelationFamily::Equality => true,
            RelationFamily::Substring => matches!(kind, ValueKind::Text),
            RelationFamily::Ordering => matches!(kind, ValueKind::Number),
        }
    }

    /// Verb phrase for failure messages: "contain", "be less than"
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self.positive() {
            Self::Equals => "equal",
            Self::Contains => "contain",
            Self::StartsWith => "start with",
            Self::EndsWith => "end with",
            Self::Matches => "match",
            Self::LessThan => "be less than",
            Self::LessThanOrEquals => "be less than or equal to",
            Self::GreaterThan => "be greater than",
            Self::GreaterThanOrEquals => "be greater than or equal to",
            // positive() never yields a negated relation
            _ => "satisfy",
        }
    }

    /// Third-person phrase: "contains", "is less than"
    #[must_use]
    pub const fn phrase_third_person(self) -> &'static str {
        match self.positive() {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Matches => "matches",
            Self::LessThan => "is less than",
            Self::LessThanOrEquals => "is less than or equal to",
            Self::GreaterThan => "is greater than",
            Self::GreaterThanOrEquals => "is greater than or equal to",
            _ => "satisfies",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unknown relation names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRelation(pub String);

impl fmt::Display for UnknownRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown relation: {}", self.0)
    }
}

impl std::error::Error for UnknownRelation {}

impl FromStr for Relation {
    type Err = UnknownRelation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRelation(s.to_string()))
    }
}
