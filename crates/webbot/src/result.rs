//! Result and error types for Webbot.

use crate::assertion::AssertionFailure;
use crate::relation::{Relation, ValueKind};
use thiserror::Error;

/// Result type for Webbot operations
pub type BotResult<T> = Result<T, BotError>;

/// Errors that can occur in Webbot
#[derive(Debug, Error)]
pub enum BotError {
    /// The target element could not be located at all.
    ///
    /// Transient: the wait engine retries on it while time remains.
    #[error("Element not found: {description}")]
    ElementNotFound {
        /// What was being looked up
        description: String,
    },

    /// A relation was applied to a value kind it is not defined for
    #[error("Relation {relation} is not defined for {kind} values")]
    MalformedRelation {
        /// Requested relation
        relation: Relation,
        /// Kind of the operands
        kind: ValueKind,
    },

    /// Regular expression failed to compile
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Wait deadline elapsed before the condition held
    #[error(
        "Timed out after {elapsed_ms}ms (timeout {timeout_ms}ms) waiting for {waited_for}; \
         last observation: {}; last error: {}",
        .last_observation.as_deref().unwrap_or("none"),
        .last_error.as_deref().map_or_else(|| "none".to_string(), ToString::to_string)
    )]
    Timeout {
        /// Description of what was waited for
        waited_for: String,
        /// Time actually spent waiting
        elapsed_ms: u64,
        /// Configured timeout
        timeout_ms: u64,
        /// Rendering of the last observed value, if any observation succeeded
        last_observation: Option<String>,
        /// Last transient error, if the final attempt failed
        #[source]
        last_error: Option<Box<BotError>>,
    },

    /// Wait was abandoned because the caller cancelled it
    #[error("Interrupted after {elapsed_ms}ms waiting for {waited_for}")]
    Interrupted {
        /// Description of what was waited for
        waited_for: String,
        /// Time spent before the interruption was noticed
        elapsed_ms: u64,
    },

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    AssertionFailed(AssertionFailure),

    /// Configuration could not be loaded or applied
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl BotError {
    /// Shorthand for [`BotError::ElementNotFound`]
    #[must_use]
    pub fn not_found(description: impl Into<String>) -> Self {
        Self::ElementNotFound {
            description: description.into(),
        }
    }

    /// Whether the wait engine may retry after this error
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this is a cancelled wait
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// The assertion failure carried by this error, if any
    #[must_use]
    pub const fn assertion_failure(&self) -> Option<&AssertionFailure> {
        match self {
            Self::AssertionFailed(failure) => Some(failure),
            _ => None,
        }
    }
}
