//! Webbot: typed assertions and condition polling for browser automation
//!
//! Webbot turns "the page should say X" into two primitives:
//!
//! 1. a **comparison engine** over three-state values (absent, string,
//!    number) with fourteen named relations, and
//! 2. a **wait engine** that re-observes a condition until it holds, a
//!    deadline passes, or the wait is cancelled.
//!
//! Every query (`holds`) and assertion (`verify`) is one cell of the
//! property × relation matrix built on top of those two.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    WEBBOT Architecture                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Observe    │    │ Check      │    │ Assertion  │            │
//! │   │ (browser   │───►│ property × │───►│ outcome /  │            │
//! │   │  adapter)  │    │ relation   │    │ reporter   │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           │                                      │
//! │              ┌────────────┴────────────┐                         │
//! │              ▼                         ▼                         │
//! │        ┌────────────┐            ┌────────────┐                  │
//! │        │ Compare    │            │ Waiter     │                  │
//! │        │ (Value,    │            │ (Clock,    │                  │
//! │        │  Relation) │            │  Cancel)   │                  │
//! │        └────────────┘            └────────────┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use webbot::prelude::*;
//!
//! let counter = ElementSnapshot::new("span").with_text("  42.0  ");
//! assert!(check(Property::Text).number().greater_than(40.0).holds(&counter)?);
//! assert!(check(Property::name()).not_contains("foo").holds(&counter)?);
//! # Ok::<(), BotError>(())
//! ```

#![warn(missing_docs)]

mod assertion;
mod cancel;
pub mod check;
mod clock;
pub mod compare;
mod config;
pub mod logging;
mod observe;
mod relation;
mod result;
mod value;
mod wait;

pub use assertion::{
    render_failure, AssertionFailure, AssertionOutcome, ErrorReporter, FailureReporter,
    PanicReporter,
};
pub use cancel::CancellationToken;
pub use check::{check, Check, NumberCheckBuilder, OptionKey, OptionState, TextCheckBuilder};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BotConfig, DEFAULT_LOG_FILTER, ENV_LOG, ENV_POLL_INTERVAL_MS, ENV_TIMEOUT_MS};
pub use logging::{init_tracing, LogFormat};
pub use observe::{ElementSnapshot, Flag, Observe, OptionSnapshot, Property};
pub use relation::{Relation, RelationFamily, UnknownRelation, ValueKind};
pub use result::{BotError, BotResult};
pub use value::{format_number, parse_number, Value};
pub use wait::{
    wait_until, FnCondition, WaitCondition, WaitOptions, Waited, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, MIN_POLL_INTERVAL,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::cancel::*;
    pub use super::check::*;
    pub use super::clock::*;
    pub use super::config::*;
    pub use super::observe::*;
    pub use super::relation::*;
    pub use super::result::*;
    pub use super::value::*;
    pub use super::wait::*;
}
