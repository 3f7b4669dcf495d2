//! Wait engine.
//!
//! Turns a single-shot observation into a deadline-bounded, retried wait:
//!
//! ```text
//! Polling ──predicate holds──────────► Satisfied (returns the value)
//!    │ ▲
//!    │ └─ not yet / element not found, time left ─ sleep(poll interval)
//!    ├──deadline reached───────────────► TimedOut  (BotError::Timeout)
//!    └──cancellation token set─────────► Interrupted (BotError::Interrupted)
//! ```
//!
//! Cancellation is checked before every attempt and before every sleep,
//! never in the middle of an observation. Nothing is retained between
//! calls, and no threads are spawned: the caller's thread does the polling.
//!
//! ## Toyota Way Application
//!
//! - **Heijunka**: consistent poll intervals, clamped to the remaining time
//! - **Jidoka**: a timeout carries the elapsed time and the last observation

use crate::assertion::AssertionOutcome;
use crate::cancel::CancellationToken;
use crate::clock::{Clock, SystemClock};
use crate::observe::Observe;
use crate::value::Value;
use crate::result::{BotError, BotResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Poll intervals below this are raised to it
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds; zero means a single attempt
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Short timeout, fast polling
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            timeout_ms: 500,
            poll_interval_ms: 50,
        }
    }

    /// Long timeout, slow polling
    #[must_use]
    pub const fn slow() -> Self {
        Self {
            timeout_ms: 30_000,
            poll_interval_ms: 500,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration, never below [`MIN_POLL_INTERVAL`]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }
}

// =============================================================================
// WAIT CONDITION TRAIT
// =============================================================================

/// Trait for custom wait conditions
pub trait WaitCondition {
    /// Check if the condition is satisfied.
    ///
    /// # Errors
    ///
    /// Transient errors are retried; anything else aborts the wait.
    fn check(&self) -> BotResult<bool>;

    /// Get description for error messages
    fn description(&self) -> String;
}

/// A function-based wait condition
pub struct FnCondition<F: Fn() -> BotResult<bool>> {
    func: F,
    description: String,
}

impl<F: Fn() -> BotResult<bool>> Debug for FnCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: Fn() -> BotResult<bool>> FnCondition<F> {
    /// Create a new function condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: Fn() -> BotResult<bool>> WaitCondition for FnCondition<F> {
    fn check(&self) -> BotResult<bool> {
        (self.func)()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Successful wait: the satisfying observation and how long it took
#[derive(Debug, Clone, PartialEq)]
pub struct Waited<T> {
    /// The first observation that satisfied the predicate
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of observation attempts
    pub attempts: usize,
}

/// "5 seconds" for whole seconds, "250ms" otherwise
fn window(timeout_ms: u64) -> String {
    match timeout_ms {
        1000 => "1 second".to_string(),
        ms if ms > 0 && ms % 1000 == 0 => format!("{} seconds", ms / 1000),
        ms => format!("{ms}ms"),
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polls observations until a predicate holds, the deadline passes, or the
/// wait is cancelled
#[derive(Debug, Clone)]
pub struct Waiter<C: Clock = SystemClock> {
    options: WaitOptions,
    clock: C,
    cancel: Option<CancellationToken>,
}

impl Default for Waiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Waiter<SystemClock> {
    /// Waiter with default options on the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(WaitOptions::default())
    }

    /// Waiter with custom options on the system clock
    #[must_use]
    pub fn with_options(options: WaitOptions) -> Self {
        Self::with_clock(options, SystemClock::new())
    }
}

impl<C: Clock> Waiter<C> {
    /// Waiter on an explicit clock
    pub const fn with_clock(options: WaitOptions, clock: C) -> Self {
        Self {
            options,
            clock,
            cancel: None,
        }
    }

    /// Abandon waits when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replace the options, keeping clock and cancellation
    #[must_use]
    pub const fn with_wait_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// The clock this waiter polls on
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn interrupted(&self, waited_for: &str, start: Duration) -> BotError {
        let elapsed = self.clock.now().saturating_sub(start);
        tracing::debug!(waited_for, elapsed_ms = millis(elapsed), "wait interrupted");
        BotError::Interrupted {
            waited_for: waited_for.to_string(),
            elapsed_ms: millis(elapsed),
        }
    }

    /// Poll `observe` until `predicate` accepts a value.
    ///
    /// Returns the first satisfying value as soon as it is seen. A transient
    /// error ([`BotError::is_transient`]) counts as "not yet"; any other
    /// error aborts immediately. A zero timeout makes exactly one attempt
    /// and never sleeps.
    ///
    /// # Errors
    ///
    /// - [`BotError::Timeout`] once the deadline passes, with the last
    ///   observed value and the last transient error
    /// - [`BotError::Interrupted`] when the cancellation token is set
    /// - any non-transient error raised by `observe`
    pub fn until<T, O, P>(
        &self,
        waited_for: &str,
        mut observe: O,
        mut predicate: P,
    ) -> BotResult<Waited<T>>
    where
        T: Debug,
        O: FnMut() -> BotResult<T>,
        P: FnMut(&T) -> bool,
    {
        let start = self.clock.now();
        let timeout = self.options.timeout();
        let interval = self.options.poll_interval();
        let mut attempts = 0usize;
        let mut last_observation: Option<String> = None;
        let mut last_error: Option<BotError> = None;

        loop {
            if self.is_cancelled() {
                return Err(self.interrupted(waited_for, start));
            }

            attempts += 1;
            match observe() {
                Ok(value) => {
                    if predicate(&value) {
                        let elapsed = self.clock.now().saturating_sub(start);
                        tracing::debug!(
                            waited_for,
                            attempts,
                            elapsed_ms = millis(elapsed),
                            "wait satisfied"
                        );
                        return Ok(Waited {
                            value,
                            elapsed,
                            attempts,
                        });
                    }
                    tracing::trace!(waited_for, attempts, observed = ?value, "condition not met");
                    last_observation = Some(format!("{value:?}"));
                    last_error = None;
                }
                Err(err) if err.is_transient() => {
                    tracing::trace!(
                        waited_for,
                        attempts,
                        error = %err,
                        "transient observation failure"
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= timeout {
                tracing::debug!(
                    waited_for,
                    attempts,
                    elapsed_ms = millis(elapsed),
                    "wait timed out"
                );
                return Err(BotError::Timeout {
                    waited_for: waited_for.to_string(),
                    elapsed_ms: millis(elapsed),
                    timeout_ms: self.options.timeout_ms,
                    last_observation,
                    last_error: last_error.map(Box::new),
                });
            }

            if self.is_cancelled() {
                return Err(self.interrupted(waited_for, start));
            }
            self.clock.sleep(interval.min(timeout - elapsed));
        }
    }

    /// Wait for a custom condition
    ///
    /// # Errors
    ///
    /// As [`Waiter::until`].
    pub fn wait_for<W: WaitCondition + ?Sized>(&self, condition: &W) -> BotResult<Waited<bool>> {
        self.until(&condition.description(), || condition.check(), |ok| *ok)
    }

    /// Wait until `source` is displayed
    ///
    /// # Errors
    ///
    /// As [`Waiter::until`]; a missing element keeps the wait going.
    pub fn wait_for_displayed<S: Observe + ?Sized>(&self, source: &S) -> BotResult<Waited<bool>> {
        let waited_for = format!("{} to be displayed", source.describe());
        self.until(&waited_for, || source.is_visible(), |visible| *visible)
    }

    /// Wait until `source` is hidden or gone
    ///
    /// # Errors
    ///
    /// As [`Waiter::until`].
    pub fn wait_for_hidden<S: Observe + ?Sized>(&self, source: &S) -> BotResult<Waited<bool>> {
        let waited_for = format!("{} to be hidden", source.describe());
        self.until(
            &waited_for,
            || match source.is_visible() {
                Err(err) if err.is_transient() => Ok(false),
                other => other,
            },
            |visible| !*visible,
        )
    }

    /// Whether `source` becomes displayed before the deadline.
    ///
    /// A timeout answers `false`.
    ///
    /// # Errors
    ///
    /// Interruption and non-transient errors still propagate.
    pub fn is_displayed_within<S: Observe + ?Sized>(&self, source: &S) -> BotResult<bool> {
        match self.wait_for_displayed(source) {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Negation of [`Waiter::is_displayed_within`]
    ///
    /// # Errors
    ///
    /// As [`Waiter::is_displayed_within`].
    pub fn is_not_displayed_within<S: Observe + ?Sized>(&self, source: &S) -> BotResult<bool> {
        self.is_displayed_within(source).map(|displayed| !displayed)
    }

    /// Assert that `source` becomes displayed before the deadline
    ///
    /// # Errors
    ///
    /// [`BotError::AssertionFailed`] when the deadline passes first;
    /// interruption and non-transient errors propagate.
    #[track_caller]
    pub fn assert_displayed_within<S: Observe + ?Sized>(&self, source: &S) -> BotResult<()> {
        let displayed = self.is_displayed_within(source)?;
        let message = format!(
            "{} is not displayed within {}!",
            source.describe(),
            window(self.options.timeout_ms)
        );
        AssertionOutcome::from_condition(displayed, "displayed", Value::Absent, message)
            .into_result()
    }

    /// Assert that `source` stays undisplayed for the whole window
    ///
    /// # Errors
    ///
    /// [`BotError::AssertionFailed`] when it is displayed before the
    /// deadline; interruption and non-transient errors propagate.
    #[track_caller]
    pub fn assert_not_displayed_within<S: Observe + ?Sized>(&self, source: &S) -> BotResult<()> {
        let displayed = self.is_displayed_within(source)?;
        let message = format!(
            "{} is displayed within {} when it shouldn't!",
            source.describe(),
            window(self.options.timeout_ms)
        );
        AssertionOutcome::from_condition(!displayed, "displayed", Value::Absent, message)
            .into_result()
    }

    /// Sleep for `duration`, in poll-interval slices so cancellation is
    /// noticed promptly.
    ///
    /// # Errors
    ///
    /// [`BotError::Interrupted`] if cancelled before the pause completes.
    pub fn pause(&self, duration: Duration) -> BotResult<()> {
        let waited_for = format!("pause of {}ms", millis(duration));
        let start = self.clock.now();
        let interval = self.options.poll_interval();
        loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= duration {
                return Ok(());
            }
            if self.is_cancelled() {
                return Err(self.interrupted(&waited_for, start));
            }
            self.clock.sleep(interval.min(duration - elapsed));
        }
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a predicate with default polling on the system clock
///
/// # Errors
///
/// [`BotError::Timeout`] if `predicate` never returns true within `timeout_ms`.
pub fn wait_until<F>(mut predicate: F, timeout_ms: u64) -> BotResult<()>
where
    F: FnMut() -> bool,
{
    let waiter = Waiter::with_options(WaitOptions::new().with_timeout(timeout_ms));
    waiter.until("custom function", || Ok(predicate()), |ok| *ok)?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
