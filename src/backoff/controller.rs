//! # Backoff controller: attempt accounting and delay computation.
//!
//! [`BackoffController`] owns the mutable retry state of one lifecycle:
//! the attempt counter, the retry budget, and the single in-flight guard.
//!
//! ## Contract
//! [`schedule`](BackoffController::schedule) is invoked once per observed
//! connection loss:
//! 1. the attempt counter increments (exactly once per invocation);
//! 2. over-budget or already-in-flight invocations fail immediately and
//!    synchronously with [`RetryError::Exhausted`] — no timer is armed, and
//!    the stored counter never exceeds the budget after a terminal failure;
//! 3. otherwise the guard is raised and the computed delay returned. The
//!    caller arms exactly one one-shot timer and calls
//!    [`complete`](BackoffController::complete) when it fires.
//!
//! At most one delay is ever pending per controller. The overlap check
//! exists because a second invocation while a timer is pending would corrupt
//! the attempt accounting; it signals a caller bug and fails fast.
//!
//! ## Delay curve
//! The first attempt waits exactly `min` (fast first retry, never
//! randomized). Attempt `n > 1` waits `round(uniform(0,1) × min × factor^n)`
//! capped at `max` when bounded; the `[0,1)` multiplier spreads simultaneous
//! clients recovering from a shared outage so they do not stampede the
//! server in lockstep.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use relink::{BackoffController, BackoffOptions};
//!
//! let mut backoff = BackoffController::new(BackoffOptions {
//!     min: Duration::from_millis(500),
//!     max: Some(Duration::from_secs(30)),
//!     retries: 25,
//!     factor: 2.0,
//! });
//!
//! // First attempt is never randomized.
//! assert_eq!(backoff.schedule().unwrap(), Duration::from_millis(500));
//!
//! // A second call while the first delay is pending fails fast.
//! assert!(backoff.schedule().is_err());
//! ```

use std::time::Duration;

use rand::Rng;

use crate::backoff::BackoffOptions;
use crate::error::RetryError;

/// Per-lifecycle retry state: attempt counter, budget, in-flight guard.
#[derive(Debug, Clone)]
pub struct BackoffController {
    opts: BackoffOptions,
    attempt: u32,
    in_flight: bool,
}

impl BackoffController {
    /// Creates a controller with zero attempts and no pending delay.
    #[must_use]
    pub fn new(opts: BackoffOptions) -> Self {
        Self {
            opts,
            attempt: 0,
            in_flight: false,
        }
    }

    /// The configured options.
    #[inline]
    pub fn options(&self) -> &BackoffOptions {
        &self.opts
    }

    /// Attempts consumed so far.
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// True while a scheduled delay has not yet completed.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.in_flight
    }

    /// Consumes one attempt and computes the delay before the next retry.
    ///
    /// Fails immediately (no timer, no queuing) when the budget is exhausted
    /// or a delay is already pending; both cases report
    /// [`RetryError::Exhausted`]. On success the in-flight guard is raised
    /// until [`complete`](Self::complete) is called.
    pub fn schedule(&mut self) -> Result<Duration, RetryError> {
        let next = self.attempt.saturating_add(1);
        if next > self.opts.retries || self.in_flight {
            // Clamp so the stored counter never exceeds the budget.
            self.attempt = next.min(self.opts.retries);
            return Err(RetryError::Exhausted {
                retries: self.opts.retries,
            });
        }

        self.attempt = next;
        self.in_flight = true;
        Ok(self.delay_for(next))
    }

    /// Clears the in-flight guard. Called when the armed timer fires.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    /// Returns the attempt counter to zero.
    ///
    /// Used by the configurable reset-on-open policy. Leaves the in-flight
    /// guard untouched: a pending delay stays pending.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Delay for the given attempt number (1-indexed).
    fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.opts.min;
        }

        let cap = self.opts.max.unwrap_or(Duration::MAX);
        let exp = attempt.min(i32::MAX as u32) as i32;
        let base_ms = self.opts.min.as_millis() as f64 * self.opts.factor.powi(exp);
        let drawn_ms = rand::rng().random::<f64>() * base_ms;
        if !drawn_ms.is_finite() {
            return cap;
        }

        let capped_ms = drawn_ms.round().min(cap.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }
}
