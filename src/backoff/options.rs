//! # Backoff options for reconnect timing.
//!
//! [`BackoffOptions`] controls how retry delays grow after repeated
//! connection losses. It is parameterized by:
//! - [`BackoffOptions::min`] the first (and smallest) delay;
//! - [`BackoffOptions::max`] the optional delay ceiling;
//! - [`BackoffOptions::retries`] the retry budget;
//! - [`BackoffOptions::factor`] the multiplicative growth factor.
//!
//! The first retry always waits exactly `min`; later attempts draw a random
//! delay below `min × factor^attempt`, capped at `max` when bounded. The
//! random multiplier decorrelates clients retrying after a shared outage.

use std::time::Duration;

/// Retry timing knobs for a [`BackoffController`](super::BackoffController).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffOptions {
    /// Delay of the first retry; also the base of later random delays.
    pub min: Duration,
    /// Ceiling for computed delays. `None` leaves them unbounded.
    pub max: Option<Duration>,
    /// Retry budget: after this many attempts, scheduling fails terminally.
    pub retries: u32,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
}

impl Default for BackoffOptions {
    /// Returns options with:
    /// - `min = 500ms` (fast first retry);
    /// - `max = None` (unbounded);
    /// - `retries = 25`;
    /// - `factor = 2.0`.
    fn default() -> Self {
        Self {
            min: Duration::from_millis(500),
            max: None,
            retries: 25,
            factor: 2.0,
        }
    }
}
