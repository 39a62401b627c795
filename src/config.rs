//! # Client configuration.
//!
//! [`Config`] centralizes the per-lifecycle settings handed to
//! [`Link::new`](crate::Link::new).
//!
//! ## Field semantics
//! - `backoff`: retry timing and budget (see [`BackoffOptions`]).
//! - `reset_on_open`: whether the attempt counter returns to zero once a
//!   (re)connect actually reaches `Open`. Off by default: a link that flaps
//!   open/closed keeps consuming its budget instead of retrying forever.

use crate::backoff::BackoffOptions;

/// Configuration for one [`Link`](crate::Link).
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Retry timing and budget.
    pub backoff: BackoffOptions,

    /// Reset the backoff attempt counter when the channel reaches `Open`.
    ///
    /// - `false` (default): attempts accumulate across the lifecycle.
    /// - `true`: every successful open restores the full retry budget.
    pub reset_on_open: bool,
}

impl Default for Config {
    /// Returns a configuration with:
    ///
    /// - `backoff = BackoffOptions::default()` (500ms first retry, factor 2,
    ///   25 retries, unbounded);
    /// - `reset_on_open = false`.
    fn default() -> Self {
        Self {
            backoff: BackoffOptions::default(),
            reset_on_open: false,
        }
    }
}
