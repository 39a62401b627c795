//! Retry timing: options and the backoff controller.
//!
//! This module groups the knobs that control **how long** to wait between
//! reconnect attempts and **when** to stop trying.
//!
//! ## Contents
//! - [`BackoffOptions`] retry timing knobs (min / max / retries / factor)
//! - [`BackoffController`] attempt accounting, delay computation, budget
//!   enforcement, single in-flight guard
//!
//! ## Quick wiring
//! ```text
//! wire Closed ─► BackoffController::schedule()
//!                  ├─ Ok(delay)  ─► arm one-shot timer ─► complete() ─► reconnect
//!                  └─ Err        ─► terminal `end` (retry budget exhausted)
//! ```
//!
//! ## Defaults
//! - `min = 500ms`, `max = None` (unbounded), `retries = 25`, `factor = 2.0`.

mod controller;
mod options;

pub use controller::BackoffController;
pub use options::BackoffOptions;
