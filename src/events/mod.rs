//! Event dispatch: the bus and the payloads it carries.
//!
//! This module groups the event **registry** and the event **data model**
//! used to decouple lifecycle stages from consumers.
//!
//! ## Contents
//! - [`EventBus`] string-keyed registry with ordered synchronous dispatch
//! - [`Payload`], [`EndReason`] typed event payloads
//! - [`topic`] well-known topic names published by the lifecycle
//!
//! ## Quick reference
//! - **Publisher**: the `Link` driver (connect/reconnect intents, open,
//!   decoded data, opt-in decode errors, terminal end).
//! - **Consumers**: application handlers registered via
//!   [`Link::subscribe`](crate::Link::subscribe).

mod bus;
mod payload;

pub use bus::{EventBus, Handler};
pub use payload::{topic, EndReason, Payload};
