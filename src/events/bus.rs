//! # Event bus: string-keyed registry with ordered synchronous dispatch.
//!
//! [`EventBus`] maps event names to ordered lists of handlers and invokes
//! them on the publisher's stack, in subscription order.
//!
//! ## Rules
//! - **Insertion order**: handlers for one event fire in the order they were
//!   subscribed; the registry preserves that order and never reorders.
//! - **No deduplication**: subscribing the same closure twice invokes it
//!   twice.
//! - **No unsubscribe**: the registry only grows. A lifecycle that should go
//!   quiet goes terminal instead; its bus is dropped with it.
//! - **No panic isolation**: the bus does not catch handler panics.
//!   Propagation is the handler's responsibility; the bus stays minimal and
//!   predictable.
//!
//! Handlers receive `&mut S` — the owning lifecycle's session — so they can
//! react by sending, ending, or inspecting connection state.

use std::borrow::Cow;
use std::collections::HashMap;

/// Boxed event handler, invoked with the owning session and the payload.
pub type Handler<S, P> = Box<dyn FnMut(&mut S, &P) + Send>;

/// String-keyed publish/subscribe registry.
///
/// Generic over the handler context `S` (the session handed to every
/// handler) and the payload type `P`.
pub struct EventBus<S, P> {
    registry: HashMap<Cow<'static, str>, Vec<Handler<S, P>>>,
}

impl<S, P> EventBus<S, P> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
        }
    }

    /// Registers `handler` for `event`; returns the bus for chaining.
    ///
    /// Appends to the event's handler list; never fails, never dedups.
    pub fn subscribe<F>(&mut self, event: impl Into<Cow<'static, str>>, handler: F) -> &mut Self
    where
        F: FnMut(&mut S, &P) + Send + 'static,
    {
        self.registry
            .entry(event.into())
            .or_default()
            .push(Box::new(handler));
        self
    }

    /// Publishes `payload` to every handler registered for `event`.
    ///
    /// Returns `false` (no-op, no side effect) when no handler is
    /// registered. Otherwise invokes each handler synchronously, in
    /// subscription order, and returns `true`.
    pub fn publish(&mut self, state: &mut S, event: &str, payload: &P) -> bool {
        let Some(handlers) = self.registry.get_mut(event) else {
            return false;
        };
        for handler in handlers.iter_mut() {
            handler(state, payload);
        }
        true
    }

    /// True if at least one handler is registered for `event`.
    #[must_use]
    pub fn is_subscribed(&self, event: &str) -> bool {
        self.handler_count(event) > 0
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.registry.get(event).map_or(0, Vec::len)
    }
}

impl<S, P> Default for EventBus<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBus = EventBus<Vec<String>, String>;

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let mut bus = TestBus::new();
        let mut log = Vec::new();
        assert!(!bus.publish(&mut log, "data", &"x".to_string()));
        assert!(log.is_empty());
    }

    #[test]
    fn handlers_fire_in_subscription_order_with_same_payload() {
        let mut bus = TestBus::new();
        bus.subscribe("data", |log: &mut Vec<String>, p: &String| {
            log.push(format!("first:{p}"));
        })
        .subscribe("data", |log: &mut Vec<String>, p: &String| {
            log.push(format!("second:{p}"));
        })
        .subscribe("data", |log: &mut Vec<String>, p: &String| {
            log.push(format!("third:{p}"));
        });

        let mut log = Vec::new();
        assert!(bus.publish(&mut log, "data", &"payload".to_string()));
        assert_eq!(log, vec!["first:payload", "second:payload", "third:payload"]);
    }

    #[test]
    fn identical_subscriptions_are_not_deduplicated() {
        let mut bus = TestBus::new();
        fn bump(log: &mut Vec<String>, _p: &String) {
            log.push("bump".into());
        }
        bus.subscribe("tick", bump).subscribe("tick", bump);
        assert_eq!(bus.handler_count("tick"), 2);

        let mut log = Vec::new();
        bus.publish(&mut log, "tick", &String::new());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn events_are_dispatched_independently() {
        let mut bus = TestBus::new();
        bus.subscribe("a", |log: &mut Vec<String>, _p: &String| log.push("a".into()));
        bus.subscribe("b", |log: &mut Vec<String>, _p: &String| log.push("b".into()));

        let mut log = Vec::new();
        assert!(bus.publish(&mut log, "b", &String::new()));
        assert_eq!(log, vec!["b"]);
        assert!(bus.is_subscribed("a"));
        assert!(!bus.is_subscribed("c"));
    }
}
