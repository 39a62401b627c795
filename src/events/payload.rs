//! Event payloads and well-known topic names.
//!
//! The lifecycle publishes a small, fixed set of topics; [`Payload`] is the
//! tagged union carried by all of them. Consumers match on the variant they
//! care about and ignore the rest.
//!
//! | Topic         | Payload variant          | Meaning                           |
//! |---------------|--------------------------|-----------------------------------|
//! | [`topic::CONNECT`]   | [`Payload::Intent`]   | initial connect intent            |
//! | [`topic::RECONNECT`] | [`Payload::Intent`]   | retry intent after backoff        |
//! | [`topic::OPEN`]      | [`Payload::Opened`]   | channel reached `Open`            |
//! | [`topic::DATA`]      | [`Payload::Message`]  | decoded application message       |
//! | [`topic::ERROR`]     | [`Payload::BadFrame`] | inbound unit the codec rejected   |
//! | [`topic::END`]       | [`Payload::End`]      | terminal close (exactly once)     |

use std::sync::Arc;

/// Well-known topic names published by the lifecycle.
pub mod topic {
    /// Initial connect intent, carrying the resolved address.
    pub const CONNECT: &str = "connect";
    /// Reconnect intent after a completed backoff delay.
    pub const RECONNECT: &str = "reconnect";
    /// The channel is open; data may flow.
    pub const OPEN: &str = "open";
    /// One decoded application message.
    pub const DATA: &str = "data";
    /// Opt-in decode failures. Published only when subscribed.
    pub const ERROR: &str = "error";
    /// Terminal close; published exactly once per lifecycle.
    pub const END: &str = "end";
}

/// Why a lifecycle reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The retry budget ran dry; no further automatic reconnects.
    Exhausted {
        /// The configured retry ceiling that was hit.
        retries: u32,
    },
    /// `end()` was called; the close was requested locally.
    Closed,
}

impl EndReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EndReason::Exhausted { .. } => "retry_exhausted",
            EndReason::Closed => "closed",
        }
    }
}

/// Payload carried by every published event.
#[derive(Debug, Clone)]
pub enum Payload<M> {
    /// Connect or reconnect intent. `attempt` is 0 for the initial connect
    /// and the backoff attempt count for reconnects.
    Intent {
        /// Resolved address in `scheme://host/path[?query]` form.
        uri: Arc<str>,
        /// Backoff attempts consumed when this intent fired.
        attempt: u32,
    },
    /// The channel reached `Open`.
    Opened,
    /// One decoded application message.
    Message(M),
    /// An inbound unit the codec rejected; the frame is dropped.
    BadFrame {
        /// Codec diagnostic.
        reason: Arc<str>,
    },
    /// Terminal close.
    End(EndReason),
}

impl<M> Payload<M> {
    /// The decoded message, if this is a [`Payload::Message`].
    pub fn message(&self) -> Option<&M> {
        match self {
            Payload::Message(m) => Some(m),
            _ => None,
        }
    }

    /// The terminal reason, if this is a [`Payload::End`].
    pub fn end_reason(&self) -> Option<&EndReason> {
        match self {
            Payload::End(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        let p: Payload<u32> = Payload::Message(7);
        assert_eq!(p.message(), Some(&7));
        assert!(p.end_reason().is_none());

        let p: Payload<u32> = Payload::End(EndReason::Closed);
        assert_eq!(p.end_reason(), Some(&EndReason::Closed));
        assert!(p.message().is_none());
    }

    #[test]
    fn end_reason_labels() {
        assert_eq!(EndReason::Closed.as_label(), "closed");
        assert_eq!(
            EndReason::Exhausted { retries: 25 }.as_label(),
            "retry_exhausted"
        );
    }
}
