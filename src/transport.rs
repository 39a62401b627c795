//! # Transport seam and the wire intake adapter.
//!
//! [`Transport`] is the byte-level channel opener injected into a
//! [`Link`](crate::Link) at construction. The core tells it *when* to open,
//! send, and close; the transport owns the actual wire machinery (sockets,
//! TLS, framing) and reports activity back through a [`WireIntake`].
//!
//! ## Intake rules
//! - Posts are **deferred**: `opened`/`data`/`closed` enqueue onto the
//!   lifecycle's intake queue and return immediately. Dispatch never runs
//!   synchronously with the transport's own callback stack, so drivers can
//!   report from deep inside their I/O handling without re-entrancy.
//! - Posts are **FIFO** relative to each other on the same intake.
//! - Posting to a lifecycle that already went terminal is harmless; the
//!   events are ignored.
//!
//! ## Failure path
//! There is exactly one: [`WireIntake::closed`]. A transport that fails to
//! connect reports `closed` just like one that lost an established channel;
//! the lifecycle cannot tell the difference and does not need to.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// Wire-level activity reported by a transport.
#[derive(Debug, Clone)]
pub enum WireEvent {
    /// The byte channel is open; data may flow.
    Opened,
    /// One inbound unit, exactly as it arrived off the wire.
    Data(Bytes),
    /// The channel terminated (remote close, connect failure, I/O error).
    Closed {
        /// Optional transport diagnostic.
        reason: Option<Arc<str>>,
    },
}

/// Internal driver signal: wire activity or a completed backoff delay.
#[derive(Debug, Clone)]
pub(crate) enum Signal {
    Wire(WireEvent),
    RetryReady,
}

/// Handle transports use to push wire events into a lifecycle.
///
/// Cheap to clone; every clone posts to the same FIFO queue.
#[derive(Clone)]
pub struct WireIntake {
    tx: mpsc::UnboundedSender<Signal>,
}

impl WireIntake {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { tx }
    }

    /// Reports that the channel is open.
    pub fn opened(&self) {
        self.post(Signal::Wire(WireEvent::Opened));
    }

    /// Reports one inbound unit.
    pub fn data(&self, raw: impl Into<Bytes>) {
        self.post(Signal::Wire(WireEvent::Data(raw.into())));
    }

    /// Reports channel termination.
    pub fn closed(&self, reason: Option<&str>) {
        self.post(Signal::Wire(WireEvent::Closed {
            reason: reason.map(Arc::from),
        }));
    }

    pub(crate) fn retry_ready(&self) {
        self.post(Signal::RetryReady);
    }

    fn post(&self, signal: Signal) {
        // A closed receiver means the lifecycle is gone; nothing to report to.
        let _ = self.tx.send(signal);
    }
}

/// Byte-level channel opener, injected into the lifecycle at construction.
///
/// Implementations subscribe to the lifecycle's intents implicitly: the core
/// calls [`open`](Transport::open) once for the initial connect and once per
/// reconnect, always with the same resolved address. Everything the wire
/// reports flows back through the provided [`WireIntake`].
pub trait Transport: Send + 'static {
    /// Opens (or reopens) the channel to `uri`.
    ///
    /// Must not block: spawn whatever machinery the wire needs and return.
    /// Connect failures are reported as [`WireIntake::closed`].
    fn open(&mut self, uri: &str, intake: WireIntake);

    /// Sends one encoded unit over the open channel.
    fn send(&mut self, frame: Bytes) -> Result<(), TransportError>;

    /// Tears the channel down. Called once, when the lifecycle ends.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn intake_posts_are_fifo() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let intake = WireIntake::new(tx);

        intake.opened();
        intake.data(&b"one"[..]);
        intake.data(&b"two"[..]);
        intake.closed(Some("eof"));

        assert!(matches!(rx.recv().await, Some(Signal::Wire(WireEvent::Opened))));
        match rx.recv().await {
            Some(Signal::Wire(WireEvent::Data(b))) => assert_eq!(&b[..], b"one"),
            other => panic!("unexpected signal: {other:?}"),
        }
        match rx.recv().await {
            Some(Signal::Wire(WireEvent::Data(b))) => assert_eq!(&b[..], b"two"),
            other => panic!("unexpected signal: {other:?}"),
        }
        match rx.recv().await {
            Some(Signal::Wire(WireEvent::Closed { reason })) => {
                assert_eq!(reason.as_deref(), Some("eof"));
            }
            other => panic!("unexpected signal: {other:?}"),
        }
    }

    #[test]
    fn posting_to_a_dropped_lifecycle_is_harmless() {
        let (tx, rx) = mpsc::unbounded_channel();
        let intake = WireIntake::new(tx);
        drop(rx);
        intake.opened();
        intake.closed(None);
    }
}
