//! # Link: the connection lifecycle driver.
//!
//! [`Link`] supervises one logical connection: it resolves the target
//! address once, asks the injected [`Transport`] to open the channel, feeds
//! inbound units through the [`Codec`], and schedules reconnects through the
//! [`BackoffController`](crate::BackoffController) when the wire terminates.
//!
//! ## Event flow
//! ```text
//! run()
//!   ├─► publish(connect{uri})            ─► transport.open(uri, intake)
//!   │
//!   │   wire Opened  ──► state = Open    ─► publish(open)
//!   │   wire Data    ──► codec.decode()
//!   │         ├─ Ok  ──► publish(data{msg})
//!   │         └─ Err ──► publish(error{reason})   (only if subscribed)
//!   │   wire Closed  ──► backoff.schedule()
//!   │         ├─ Ok(delay) ──► sleep(delay, cancellable)
//!   │         │                  └─► publish(reconnect{uri, attempt})
//!   │         │                      transport.open(uri, intake)
//!   │         └─ Err ──► publish(end{retry budget exhausted})   (terminal)
//!   │
//!   └─ exit conditions:
//!        - retry budget exhausted          ─► Failed
//!        - end() / LinkHandle::end()       ─► Closed (pending backoff cancelled)
//! ```
//!
//! ## Rules
//! - Wire events dispatch **sequentially**, in FIFO post order; handlers for
//!   one topic fire in subscription order on the driver's stack.
//! - At most one backoff timer is pending at any time; it sleeps under a
//!   child of the lifecycle's cancellation token, so an explicit close also
//!   cancels the pending retry.
//! - Every lifecycle publishes exactly one terminal `end` event: either the
//!   retry-exhausted reason or the local-close reason.
//! - Decode and transport errors never unwind through the bus; terminal
//!   conditions travel as named events, so observing them is opt-in.

use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::config::Config;
use crate::error::LinkError;
use crate::events::{topic, EndReason, EventBus, Payload};
use crate::link::descriptor::{ConnectionDescriptor, StdUrlParser, UrlParser};
use crate::link::session::{LinkState, Session};
use crate::transport::{Signal, Transport, WireEvent, WireIntake};

type Bus<C> = EventBus<Session<C>, Payload<<C as Codec>::Msg>>;

/// Cloneable handle that requests an explicit close from outside the driver.
#[derive(Clone)]
pub struct LinkHandle {
    token: CancellationToken,
}

impl LinkHandle {
    /// Requests an explicit close: cancels any pending backoff and stops the
    /// driver on its next turn.
    pub fn end(&self) {
        self.token.cancel();
    }

    /// True once a close has been requested or the lifecycle ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Supervises one logical connection with reconnect, backoff, and event
/// publishing.
pub struct Link<C: Codec> {
    bus: Bus<C>,
    session: Session<C>,
    rx: mpsc::UnboundedReceiver<Signal>,
}

impl<C: Codec> Link<C> {
    /// Creates a lifecycle for `target`, resolving the address with the
    /// default [`StdUrlParser`].
    ///
    /// The descriptor is computed here, once; it is never re-parsed.
    pub fn new(
        target: &str,
        codec: C,
        transport: Box<dyn Transport>,
        cfg: Config,
    ) -> Result<Self, LinkError> {
        Self::with_parser(target, &StdUrlParser, codec, transport, cfg)
    }

    /// Creates a lifecycle resolving `target` through a custom [`UrlParser`].
    pub fn with_parser(
        target: &str,
        parser: &dyn UrlParser,
        codec: C,
        transport: Box<dyn Transport>,
        cfg: Config,
    ) -> Result<Self, LinkError> {
        let descriptor = ConnectionDescriptor::resolve(target, parser)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let intake = WireIntake::new(tx);
        let session = Session::new(
            descriptor,
            codec,
            transport,
            cfg,
            CancellationToken::new(),
            intake,
        );
        Ok(Self {
            bus: EventBus::new(),
            session,
            rx,
        })
    }

    /// Registers `handler` for `event`; returns `self` for chaining.
    ///
    /// Handlers fire on the driver's stack, in subscription order, and
    /// receive the session plus the published payload.
    pub fn subscribe<F>(&mut self, event: impl Into<Cow<'static, str>>, handler: F) -> &mut Self
    where
        F: FnMut(&mut Session<C>, &Payload<C::Msg>) + Send + 'static,
    {
        self.bus.subscribe(event, handler);
        self
    }

    /// Handle for requesting an explicit close from other tasks.
    #[must_use]
    pub fn handle(&self) -> LinkHandle {
        LinkHandle {
            token: self.session.token.clone(),
        }
    }

    /// Intake for transports driven outside [`Transport::open`] (bridges,
    /// tests).
    #[must_use]
    pub fn intake(&self) -> WireIntake {
        self.session.intake.clone()
    }

    /// The session owned by this lifecycle.
    #[inline]
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> LinkState {
        self.session.state()
    }

    /// Encodes `msg` and hands it to the transport (see [`Session::send`]).
    pub fn send(&mut self, msg: &C::Msg) -> Result<(), LinkError> {
        self.session.send(msg)
    }

    /// Explicit close: cancels any pending backoff, closes the transport,
    /// suppresses further automatic reconnects, and publishes the final
    /// `end` event.
    pub fn end(&mut self) {
        if !self.session.state.is_terminal() {
            self.finish(EndReason::Closed);
        }
    }

    /// Drives the lifecycle until it goes terminal.
    ///
    /// On first call this publishes the `connect` intent and asks the
    /// transport to open the channel, then dispatches wire events in FIFO
    /// order. Returns the terminal reason; the same reason was published as
    /// the `end` event.
    pub async fn run(&mut self) -> EndReason {
        // An end requested before the first run must not open the channel.
        if self.session.state == LinkState::Idle && !self.session.token.is_cancelled() {
            self.start();
        }

        loop {
            if let Some(reason) = self.terminal_reason() {
                return reason;
            }
            if self.session.token.is_cancelled() {
                self.finish(EndReason::Closed);
                return EndReason::Closed;
            }

            let signal = tokio::select! {
                _ = self.session.token.cancelled() => None,
                signal = self.rx.recv() => signal,
            };
            match signal {
                Some(signal) => self.dispatch(signal),
                None => {
                    self.finish(EndReason::Closed);
                    return EndReason::Closed;
                }
            }
        }
    }

    /// Initial transition: `Idle → Connecting`.
    fn start(&mut self) {
        self.session.state = LinkState::Connecting;
        info!(uri = %self.session.uri, "connecting");
        let payload = Payload::Intent {
            uri: self.session.uri.clone(),
            attempt: 0,
        };
        self.bus.publish(&mut self.session, topic::CONNECT, &payload);
        self.open_transport();
    }

    fn open_transport(&mut self) {
        let uri = self.session.uri.clone();
        let intake = self.session.intake.clone();
        self.session.transport.open(&uri, intake);
    }

    fn dispatch(&mut self, signal: Signal) {
        if self.session.state.is_terminal() {
            return;
        }
        match signal {
            Signal::Wire(WireEvent::Opened) => self.on_opened(),
            Signal::Wire(WireEvent::Data(raw)) => self.on_data(&raw),
            Signal::Wire(WireEvent::Closed { reason }) => self.on_closed(reason),
            Signal::RetryReady => self.on_retry_ready(),
        }
    }

    fn on_opened(&mut self) {
        if self.session.state != LinkState::Connecting {
            debug!(state = ?self.session.state, "ignoring open report");
            return;
        }
        self.session.state = LinkState::Open;
        if self.session.reset_on_open {
            self.session.backoff.reset();
        }
        info!(uri = %self.session.uri, "channel open");
        self.bus.publish(&mut self.session, topic::OPEN, &Payload::Opened);
    }

    fn on_data(&mut self, raw: &[u8]) {
        match self.session.codec.decode(raw) {
            Ok(msg) => {
                self.bus
                    .publish(&mut self.session, topic::DATA, &Payload::Message(msg));
            }
            Err(e) => {
                warn!(error = %e, len = raw.len(), "dropping undecodable unit");
                if self.bus.is_subscribed(topic::ERROR) {
                    let payload = Payload::BadFrame {
                        reason: Arc::from(e.to_string()),
                    };
                    self.bus.publish(&mut self.session, topic::ERROR, &payload);
                }
            }
        }
    }

    fn on_closed(&mut self, reason: Option<Arc<str>>) {
        self.session.state = LinkState::Ending;
        debug!(
            reason = reason.as_deref().unwrap_or("eof"),
            "channel terminated"
        );

        match self.session.backoff.schedule() {
            Ok(delay) => {
                self.session.state = LinkState::Reconnecting;
                info!(
                    ?delay,
                    attempt = self.session.backoff.attempt(),
                    "reconnect scheduled"
                );
                let intake = self.session.intake.clone();
                let guard = self.session.token.child_token();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => intake.retry_ready(),
                        _ = guard.cancelled() => {}
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "retry budget exhausted; giving up");
                let retries = self.session.backoff.options().retries;
                self.finish(EndReason::Exhausted { retries });
            }
        }
    }

    fn on_retry_ready(&mut self) {
        self.session.backoff.complete();
        self.session.state = LinkState::Connecting;
        let attempt = self.session.backoff.attempt();
        info!(uri = %self.session.uri, attempt, "reconnecting");
        let payload = Payload::Intent {
            uri: self.session.uri.clone(),
            attempt,
        };
        self.bus
            .publish(&mut self.session, topic::RECONNECT, &payload);
        self.open_transport();
    }

    /// Terminal transition: cancels pending timers, closes the transport,
    /// and publishes the single `end` event.
    fn finish(&mut self, reason: EndReason) {
        self.session.token.cancel();
        self.session.transport.close();
        self.session.state = match reason {
            EndReason::Closed => LinkState::Closed,
            EndReason::Exhausted { .. } => LinkState::Failed,
        };
        info!(reason = reason.as_label(), "link ended");
        self.bus
            .publish(&mut self.session, topic::END, &Payload::End(reason));
    }

    fn terminal_reason(&self) -> Option<EndReason> {
        match self.session.state {
            LinkState::Failed => Some(EndReason::Exhausted {
                retries: self.session.backoff.options().retries,
            }),
            LinkState::Closed => Some(EndReason::Closed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::backoff::BackoffOptions;
    use crate::codec::JsonCodec;
    use crate::error::TransportError;

    type Log = Arc<Mutex<Vec<String>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    fn cfg(min_ms: u64, retries: u32) -> Config {
        Config {
            backoff: BackoffOptions {
                min: Duration::from_millis(min_ms),
                max: None,
                retries,
                factor: 2.0,
            },
            reset_on_open: false,
        }
    }

    /// Transport whose every open attempt is refused.
    struct RefusingTransport {
        log: Log,
        opens: Arc<AtomicUsize>,
    }

    impl Transport for RefusingTransport {
        fn open(&mut self, uri: &str, intake: WireIntake) {
            self.opens.fetch_add(1, Ordering::SeqCst);
            push(&self.log, format!("open {uri}"));
            intake.closed(Some("connection refused"));
        }

        fn send(&mut self, _frame: Bytes) -> Result<(), TransportError> {
            Err(TransportError::NotOpen)
        }

        fn close(&mut self) {
            push(&self.log, "close");
        }
    }

    /// Transport that opens successfully and replays a scripted set of
    /// inbound frames.
    struct ScriptedTransport {
        log: Log,
        frames: Vec<&'static [u8]>,
    }

    impl Transport for ScriptedTransport {
        fn open(&mut self, _uri: &str, intake: WireIntake) {
            intake.opened();
            for frame in &self.frames {
                intake.data(*frame);
            }
        }

        fn send(&mut self, frame: Bytes) -> Result<(), TransportError> {
            push(&self.log, format!("send {}", String::from_utf8_lossy(&frame)));
            Ok(())
        }

        fn close(&mut self) {
            push(&self.log, "close");
        }
    }

    /// Transport that refuses the first `failures` opens, then stays open.
    struct FlakyTransport {
        failures: usize,
        opens: usize,
    }

    impl Transport for FlakyTransport {
        fn open(&mut self, _uri: &str, intake: WireIntake) {
            self.opens += 1;
            if self.opens <= self.failures {
                intake.closed(Some("flap"));
            } else {
                intake.opened();
                intake.data(&br#"{"up":true}"#[..]);
            }
        }

        fn send(&mut self, _frame: Bytes) -> Result<(), TransportError> {
            Ok(())
        }

        fn close(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retry_budget_and_publishes_terminal_end() {
        let events = log();
        let transport_log = log();
        let opens = Arc::new(AtomicUsize::new(0));

        let mut link = Link::new(
            "ws://127.0.0.1:9000/feed",
            JsonCodec,
            Box::new(RefusingTransport {
                log: transport_log.clone(),
                opens: opens.clone(),
            }),
            cfg(10, 2),
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::CONNECT, move |_s, p| {
            if let Payload::Intent { uri, attempt } = p {
                push(&seen, format!("connect {uri} attempt={attempt}"));
            }
        });
        let seen = events.clone();
        link.subscribe(topic::RECONNECT, move |_s, p| {
            if let Payload::Intent { attempt, .. } = p {
                push(&seen, format!("reconnect attempt={attempt}"));
            }
        });
        let seen = events.clone();
        link.subscribe(topic::END, move |_s, p| {
            if let Payload::End(reason) = p {
                push(&seen, format!("end {}", reason.as_label()));
            }
        });

        let reason = link.run().await;

        assert_eq!(reason, EndReason::Exhausted { retries: 2 });
        assert_eq!(link.state(), LinkState::Failed);
        // Initial connect plus one open per completed backoff.
        assert_eq!(opens.load(Ordering::SeqCst), 3);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "connect ws://127.0.0.1:9000/feed attempt=0",
                "reconnect attempt=1",
                "reconnect attempt=2",
                "end retry_exhausted",
            ]
        );
        assert!(transport_log.lock().unwrap().contains(&"close".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn decoded_data_reaches_subscribers_in_order() {
        let events = log();
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: log(),
                frames: vec![&br#"{"n":1}"#[..], &br#"{"n":2}"#[..]],
            }),
            cfg(10, 5),
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::DATA, move |session, p| {
            if let Some(msg) = p.message() {
                push(&seen, format!("data {}", msg["n"]));
                if msg["n"] == json!(2) {
                    session.end();
                }
            }
        });

        let reason = link.run().await;

        assert_eq!(reason, EndReason::Closed);
        assert_eq!(*events.lock().unwrap(), vec!["data 1", "data 2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn decode_failures_publish_error_only_when_subscribed() {
        let events = log();
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: log(),
                frames: vec![&br#"{"ok":1}"#[..], &b"garbage"[..], &br#"{"ok":2}"#[..]],
            }),
            cfg(10, 5),
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::ERROR, move |_s, p| {
            if let Payload::BadFrame { .. } = p {
                push(&seen, "bad frame");
            }
        });
        let seen = events.clone();
        link.subscribe(topic::DATA, move |session, p| {
            if let Some(msg) = p.message() {
                push(&seen, format!("data {}", msg["ok"]));
                if msg["ok"] == json!(2) {
                    session.end();
                }
            }
        });

        let reason = link.run().await;

        assert_eq!(reason, EndReason::Closed);
        // The bad frame is dropped, observed, and data keeps flowing.
        assert_eq!(
            *events.lock().unwrap(),
            vec!["data 1", "bad frame", "data 2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn decode_failure_without_error_subscriber_is_silent() {
        let events = log();
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: log(),
                frames: vec![&b"garbage"[..], &br#"{"ok":1}"#[..]],
            }),
            cfg(10, 5),
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::DATA, move |session, p| {
            if p.message().is_some() {
                push(&seen, "data");
                session.end();
            }
        });

        let reason = link.run().await;
        assert_eq!(reason, EndReason::Closed);
        assert_eq!(*events.lock().unwrap(), vec!["data"]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_end_cancels_pending_backoff() {
        let events = log();
        let transport_log = log();
        let opens = Arc::new(AtomicUsize::new(0));

        let mut link = Link::new(
            "ws://host/feed",
            JsonCodec,
            Box::new(RefusingTransport {
                log: transport_log.clone(),
                opens: opens.clone(),
            }),
            // A one-minute first delay: the retry must never fire.
            cfg(60_000, 5),
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::RECONNECT, move |_s, _p| {
            push(&seen, "reconnect");
        });
        let seen = events.clone();
        link.subscribe(topic::END, move |_s, p| {
            if let Payload::End(reason) = p {
                push(&seen, format!("end {}", reason.as_label()));
            }
        });

        let handle = link.handle();
        let driver = tokio::spawn(async move { link.run().await });

        // Let the driver process the refused connect and arm the timer.
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.end();

        let reason = driver.await.unwrap();
        assert_eq!(reason, EndReason::Closed);
        assert_eq!(*events.lock().unwrap(), vec!["end closed"]);
        assert_eq!(opens.load(Ordering::SeqCst), 1, "no reconnect after end()");
        assert!(transport_log.lock().unwrap().contains(&"close".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_on_open_restores_the_budget() {
        let events = log();
        let mut link = Link::new(
            "ws://host/feed",
            JsonCodec,
            Box::new(FlakyTransport {
                failures: 2,
                opens: 0,
            }),
            Config {
                reset_on_open: true,
                ..cfg(5, 2)
            },
        )
        .unwrap();

        let seen = events.clone();
        link.subscribe(topic::OPEN, move |session, _p| {
            push(&seen, format!("open attempts={}", session.attempts()));
        });
        let seen = events.clone();
        link.subscribe(topic::DATA, move |session, _p| {
            push(&seen, "data");
            session.end();
        });

        let reason = link.run().await;

        assert_eq!(reason, EndReason::Closed);
        // Two flaps consumed the whole budget; the successful open reset it.
        assert_eq!(
            *events.lock().unwrap(),
            vec!["open attempts=0", "data"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn send_round_trips_through_codec_and_transport() {
        let transport_log = log();
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: transport_log.clone(),
                frames: vec![&br#"{"hello":true}"#[..]],
            }),
            cfg(10, 5),
        )
        .unwrap();

        link.subscribe(topic::DATA, move |session, _p| {
            session.send(&json!({"reply": 1})).unwrap();
            session.end();
        });

        let reason = link.run().await;
        assert_eq!(reason, EndReason::Closed);
        assert_eq!(
            *transport_log.lock().unwrap(),
            vec![r#"send {"reply":1}"#, "close"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn send_before_open_is_rejected() {
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: log(),
                frames: vec![],
            }),
            cfg(10, 5),
        )
        .unwrap();

        let err = link.send(&json!({"too": "early"})).unwrap_err();
        assert_eq!(err.as_label(), "transport_not_open");
    }

    #[tokio::test(start_paused = true)]
    async fn run_after_end_returns_immediately() {
        let mut link = Link::new(
            "http://host/feed",
            JsonCodec,
            Box::new(ScriptedTransport {
                log: log(),
                frames: vec![],
            }),
            cfg(10, 5),
        )
        .unwrap();

        let ends = Arc::new(AtomicUsize::new(0));
        let counter = ends.clone();
        link.subscribe(topic::END, move |_s, _p| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        link.end();
        assert_eq!(link.state(), LinkState::Closed);
        assert_eq!(link.run().await, EndReason::Closed);
        assert_eq!(ends.load(Ordering::SeqCst), 1, "end publishes exactly once");
    }
}
