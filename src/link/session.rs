//! Per-lifecycle session state handed to event handlers.
//!
//! [`Session`] bundles everything one connection owns: the parse-once
//! descriptor, the state machine, the backoff controller, and the injected
//! codec and transport. Event handlers receive `&mut Session` so they can
//! act on the connection they observe — send a reply, request a close,
//! inspect the state — without reaching outside the lifecycle.
//!
//! Sessions are never shared across lifecycles.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backoff::BackoffController;
use crate::codec::Codec;
use crate::config::Config;
use crate::error::{LinkError, TransportError};
use crate::link::descriptor::ConnectionDescriptor;
use crate::transport::{Transport, WireIntake};

/// Lifecycle states of one logical connection.
///
/// ```text
/// Idle ─► Connecting ─► Open ─(data*)─► Ending ─┬─► Reconnecting ─► Connecting
///                                               └─► Failed
/// Closed: explicit local close, reachable from any non-terminal state.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Constructed, not yet driven.
    Idle,
    /// The transport was asked to open the channel.
    Connecting,
    /// The channel is open; data may flow.
    Open,
    /// The channel terminated; deciding between reconnect and failure.
    Ending,
    /// A backoff delay is pending before the next connect.
    Reconnecting,
    /// The retry budget ran dry (terminal).
    Failed,
    /// Explicitly closed (terminal).
    Closed,
}

impl LinkState {
    /// True for states with no further automatic transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, LinkState::Failed | LinkState::Closed)
    }
}

/// Mutable per-connection state owned by one [`Link`](crate::Link).
pub struct Session<C: Codec> {
    pub(crate) descriptor: ConnectionDescriptor,
    pub(crate) uri: Arc<str>,
    pub(crate) state: LinkState,
    pub(crate) backoff: BackoffController,
    pub(crate) codec: C,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) token: CancellationToken,
    pub(crate) intake: WireIntake,
    pub(crate) reset_on_open: bool,
}

impl<C: Codec> Session<C> {
    pub(crate) fn new(
        descriptor: ConnectionDescriptor,
        codec: C,
        transport: Box<dyn Transport>,
        cfg: Config,
        token: CancellationToken,
        intake: WireIntake,
    ) -> Self {
        let uri: Arc<str> = descriptor.uri().into();
        Self {
            descriptor,
            uri,
            state: LinkState::Idle,
            backoff: BackoffController::new(cfg.backoff),
            codec,
            transport,
            token,
            intake,
            reset_on_open: cfg.reset_on_open,
        }
    }

    /// Resolved address the transport connects to.
    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The parse-once connection descriptor.
    #[inline]
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Backoff attempts consumed so far.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.backoff.attempt()
    }

    /// Encodes `msg` and hands the frame to the transport.
    ///
    /// Fails with [`TransportError::NotOpen`] unless the channel is `Open`.
    pub fn send(&mut self, msg: &C::Msg) -> Result<(), LinkError> {
        if self.state != LinkState::Open {
            return Err(TransportError::NotOpen.into());
        }
        let frame = self.codec.encode(msg)?;
        self.transport.send(frame)?;
        Ok(())
    }

    /// Requests an explicit close; the driver finalizes on its next turn.
    pub fn end(&self) {
        self.token.cancel();
    }
}
