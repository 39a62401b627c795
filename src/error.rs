//! Error types used by the relink core and its boundary seams.
//!
//! This module defines one enum per failure domain:
//!
//! - [`RetryError`] — retry scheduling failures (budget exhaustion / misuse).
//! - [`AddressError`] — connection-string resolution failures.
//! - [`CodecError`] — encode/decode failures at the codec seam.
//! - [`TransportError`] — failures reported by the injected transport.
//! - [`LinkError`] — top-level error for the public `Link` surface.
//!
//! All types provide `as_label()` for logs/metrics. Decode failures never
//! unwind through the event bus: the lifecycle converts them into opt-in
//! `error` events, and terminal conditions travel as `end` events.

use thiserror::Error;

/// Errors produced by retry scheduling.
///
/// Invoking the controller while a delay is already pending is treated
/// identically to budget exhaustion: it signals a caller bug and fails fast
/// rather than silently queuing.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// The retry budget ran dry (or a backoff was already in flight).
    #[error("retry budget exhausted (retries={retries})")]
    Exhausted {
        /// The configured retry ceiling.
        retries: u32,
    },
}

impl RetryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Exhausted { .. } => "retry_exhausted",
        }
    }
}

/// Errors produced while resolving a connection string.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The connection string could not be split into scheme/host/path/query.
    #[error("invalid connection string {input:?}: {reason}")]
    Invalid {
        /// The offending input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The connection string parsed, but carries no host to connect to.
    #[error("connection string {input:?} has no host")]
    MissingHost {
        /// The offending input.
        input: String,
    },
}

impl AddressError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AddressError::Invalid { .. } => "address_invalid",
            AddressError::MissingHost { .. } => "address_missing_host",
        }
    }
}

/// Errors produced by the message codec seam.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An inbound unit could not be decoded into an application message.
    #[error("decode failed: {reason}")]
    Decode {
        /// Codec diagnostic.
        reason: String,
    },

    /// An outbound message could not be serialized to wire bytes.
    #[error("encode failed: {reason}")]
    Encode {
        /// Codec diagnostic.
        reason: String,
    },
}

impl CodecError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CodecError::Decode { .. } => "codec_decode",
            CodecError::Encode { .. } => "codec_encode",
        }
    }
}

/// Errors reported by the injected transport.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel is not open; nothing can be sent.
    #[error("channel is not open")]
    NotOpen,

    /// The transport failed to accept or deliver a frame.
    #[error("transport failure: {reason}")]
    Failed {
        /// Transport diagnostic.
        reason: String,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::NotOpen => "transport_not_open",
            TransportError::Failed { .. } => "transport_failed",
        }
    }
}

/// Top-level error for the public [`Link`](crate::Link) surface.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkError {
    /// Connection-string resolution failed.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Encode/decode failed at the codec seam.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The transport rejected an operation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Retry scheduling failed.
    #[error(transparent)]
    Retry(#[from] RetryError),
}

impl LinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkError::Address(e) => e.as_label(),
            LinkError::Codec(e) => e.as_label(),
            LinkError::Transport(e) => e.as_label(),
            LinkError::Retry(e) => e.as_label(),
        }
    }
}
