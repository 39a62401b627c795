//! # Message codec seam.
//!
//! [`Codec`] is the extension point for plugging the application's wire
//! format into the lifecycle. The core calls [`Codec::decode`] once per
//! inbound unit and [`Codec::encode`] once per outbound message; it never
//! interprets the bytes itself.
//!
//! ## Contract
//! - Decode failures are recovered locally by the lifecycle: the frame is
//!   dropped and an opt-in `error` event is published. A codec must report
//!   bad input through [`CodecError`], never panic on it.
//! - [`JsonCodec`] is the built-in reference implementation
//!   (`Msg = serde_json::Value`).

use bytes::Bytes;

use crate::error::CodecError;

/// Serializes and deserializes application messages to and from wire bytes.
pub trait Codec: Send + 'static {
    /// Decoded application message type.
    type Msg: Send + 'static;

    /// Decodes one inbound unit.
    fn decode(&self, raw: &[u8]) -> Result<Self::Msg, CodecError>;

    /// Serializes one outbound message.
    fn encode(&self, msg: &Self::Msg) -> Result<Bytes, CodecError>;
}

/// JSON codec over `serde_json::Value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    /// Construct a new [`JsonCodec`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    type Msg = serde_json::Value;

    fn decode(&self, raw: &[u8]) -> Result<Self::Msg, CodecError> {
        serde_json::from_slice(raw).map_err(|e| CodecError::Decode {
            reason: e.to_string(),
        })
    }

    fn encode(&self, msg: &Self::Msg) -> Result<Bytes, CodecError> {
        serde_json::to_vec(msg)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_valid_json() {
        let msg = JsonCodec.decode(br#"{"kind":"tick","n":3}"#).unwrap();
        assert_eq!(msg, json!({"kind": "tick", "n": 3}));
    }

    #[test]
    fn rejects_garbage() {
        let err = JsonCodec.decode(b"not json").unwrap_err();
        assert_eq!(err.as_label(), "codec_decode");
    }

    #[test]
    fn encodes_to_compact_bytes() {
        let frame = JsonCodec.encode(&json!({"n": 1})).unwrap();
        assert_eq!(&frame[..], br#"{"n":1}"#);
    }
}
