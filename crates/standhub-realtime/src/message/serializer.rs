//! JSON encoding and decoding of envelopes.

use serde_json::value::RawValue;

use super::types::{Envelope, MessageKind, OutboundEnvelope, PatchCommand};
use crate::error::CodecError;

/// Decode a text or binary frame into an envelope.
pub fn decode_envelope(frame: &[u8]) -> Result<Envelope, CodecError> {
    serde_json::from_slice(frame).map_err(CodecError::Malformed)
}

/// Decode the payload of a `PATCH` envelope.
pub fn decode_patch(payload: Option<&RawValue>) -> Result<PatchCommand, CodecError> {
    let payload = payload.ok_or_else(|| CodecError::InvalidPayload {
        kind: MessageKind::Patch.as_str(),
        reason: "missing payload".to_string(),
    })?;

    serde_json::from_str(payload.get()).map_err(|e| CodecError::InvalidPayload {
        kind: MessageKind::Patch.as_str(),
        reason: e.to_string(),
    })
}

/// Encode an outbound envelope around an already-encoded payload.
pub fn encode_envelope(kind: MessageKind, payload: &RawValue) -> Result<String, CodecError> {
    serde_json::to_string(&OutboundEnvelope {
        kind: kind.as_str(),
        payload,
    })
    .map_err(CodecError::Encode)
}
