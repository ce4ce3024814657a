//! Builders for the frames the hub sends.

use serde_json::value::to_raw_value;

use standhub_core::types::StandSnapshot;

use super::serializer::encode_envelope;
use super::types::{ErrorNotice, MessageKind};
use crate::error::CodecError;

/// Reply to a frame that is not a decodable envelope.
pub const MALFORMED_MESSAGE: &str = "Malformed message.";
/// Reply to an envelope whose type is not `PATCH`.
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type.";
/// Reply to a `PATCH` whose payload does not decode or validate.
pub const INVALID_PATCH_PAYLOAD: &str = "Invalid payload for PATCH message.";
/// Reply to a `PATCH` the business logic could not apply.
pub const UPDATE_FAILED: &str = "Failed to update data.";
/// Sent to a new connection when the initial snapshot cannot be read.
pub const INITIAL_STANDS_FAILED: &str = "Failed to get initial stands.";

/// Build an `UPDATE` frame carrying a full stand snapshot.
pub fn update_frame(snapshot: &StandSnapshot) -> Result<String, CodecError> {
    encode_envelope(MessageKind::Update, snapshot.as_raw())
}

/// Build an `ERROR` frame with a human-readable message.
pub fn error_frame(message: &str) -> Result<String, CodecError> {
    let payload = to_raw_value(&ErrorNotice {
        message: message.to_string(),
    })
    .map_err(CodecError::Encode)?;
    encode_envelope(MessageKind::Error, &payload)
}
