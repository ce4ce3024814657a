//! Envelope and payload type definitions.
//!
//! Every frame in either direction is a JSON object of the shape
//! `{"type": "<KIND>", "payload": <any JSON>}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// The message kinds the hub understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Server to client: full stand collection.
    Update,
    /// Client to server: apply an update to one stand.
    Patch,
    /// Server to client: a request could not be served.
    Error,
}

impl MessageKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::Patch => "PATCH",
            Self::Error => "ERROR",
        }
    }

    /// Parse a wire name. Matching is exact; `"patch"` is not `PATCH`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "UPDATE" => Some(Self::Update),
            "PATCH" => Some(Self::Patch),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound frame as decoded off the wire.
///
/// `kind` stays a plain string so that unknown kinds decode successfully and
/// can be answered with an `ERROR` reply instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Declared message type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Undecoded payload, interpreted according to `kind`.
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

impl Envelope {
    /// The recognised kind, if any.
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::parse(&self.kind)
    }
}

/// An outbound frame; the payload is written through verbatim.
#[derive(Debug, Serialize)]
pub struct OutboundEnvelope<'a> {
    /// Message type.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Already-encoded payload.
    pub payload: &'a RawValue,
}

/// Payload of a `PATCH` envelope.
#[derive(Debug, Deserialize)]
pub struct PatchCommand {
    /// Target stand id.
    pub id: String,
    /// Update object, forwarded to the store without interpretation.
    #[serde(rename = "updateData")]
    pub update_data: Box<RawValue>,
}

/// Payload of an `ERROR` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// Human-readable description.
    pub message: String,
}
