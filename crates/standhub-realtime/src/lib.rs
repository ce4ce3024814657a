//! # standhub-realtime
//!
//! The connection hub for StandHub. Provides:
//!
//! - A registry of live WebSocket connections owned by a single event loop
//! - Serialized connect / disconnect / broadcast processing
//! - One ingress reader per connection that turns `PATCH` envelopes into
//!   stand updates
//! - One outbound writer per connection that owns the socket sink
//! - The `{type, payload}` envelope codec

pub mod connection;
pub mod error;
pub mod hub;
pub mod message;
pub mod metrics;

pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use error::{CodecError, DeliveryError, HubError};
pub use hub::Hub;
pub use hub::state::HubState;
pub use message::types::{Envelope, ErrorNotice, MessageKind, PatchCommand};
pub use metrics::{HubMetrics, HubMetricsSnapshot};
