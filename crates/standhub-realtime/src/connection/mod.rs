//! Per-connection state and tasks.
//!
//! Each accepted socket is split in two: a writer task owns the sink and
//! drains the connection's outbound queue, while the ingress reader owns the
//! stream. Everything that writes to a client goes through the queue, so
//! frames never interleave.

pub mod handle;
pub mod reader;
pub mod registry;
pub mod writer;
