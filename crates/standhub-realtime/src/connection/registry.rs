//! The set of live connections.
//!
//! Owned exclusively by the hub's event loop; nothing else holds a
//! reference, so no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;

use super::handle::{ConnectionHandle, ConnectionId};

/// Live connections keyed by id.
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns `false` if the id is already present.
    pub fn insert(&mut self, handle: Arc<ConnectionHandle>) -> bool {
        if self.connections.contains_key(&handle.id) {
            return false;
        }
        self.connections.insert(handle.id, handle);
        true
    }

    /// Remove a connection, returning it if it was present.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.remove(id)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Iterate over registered connections.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConnectionHandle>> {
        self.connections.values()
    }

    /// Remove and return every connection.
    pub fn drain(&mut self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.drain().map(|(_, handle)| handle).collect()
    }
}
