// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections between pins and the session's connection set.

use crate::topology::PinRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to a connection's visual wire.
///
/// The wiring core only mints and forwards these; the rendered primitive
/// behind a handle belongs to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireId(pub Uuid);

impl WireId {
    /// Create a new random wire handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WireId {
    fn default() -> Self {
        Self::new()
    }
}

/// A user-drawn link between two pins
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source pin
    pub from: PinRef,
    /// Destination pin
    pub to: PinRef,
    /// Visual wire handle
    pub wire: WireId,
}

impl Connection {
    /// Check if this connection has a specific pin as an endpoint
    pub fn involves(&self, pin: &PinRef) -> bool {
        self.from == *pin || self.to == *pin
    }
}

/// The mutable runtime state: all established connections, indexed by
/// endpoint so that each pin participates in at most one connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSet {
    connections: IndexMap<ConnectionId, Connection>,
    by_endpoint: HashMap<PinRef, ConnectionId>,
}

impl ConnectionSet {
    /// Create an empty connection set
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the connection a pin participates in, if any
    pub fn find_by_endpoint(&self, pin: &PinRef) -> Option<&Connection> {
        let id = self.by_endpoint.get(pin)?;
        self.connections.get(id)
    }

    /// Add a connection between two free pins.
    ///
    /// Fails with [`ConnectionError::EndpointBusy`] when either endpoint is
    /// already part of a connection, and [`ConnectionError::SelfLink`] when
    /// both endpoints are the same pin. Callers are expected to have removed
    /// conflicting connections first.
    pub fn add(
        &mut self,
        from: PinRef,
        to: PinRef,
        wire: WireId,
    ) -> Result<ConnectionId, ConnectionError> {
        if from == to {
            return Err(ConnectionError::SelfLink(from));
        }
        if self.by_endpoint.contains_key(&from) {
            return Err(ConnectionError::EndpointBusy(from));
        }
        if self.by_endpoint.contains_key(&to) {
            return Err(ConnectionError::EndpointBusy(to));
        }

        let id = ConnectionId::new();
        self.by_endpoint.insert(from.clone(), id);
        self.by_endpoint.insert(to.clone(), id);
        self.connections.insert(id, Connection { id, from, to, wire });
        Ok(id)
    }

    /// Remove a connection. Removing an id that is not present is a no-op,
    /// which keeps the controller's toggle logic simple.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&id)?;
        self.by_endpoint.remove(&connection.from);
        self.by_endpoint.remove(&connection.to);
        Some(connection)
    }

    /// Iterate connections in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Number of connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Drop all connections
    pub fn clear(&mut self) {
        self.connections.clear();
        self.by_endpoint.clear();
    }

    /// Endpoint pairs in insertion order, for serialization
    pub fn entries(&self) -> Vec<crate::document::ConnectionEntry> {
        self.connections
            .values()
            .map(|c| crate::document::ConnectionEntry {
                from: c.from.clone(),
                to: c.to.clone(),
            })
            .collect()
    }
}

/// Error when adding a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Endpoint already participates in a connection
    #[error("pin {0} is already connected")]
    EndpointBusy(PinRef),

    /// Both endpoints are the same pin
    #[error("pin {0} cannot be wired to itself")]
    SelfLink(PinRef),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(device: u32, no: u32) -> PinRef {
        PinRef::new(device, "GPIO", no)
    }

    #[test]
    fn add_indexes_both_endpoints() {
        let mut set = ConnectionSet::new();
        let id = set.add(pin(0, 1), pin(1, 40), WireId::new()).unwrap();

        let from_side = set.find_by_endpoint(&pin(0, 1)).unwrap();
        let to_side = set.find_by_endpoint(&pin(1, 40)).unwrap();
        assert_eq!(from_side.id, id);
        assert_eq!(to_side.id, id);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn busy_endpoint_is_rejected() {
        let mut set = ConnectionSet::new();
        set.add(pin(0, 1), pin(1, 40), WireId::new()).unwrap();

        let err = set.add(pin(0, 1), pin(0, 2), WireId::new()).unwrap_err();
        assert_eq!(err, ConnectionError::EndpointBusy(pin(0, 1)));

        // Destination side too
        let err = set.add(pin(0, 2), pin(1, 40), WireId::new()).unwrap_err();
        assert_eq!(err, ConnectionError::EndpointBusy(pin(1, 40)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn self_link_is_rejected() {
        let mut set = ConnectionSet::new();
        let err = set.add(pin(0, 1), pin(0, 1), WireId::new()).unwrap_err();
        assert_eq!(err, ConnectionError::SelfLink(pin(0, 1)));
        assert!(set.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set = ConnectionSet::new();
        let id = set.add(pin(0, 1), pin(1, 40), WireId::new()).unwrap();

        assert!(set.remove(id).is_some());
        assert!(set.remove(id).is_none());
        assert!(set.find_by_endpoint(&pin(0, 1)).is_none());
        assert!(set.find_by_endpoint(&pin(1, 40)).is_none());

        // Removed endpoints are free again
        set.add(pin(0, 1), pin(1, 40), WireId::new()).unwrap();
    }

    #[test]
    fn entries_follow_insertion_order() {
        let mut set = ConnectionSet::new();
        set.add(pin(0, 1), pin(1, 40), WireId::new()).unwrap();
        set.add(pin(0, 3), pin(1, 38), WireId::new()).unwrap();

        let entries = set.entries();
        assert_eq!(entries[0].from, pin(0, 1));
        assert_eq!(entries[1].from, pin(0, 3));
    }
}
