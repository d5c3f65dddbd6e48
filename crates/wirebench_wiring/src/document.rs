// SPDX-License-Identifier: MIT OR Apache-2.0
//! The wire JSON document exchanged with the grading server.

use crate::connection::{ConnectionError, ConnectionSet, WireId};
use crate::topology::{PinRef, Testbed, TopologyError};
use serde::{Deserialize, Serialize};

/// One persisted connection: endpoint identities only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    /// Source pin
    pub from: PinRef,
    /// Destination pin
    pub to: PinRef,
}

/// The full document: the testbed topology plus the saved connection list.
///
/// `connections` may be absent on input; it is always written on output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDocument {
    /// The topology section
    #[serde(flatten)]
    pub testbed: Testbed,
    /// Saved connections in their original insertion order
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

impl WireDocument {
    /// Parse a document from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, TopologyError> {
        serde_json::from_str(json).map_err(|e| TopologyError::Malformed(e.to_string()))
    }
}

/// Serialize the session into the outbound document
pub fn serialize_document(testbed: &Testbed, connections: &ConnectionSet) -> WireDocument {
    WireDocument {
        testbed: testbed.clone(),
        connections: connections.entries(),
    }
}

/// A saved entry that could not be restored
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    /// An endpoint no longer exists in the topology
    #[error("saved connection references unknown pin {0}")]
    UnknownPinReference(PinRef),

    /// An endpoint collides with an entry restored earlier in the batch
    #[error("saved connection rejected: {0}")]
    Conflict(#[from] ConnectionError),
}

/// Result of restoring a saved connection list
#[derive(Debug, Default)]
pub struct RestoreOutcome {
    /// Connections that resolved cleanly, in document order
    pub connections: ConnectionSet,
    /// Entries that were skipped, with the reason; the caller decides how to
    /// surface them
    pub skipped: Vec<RestoreError>,
}

/// Resolve saved entries against the topology. A stale or colliding entry is
/// skipped and recorded; the rest of the batch still loads.
pub fn restore_connections(entries: &[ConnectionEntry], testbed: &Testbed) -> RestoreOutcome {
    let mut outcome = RestoreOutcome::default();

    for entry in entries {
        let unknown = [&entry.from, &entry.to]
            .into_iter()
            .find(|pin| testbed.resolve(pin).is_none());
        if let Some(pin) = unknown {
            outcome
                .skipped
                .push(RestoreError::UnknownPinReference(pin.clone()));
            continue;
        }

        if let Err(err) =
            outcome
                .connections
                .add(entry.from.clone(), entry.to.clone(), WireId::new())
        {
            outcome.skipped.push(RestoreError::Conflict(err));
        }
    }

    outcome
}
