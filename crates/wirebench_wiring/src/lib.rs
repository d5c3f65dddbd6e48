// SPDX-License-Identifier: MIT OR Apache-2.0
//! Testbed wiring core for `WireBench`.
//!
//! This crate provides the display-independent model behind the wire
//! editor:
//! - Immutable testbed topology (devices, pin headers, pins)
//! - Geometry mapping from topology elements to canvas coordinates
//! - The connection set with its one-connection-per-pin invariant
//! - The click/hover interaction state machine, emitting draw commands
//! - The wire JSON document exchanged with the grading server
//!
//! ## Architecture
//!
//! The [`controller::WiringController`] never touches a rendering API; the
//! [`ui`] module is a thin egui adapter that feeds it pointer events and
//! executes the draw commands it returns.

pub mod connection;
pub mod controller;
pub mod document;
pub mod geometry;
pub mod topology;
pub mod ui;

pub use connection::{Connection, ConnectionError, ConnectionId, ConnectionSet, WireId};
pub use controller::{DrawCommand, WiringController, WiringEvent};
pub use document::{
    restore_connections, serialize_document, ConnectionEntry, RestoreError, RestoreOutcome,
    WireDocument,
};
pub use topology::{Device, Header, Pin, PinRef, Testbed, TopologyError};
pub use ui::WireEditorState;
