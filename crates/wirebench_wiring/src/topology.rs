// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static testbed topology: devices, pin headers, and pins.
//!
//! The topology is loaded once from the wire JSON document and never mutated
//! by the wiring core. All field names match the exchanged document exactly.

use serde::{Deserialize, Serialize};

/// Identity of a single pin: `(device_id, header_name, pin_no)`.
///
/// This is what renderable pin elements carry instead of back-references
/// into the topology, and what the wire document stores per endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRef {
    /// Owning device id
    pub device_id: u32,
    /// Header name within the device
    pub header_name: String,
    /// Pin number within the header
    pub pin_no: u32,
}

impl PinRef {
    /// Create a pin reference
    pub fn new(device_id: u32, header_name: impl Into<String>, pin_no: u32) -> Self {
        Self {
            device_id,
            header_name: header_name.into(),
            pin_no,
        }
    }
}

impl std::fmt::Display for PinRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.device_id, self.header_name, self.pin_no)
    }
}

/// A single connectable terminal on a device header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Pin number, unique within its header
    pub pin_no: u32,
    /// Display name (e.g. "BCM17", "GND")
    pub pin_name: String,
    /// Position `[col, row]` within the header, in cell units
    pub pin_pos: [u32; 2],
    /// Whether the pin is offered for wiring; unavailable pins are rendered
    /// distinctly but the click path does not reject them
    pub available: bool,
}

/// A named group of pins on a device (e.g. a GPIO strip)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Header name, unique within its device
    pub header_name: String,
    /// Header extent `[cols, rows]` in cell units
    pub header_shape: [u32; 2],
    /// Header offset within the device, in cell units
    pub header_pos: [u32; 2],
    /// Pins in declaration order
    pub pins: Vec<Pin>,
}

impl Header {
    /// Look up a pin by number
    pub fn pin(&self, pin_no: u32) -> Option<&Pin> {
        self.pins.iter().find(|p| p.pin_no == pin_no)
    }
}

/// A device placed on the testbed canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Device id, unique within the testbed
    pub device_id: u32,
    /// Display name
    pub device_name: String,
    /// Device extent `[width, height]` in cell units
    pub device_shape: [u32; 2],
    /// Absolute position on the testbed canvas, in cell units
    pub device_pos: [u32; 2],
    /// Reserved: stored and round-tripped, not applied by the geometry
    /// mapper. Only identity rotation has ever been exercised.
    pub device_rotation: i32,
    /// Pin headers in declaration order
    pub pin_headers: Vec<Header>,
}

impl Device {
    /// Look up a header by name
    pub fn header(&self, name: &str) -> Option<&Header> {
        self.pin_headers.iter().find(|h| h.header_name == name)
    }
}

/// The full testbed: a canvas of devices. Root of the topology model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testbed {
    /// Testbed id
    pub testbed_id: u32,
    /// Display name
    pub testbed_name: String,
    /// Canvas extent `[width, height]` in cell units
    pub testbed_shape: [u32; 2],
    /// Devices in declaration order
    pub devices: Vec<Device>,
}

impl Testbed {
    /// Load a testbed from a JSON value.
    ///
    /// Fails with [`TopologyError::Malformed`] when required fields are
    /// absent or positions are non-numeric. Never defaults missing data.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TopologyError> {
        serde_json::from_value(value).map_err(|e| TopologyError::Malformed(e.to_string()))
    }

    /// Load a testbed from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, TopologyError> {
        serde_json::from_str(json).map_err(|e| TopologyError::Malformed(e.to_string()))
    }

    /// Look up a device by id
    pub fn device(&self, device_id: u32) -> Option<&Device> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }

    /// Resolve a pin reference against the topology
    pub fn resolve(&self, pin: &PinRef) -> Option<&Pin> {
        self.device(pin.device_id)?
            .header(&pin.header_name)?
            .pin(pin.pin_no)
    }

    /// Iterate every pin with its identity, in declaration order
    pub fn pins(&self) -> impl Iterator<Item = (PinRef, &Pin)> {
        self.devices.iter().flat_map(|dev| {
            dev.pin_headers.iter().flat_map(move |hdr| {
                hdr.pins.iter().map(move |pin| {
                    (
                        PinRef::new(dev.device_id, hdr.header_name.clone(), pin.pin_no),
                        pin,
                    )
                })
            })
        })
    }
}

/// Error when loading a topology
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// Required fields absent or malformed; fatal at session start
    #[error("malformed topology: {0}")]
    Malformed(String),
}
