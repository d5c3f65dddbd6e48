// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mapping from topology elements to canvas coordinates.
//!
//! Everything here is a pure function of the topology and a uniform cell
//! size: the live wire and the persisted-connection redraw path both rely on
//! reconstructing identical anchor points for the same pin.

use crate::topology::{Device, Header, Pin, PinRef, Testbed};

/// An axis-aligned rectangle on the canvas, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    /// Top-left corner
    pub min: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
}

impl CanvasRect {
    /// Bottom-right corner
    pub fn max(&self) -> [f32; 2] {
        [self.min[0] + self.size[0], self.min[1] + self.size[1]]
    }
}

/// Full testbed canvas rectangle
pub fn testbed_rect(testbed: &Testbed, cell_px: f32) -> CanvasRect {
    CanvasRect {
        min: [0.0, 0.0],
        size: [
            testbed.testbed_shape[0] as f32 * cell_px,
            testbed.testbed_shape[1] as f32 * cell_px,
        ],
    }
}

/// Device outline rectangle on the testbed canvas.
///
/// `device_rotation` is not consulted; the field is reserved.
pub fn device_rect(device: &Device, cell_px: f32) -> CanvasRect {
    CanvasRect {
        min: [
            device.device_pos[0] as f32 * cell_px,
            device.device_pos[1] as f32 * cell_px,
        ],
        size: [
            device.device_shape[0] as f32 * cell_px,
            device.device_shape[1] as f32 * cell_px,
        ],
    }
}

/// Rectangle of one pin box: device offset + header offset + pin offset,
/// each scaled by the cell size
pub fn pin_rect(device: &Device, header: &Header, pin: &Pin, cell_px: f32) -> CanvasRect {
    CanvasRect {
        min: [
            (device.device_pos[0] + header.header_pos[0] + pin.pin_pos[0]) as f32 * cell_px,
            (device.device_pos[1] + header.header_pos[1] + pin.pin_pos[1]) as f32 * cell_px,
        ],
        size: [cell_px, cell_px],
    }
}

/// Wire anchor point of a pin: the center of its pin box.
///
/// Returns `None` when the reference does not resolve against the topology.
pub fn pin_anchor(testbed: &Testbed, pin: &PinRef, cell_px: f32) -> Option<[f32; 2]> {
    let device = testbed.device(pin.device_id)?;
    let header = device.header(&pin.header_name)?;
    let p = header.pin(pin.pin_no)?;
    let rect = pin_rect(device, header, p, cell_px);
    Some([
        rect.min[0] + cell_px / 2.0,
        rect.min[1] + cell_px / 2.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Testbed;

    fn testbed() -> Testbed {
        Testbed::from_value(serde_json::json!({
            "testbed_id": 0,
            "testbed_name": "Bench",
            "testbed_shape": [100, 100],
            "devices": [
                {
                    "device_id": 0,
                    "device_name": "Board A",
                    "device_shape": [34, 22],
                    "device_pos": [5, 5],
                    "device_rotation": 0,
                    "pin_headers": [
                        {
                            "header_name": "GPIO",
                            "header_shape": [20, 2],
                            "header_pos": [3, 1],
                            "pins": [
                                {"pin_no": 1, "pin_name": "3v3", "pin_pos": [0, 1], "available": true}
                            ]
                        }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn anchor_sums_offsets_and_centers() {
        let tb = testbed();
        // (5 + 3 + 0) * 8 + 4 = 68, (5 + 1 + 1) * 8 + 4 = 60
        let anchor = pin_anchor(&tb, &PinRef::new(0, "GPIO", 1), 8.0).unwrap();
        assert_eq!(anchor, [68.0, 60.0]);
    }

    #[test]
    fn anchor_is_deterministic() {
        let tb = testbed();
        let pin = PinRef::new(0, "GPIO", 1);
        assert_eq!(
            pin_anchor(&tb, &pin, 8.0).unwrap(),
            pin_anchor(&tb, &pin, 8.0).unwrap()
        );
    }

    #[test]
    fn unknown_pin_has_no_anchor() {
        let tb = testbed();
        assert!(pin_anchor(&tb, &PinRef::new(0, "GPIO", 2), 8.0).is_none());
    }

    #[test]
    fn rects_scale_with_cell_size() {
        let tb = testbed();
        let dev = tb.device(0).unwrap();
        let rect = device_rect(dev, 10.0);
        assert_eq!(rect.min, [50.0, 50.0]);
        assert_eq!(rect.size, [340.0, 220.0]);
        assert_eq!(rect.max(), [390.0, 270.0]);
    }
}
