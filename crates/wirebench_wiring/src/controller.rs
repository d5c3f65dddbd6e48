// SPDX-License-Identifier: MIT OR Apache-2.0
//! The wiring interaction state machine.
//!
//! The controller is constructed per session and owns the pending-source
//! state and the session's [`ConnectionSet`]. It consumes pointer events and
//! emits [`DrawCommand`]s for the rendering adapter; it never touches a
//! rendering API itself, which keeps every transition testable headless.

use crate::connection::{ConnectionSet, WireId};
use crate::geometry;
use crate::topology::{PinRef, Testbed};

/// A pointer event translated by the rendering adapter
#[derive(Debug, Clone)]
pub enum WiringEvent {
    /// A pin was clicked
    PinClicked(PinRef),
    /// The canvas (or a device body) was clicked outside any pin
    CanvasClicked,
    /// The cursor moved to a new canvas position
    CursorMoved([f32; 2]),
    /// The pointer entered a pin box
    PinEntered(PinRef),
    /// The pointer left a pin box
    PinLeft(PinRef),
}

/// An instruction for the rendering adapter
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Create the live rubber-band line from a source anchor to the cursor
    SpawnLiveWire {
        /// Handle for the new line primitive
        wire: WireId,
        /// Source pin anchor
        from: [f32; 2],
        /// Current cursor position
        to: [f32; 2],
    },
    /// Re-plot the live line's free endpoint
    UpdateLiveWire {
        /// Handle of the live line
        wire: WireId,
        /// New cursor position
        to: [f32; 2],
    },
    /// Remove a line primitive (cancelled live wire or torn-down connection)
    DropWire(WireId),
    /// Anchor a line at both endpoints and mark the destination with an
    /// arrow; the live line with the same handle becomes permanent
    AttachWire {
        /// Handle of the line primitive
        wire: WireId,
        /// Source pin anchor
        from: [f32; 2],
        /// Destination pin anchor
        to: [f32; 2],
    },
    /// Recolor a pin with the hover fill
    HighlightPin(PinRef),
    /// Restore a pin's default fill
    RestorePin(PinRef),
    /// Show a pin description in the status label
    SetStatusLabel(String),
    /// Clear the status label
    ClearStatusLabel,
}

/// The transient Pending state: a source pin is selected and a live wire
/// tracks the cursor
#[derive(Debug, Clone)]
struct PendingWire {
    source: PinRef,
    anchor: [f32; 2],
    wire: WireId,
}

/// Drives pin click/hover events into connection mutations and draw
/// commands. One instance per editing session.
#[derive(Debug)]
pub struct WiringController {
    connections: ConnectionSet,
    pending: Option<PendingWire>,
    cursor: [f32; 2],
    cell_px: f32,
}

impl WiringController {
    /// Create a controller with an empty connection set
    pub fn new(cell_px: f32) -> Self {
        Self::with_connections(ConnectionSet::new(), cell_px)
    }

    /// Create a controller over a restored connection set
    pub fn with_connections(connections: ConnectionSet, cell_px: f32) -> Self {
        Self {
            connections,
            pending: None,
            cursor: [0.0, 0.0],
            cell_px,
        }
    }

    /// The session's connections
    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Whether a source pin is currently pending
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a pin is the pending source
    pub fn is_source(&self, pin: &PinRef) -> bool {
        self.pending.as_ref().is_some_and(|p| p.source == *pin)
    }

    /// Cell size used for anchor lookups
    pub fn cell_px(&self) -> f32 {
        self.cell_px
    }

    /// Commands that redraw every established connection, e.g. after a
    /// restore. Anchors are recomputed from the topology, so they match the
    /// ones the live path produced.
    pub fn redraw_commands(&self, testbed: &Testbed) -> Vec<DrawCommand> {
        self.connections
            .iter()
            .filter_map(|c| {
                let from = geometry::pin_anchor(testbed, &c.from, self.cell_px)?;
                let to = geometry::pin_anchor(testbed, &c.to, self.cell_px)?;
                Some(DrawCommand::AttachWire {
                    wire: c.wire,
                    from,
                    to,
                })
            })
            .collect()
    }

    /// Feed one event through the state machine
    pub fn handle(&mut self, testbed: &Testbed, event: WiringEvent) -> Vec<DrawCommand> {
        match event {
            WiringEvent::PinClicked(pin) => self.pin_clicked(testbed, pin),
            WiringEvent::CanvasClicked => self.cancel_pending(),
            WiringEvent::CursorMoved(pos) => self.cursor_moved(pos),
            WiringEvent::PinEntered(pin) => self.pin_entered(testbed, &pin),
            WiringEvent::PinLeft(pin) => {
                vec![DrawCommand::RestorePin(pin), DrawCommand::ClearStatusLabel]
            }
        }
    }

    fn pin_clicked(&mut self, testbed: &Testbed, pin: PinRef) -> Vec<DrawCommand> {
        match self.pending.take() {
            None => {
                // Disconnect gesture: clicking a connected pin tears down
                // its link instead of starting a new one
                if let Some(existing) = self.connections.find_by_endpoint(&pin) {
                    let id = existing.id;
                    let wire = existing.wire;
                    self.connections.remove(id);
                    return vec![DrawCommand::DropWire(wire)];
                }

                let Some(anchor) = geometry::pin_anchor(testbed, &pin, self.cell_px) else {
                    return Vec::new();
                };
                let wire = WireId::new();
                self.pending = Some(PendingWire {
                    source: pin,
                    anchor,
                    wire,
                });
                vec![DrawCommand::SpawnLiveWire {
                    wire,
                    from: anchor,
                    to: self.cursor,
                }]
            }
            Some(pending) => {
                // Busy destination, the source pin itself, or an
                // unresolvable pin all cancel without a net change
                let busy = pin == pending.source
                    || self.connections.find_by_endpoint(&pin).is_some();
                let Some(dest_anchor) = geometry::pin_anchor(testbed, &pin, self.cell_px) else {
                    return vec![DrawCommand::DropWire(pending.wire)];
                };
                if busy {
                    return vec![DrawCommand::DropWire(pending.wire)];
                }

                match self.connections.add(pending.source, pin, pending.wire) {
                    Ok(_) => vec![DrawCommand::AttachWire {
                        wire: pending.wire,
                        from: pending.anchor,
                        to: dest_anchor,
                    }],
                    // The busy check above already cancelled on any occupied
                    // endpoint, so add cannot fail here; dropping the line
                    // keeps the canvas consistent with the set either way
                    Err(_) => vec![DrawCommand::DropWire(pending.wire)],
                }
            }
        }
    }

    fn cancel_pending(&mut self) -> Vec<DrawCommand> {
        match self.pending.take() {
            Some(pending) => vec![DrawCommand::DropWire(pending.wire)],
            None => Vec::new(),
        }
    }

    fn cursor_moved(&mut self, pos: [f32; 2]) -> Vec<DrawCommand> {
        self.cursor = pos;
        match &self.pending {
            Some(pending) => vec![DrawCommand::UpdateLiveWire {
                wire: pending.wire,
                to: pos,
            }],
            None => Vec::new(),
        }
    }

    fn pin_entered(&self, testbed: &Testbed, pin: &PinRef) -> Vec<DrawCommand> {
        let Some(device) = testbed.device(pin.device_id) else {
            return Vec::new();
        };
        let Some(header) = device.header(&pin.header_name) else {
            return Vec::new();
        };
        let Some(p) = header.pin(pin.pin_no) else {
            return Vec::new();
        };

        let label = format!(
            "{} {} {}",
            device.device_name, header.header_name, p.pin_name
        );
        // Unavailable pins keep their fill but still describe themselves
        let mut cmds = Vec::with_capacity(2);
        if p.available {
            cmds.push(DrawCommand::HighlightPin(pin.clone()));
        }
        cmds.push(DrawCommand::SetStatusLabel(label));
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
                    "pin_headers": [{
                        "header_name": "GPIO",
                        "header_shape": [20, 2],
                        "header_pos": [3, 1],
                        "pins": [
                            {"pin_no": 1, "pin_name": "3v3", "pin_pos": [0, 1], "available": true},
                            {"pin_no": 2, "pin_name": "5v", "pin_pos": [0, 0], "available": true},
                            {"pin_no": 3, "pin_name": "BCM2", "pin_pos": [1, 1], "available": false}
                        ]
                    }]
                },
                {
                    "device_id": 1,
                    "device_name": "Board B",
                    "device_shape": [34, 22],
                    "device_pos": [5, 30],
                    "device_rotation": 0,
                    "pin_headers": [{
                        "header_name": "GPIO",
                        "header_shape": [20, 2],
                        "header_pos": [3, 1],
                        "pins": [
                            {"pin_no": 40, "pin_name": "BCM21", "pin_pos": [19, 0], "available": true}
                        ]
                    }]
                }
            ]
        }))
        .unwrap()
    }

    fn pin_a() -> PinRef {
        PinRef::new(0, "GPIO", 1)
    }

    fn pin_b() -> PinRef {
        PinRef::new(1, "GPIO", 40)
    }

    #[test]
    fn click_click_creates_connection() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);

        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        assert!(ctl.is_pending());
        assert!(matches!(cmds[0], DrawCommand::SpawnLiveWire { .. }));

        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));
        assert!(!ctl.is_pending());
        assert!(matches!(cmds[0], DrawCommand::AttachWire { .. }));

        let from_side = ctl.connections().find_by_endpoint(&pin_a()).unwrap();
        let to_side = ctl.connections().find_by_endpoint(&pin_b()).unwrap();
        assert_eq!(from_side.id, to_side.id);
    }

    #[test]
    fn live_wire_follows_cursor() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);

        // Idle cursor motion draws nothing
        assert!(ctl.handle(&tb, WiringEvent::CursorMoved([10.0, 10.0])).is_empty());

        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        let cmds = ctl.handle(&tb, WiringEvent::CursorMoved([50.0, 60.0]));
        assert_eq!(cmds.len(), 1);
        assert!(matches!(
            cmds[0],
            DrawCommand::UpdateLiveWire { to: [50.0, 60.0], .. }
        ));
        assert!(ctl.is_pending());
    }

    #[test]
    fn live_wire_anchors_at_source_pin() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::CursorMoved([30.0, 40.0]));

        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        // (5+3+0)*8+4 = 68, (5+1+1)*8+4 = 60
        assert!(matches!(
            cmds[0],
            DrawCommand::SpawnLiveWire {
                from: [68.0, 60.0],
                to: [30.0, 40.0],
                ..
            }
        ));
    }

    #[test]
    fn toggle_removes_connection() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));
        assert_eq!(ctl.connections().len(), 1);

        // Clicking either endpoint with no pending source tears it down
        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));
        assert!(matches!(cmds[0], DrawCommand::DropWire(_)));
        assert!(!ctl.is_pending());
        assert!(ctl.connections().is_empty());
        assert!(ctl.connections().find_by_endpoint(&pin_a()).is_none());
    }

    #[test]
    fn canvas_click_cancels_pending() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));

        let cmds = ctl.handle(&tb, WiringEvent::CanvasClicked);
        assert!(matches!(cmds[0], DrawCommand::DropWire(_)));
        assert!(!ctl.is_pending());
        assert!(ctl.connections().is_empty());

        // And in Idle it is a no-op
        assert!(ctl.handle(&tb, WiringEvent::CanvasClicked).is_empty());
    }

    #[test]
    fn clicking_source_pin_again_cancels() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));

        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        assert!(matches!(cmds[0], DrawCommand::DropWire(_)));
        assert!(!ctl.is_pending());
        assert!(ctl.connections().is_empty());
    }

    #[test]
    fn clicking_busy_pin_cancels_without_net_change() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));

        // Pin B is busy: pending from another pin must cancel, not rewire
        let free = PinRef::new(0, "GPIO", 2);
        ctl.handle(&tb, WiringEvent::PinClicked(free.clone()));
        let cmds = ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));
        assert!(matches!(cmds[0], DrawCommand::DropWire(_)));
        assert!(!ctl.is_pending());
        assert_eq!(ctl.connections().len(), 1);
        assert!(ctl.connections().find_by_endpoint(&free).is_none());
    }

    #[test]
    fn unavailable_pin_still_wires() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        let unavailable = PinRef::new(0, "GPIO", 3);

        ctl.handle(&tb, WiringEvent::PinClicked(unavailable.clone()));
        ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));
        assert!(ctl.connections().find_by_endpoint(&unavailable).is_some());
    }

    #[test]
    fn hover_highlights_only_available_pins() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);

        let cmds = ctl.handle(&tb, WiringEvent::PinEntered(pin_a()));
        assert_eq!(
            cmds,
            vec![
                DrawCommand::HighlightPin(pin_a()),
                DrawCommand::SetStatusLabel("Board A GPIO 3v3".into()),
            ]
        );

        let unavailable = PinRef::new(0, "GPIO", 3);
        let cmds = ctl.handle(&tb, WiringEvent::PinEntered(unavailable));
        assert_eq!(
            cmds,
            vec![DrawCommand::SetStatusLabel("Board A GPIO BCM2".into())]
        );

        let cmds = ctl.handle(&tb, WiringEvent::PinLeft(pin_a()));
        assert_eq!(
            cmds,
            vec![
                DrawCommand::RestorePin(pin_a()),
                DrawCommand::ClearStatusLabel,
            ]
        );
    }

    #[test]
    fn redraw_reconstructs_live_path_anchors() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        ctl.handle(&tb, WiringEvent::PinClicked(pin_a()));
        let attach = ctl.handle(&tb, WiringEvent::PinClicked(pin_b()));

        let redraw = ctl.redraw_commands(&tb);
        assert_eq!(redraw, attach);
    }

    // The controller cancels on any occupied endpoint before asking the set
    // to add, so `EndpointBusy` can never surface: every finalize over a
    // free, distinct destination must produce an `AttachWire`.
    #[test]
    fn busy_rejection_is_unreachable_from_clicks() {
        let tb = testbed();
        let mut ctl = WiringController::new(8.0);
        let pins = [
            pin_a(),
            PinRef::new(0, "GPIO", 2),
            PinRef::new(0, "GPIO", 3),
            pin_b(),
        ];

        // Deterministic pseudo-random click storm
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let roll = (state >> 33) as usize;
            let event = match roll % 6 {
                0 | 1 | 2 | 3 => WiringEvent::PinClicked(pins[roll % pins.len()].clone()),
                4 => WiringEvent::CanvasClicked,
                _ => WiringEvent::CursorMoved([(roll % 100) as f32, (roll % 77) as f32]),
            };

            let finalizing = ctl.is_pending()
                && matches!(&event, WiringEvent::PinClicked(p)
                    if ctl.connections().find_by_endpoint(p).is_none()
                        && !ctl.is_source(p));
            let cmds = ctl.handle(&tb, event);
            if finalizing {
                assert!(
                    cmds.iter().any(|c| matches!(c, DrawCommand::AttachWire { .. })),
                    "free destination must finalize, not cancel"
                );
            }

            // Each pin participates in at most one connection
            for pin in &pins {
                let hits = ctl.connections().iter().filter(|c| c.involves(pin)).count();
                assert!(hits <= 1, "pin {pin} in {hits} connections");
            }
        }
    }
}
