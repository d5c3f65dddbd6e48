// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire editor rendering with egui.
//!
//! Features:
//! - Testbed, device, and pin rendering from the topology
//! - Committed wires with a destination arrow marker
//! - Live rubber-band wire while a source pin is pending
//! - Hover highlight and status label
//!
//! The adapter owns no wiring semantics: it builds a per-frame side table
//! from pin rectangles to [`PinRef`]s, translates pointer input into
//! [`WiringEvent`]s, and applies the returned [`DrawCommand`]s to a retained
//! wire store.

use crate::connection::WireId;
use crate::controller::{DrawCommand, WiringController, WiringEvent};
use crate::geometry::{self, CanvasRect};
use crate::topology::{PinRef, Testbed};
use egui::{Align2, Color32, Pos2, Rect, Sense, Stroke, Vec2};
use indexmap::IndexMap;
use std::collections::HashSet;

const COLOR_CANVAS: Color32 = Color32::WHITE;
const COLOR_OUTLINE: Color32 = Color32::BLACK;
const COLOR_PIN_DEFAULT: Color32 = Color32::WHITE;
const COLOR_PIN_UNAVAILABLE: Color32 = Color32::from_rgb(190, 190, 190);
const COLOR_PIN_HOVER: Color32 = Color32::BLACK;
const COLOR_WIRE: Color32 = Color32::from_rgb(0, 0, 255);

const TESTBED_STROKE: f32 = 2.0;
const DEVICE_STROKE: f32 = 1.0;
const PIN_STROKE: f32 = 1.0;
const WIRE_STROKE: f32 = 1.0;

const ARROW_LENGTH: f32 = 8.0;
const ARROW_HALF_WIDTH: f32 = 4.0;

/// A retained line primitive behind a [`WireId`] handle
#[derive(Debug, Clone, Copy)]
struct WireSegment {
    from: [f32; 2],
    to: [f32; 2],
    committed: bool,
}

/// Wire editor UI state: the session controller plus retained visuals
pub struct WireEditorState {
    controller: WiringController,
    wires: IndexMap<WireId, WireSegment>,
    highlighted: HashSet<PinRef>,
    hovered: Option<PinRef>,
    last_cursor: Option<Pos2>,
    status: Option<String>,
}

impl WireEditorState {
    /// Create an editor over a session controller
    pub fn new(controller: WiringController) -> Self {
        Self {
            controller,
            wires: IndexMap::new(),
            highlighted: HashSet::new(),
            hovered: None,
            last_cursor: None,
            status: None,
        }
    }

    /// The session controller
    pub fn controller(&self) -> &WiringController {
        &self.controller
    }

    /// Apply draw commands to the retained store, e.g. the redraw batch
    /// after restoring a saved document
    pub fn apply_commands(&mut self, commands: Vec<DrawCommand>) {
        for command in commands {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::SpawnLiveWire { wire, from, to } => {
                self.wires.insert(
                    wire,
                    WireSegment {
                        from,
                        to,
                        committed: false,
                    },
                );
            }
            DrawCommand::UpdateLiveWire { wire, to } => {
                if let Some(segment) = self.wires.get_mut(&wire) {
                    segment.to = to;
                }
            }
            DrawCommand::DropWire(wire) => {
                self.wires.shift_remove(&wire);
            }
            DrawCommand::AttachWire { wire, from, to } => {
                self.wires.insert(
                    wire,
                    WireSegment {
                        from,
                        to,
                        committed: true,
                    },
                );
            }
            DrawCommand::HighlightPin(pin) => {
                self.highlighted.insert(pin);
            }
            DrawCommand::RestorePin(pin) => {
                self.highlighted.remove(&pin);
            }
            DrawCommand::SetStatusLabel(text) => self.status = Some(text),
            DrawCommand::ClearStatusLabel => self.status = None,
        }
    }

    /// Render the editor and feed pointer input through the controller
    pub fn ui(&mut self, ui: &mut egui::Ui, testbed: &Testbed) {
        let cell = self.controller.cell_px();
        let canvas = geometry::testbed_rect(testbed, cell);
        let desired = Vec2::new(canvas.size[0], canvas.size[1]);
        let (rect, response) = ui.allocate_exact_size(desired, Sense::click());
        let origin = rect.min;
        let painter = ui.painter_at(rect);

        // Side table: pin rectangle -> identity, rebuilt per frame
        let mut pin_table: Vec<(Rect, PinRef, bool)> = Vec::new();
        for device in &testbed.devices {
            for header in &device.pin_headers {
                for pin in &header.pins {
                    let r = to_screen(geometry::pin_rect(device, header, pin, cell), origin);
                    pin_table.push((
                        r,
                        PinRef::new(device.device_id, header.header_name.clone(), pin.pin_no),
                        pin.available,
                    ));
                }
            }
        }

        self.pointer_events(testbed, &response, origin, &pin_table);
        self.draw(testbed, &painter, origin, &pin_table, cell);
    }

    fn pointer_events(
        &mut self,
        testbed: &Testbed,
        response: &egui::Response,
        origin: Pos2,
        pin_table: &[(Rect, PinRef, bool)],
    ) {
        let pointer = response.hover_pos();

        if let Some(pos) = pointer {
            if self.last_cursor != Some(pos) {
                self.last_cursor = Some(pos);
                let local = pos - origin;
                let commands = self
                    .controller
                    .handle(testbed, WiringEvent::CursorMoved([local.x, local.y]));
                self.apply_commands(commands);
            }
        }

        // Hover transitions
        let now_hovered = pointer.and_then(|pos| {
            pin_table
                .iter()
                .find(|(r, _, _)| r.contains(pos))
                .map(|(_, pin, _)| pin.clone())
        });
        if now_hovered != self.hovered {
            if let Some(old) = self.hovered.take() {
                let commands = self.controller.handle(testbed, WiringEvent::PinLeft(old));
                self.apply_commands(commands);
            }
            if let Some(new) = now_hovered.clone() {
                let commands = self
                    .controller
                    .handle(testbed, WiringEvent::PinEntered(new));
                self.apply_commands(commands);
            }
            self.hovered = now_hovered;
        }

        if response.clicked() {
            let event = match &self.hovered {
                Some(pin) => WiringEvent::PinClicked(pin.clone()),
                None => WiringEvent::CanvasClicked,
            };
            let commands = self.controller.handle(testbed, event);
            self.apply_commands(commands);
        }
    }

    fn draw(
        &self,
        testbed: &Testbed,
        painter: &egui::Painter,
        origin: Pos2,
        pin_table: &[(Rect, PinRef, bool)],
        cell: f32,
    ) {
        let canvas = to_screen(geometry::testbed_rect(testbed, cell), origin);
        painter.rect_filled(canvas, 0.0, COLOR_CANVAS);
        painter.rect_stroke(canvas, 0.0, Stroke::new(TESTBED_STROKE, COLOR_OUTLINE));

        for device in &testbed.devices {
            let r = to_screen(geometry::device_rect(device, cell), origin);
            painter.rect_stroke(r, 0.0, Stroke::new(DEVICE_STROKE, COLOR_OUTLINE));
            painter.text(
                r.left_top() + Vec2::new(4.0, 2.0),
                Align2::LEFT_TOP,
                &device.device_name,
                egui::FontId::proportional(11.0),
                COLOR_OUTLINE,
            );
        }

        for (r, pin, available) in pin_table {
            let fill = if self.highlighted.contains(pin) {
                COLOR_PIN_HOVER
            } else if *available {
                COLOR_PIN_DEFAULT
            } else {
                COLOR_PIN_UNAVAILABLE
            };
            painter.rect_filled(*r, 0.0, fill);
            painter.rect_stroke(*r, 0.0, Stroke::new(PIN_STROKE, COLOR_OUTLINE));
        }

        for segment in self.wires.values() {
            let from = origin + Vec2::new(segment.from[0], segment.from[1]);
            let to = origin + Vec2::new(segment.to[0], segment.to[1]);
            painter.line_segment([from, to], Stroke::new(WIRE_STROKE, COLOR_WIRE));
            if segment.committed {
                draw_arrow(painter, from, to);
            }
        }

        if let Some(status) = &self.status {
            painter.text(
                origin + Vec2::new(cell, 2.0 * cell),
                Align2::LEFT_TOP,
                status,
                egui::FontId::proportional(12.0),
                COLOR_OUTLINE,
            );
        }
    }
}

fn to_screen(rect: CanvasRect, origin: Pos2) -> Rect {
    Rect::from_min_size(
        origin + Vec2::new(rect.min[0], rect.min[1]),
        Vec2::new(rect.size[0], rect.size[1]),
    )
}

/// Arrow marker at the destination end, oriented along the wire
fn draw_arrow(painter: &egui::Painter, from: Pos2, to: Pos2) {
    let dir = to - from;
    let len = dir.length();
    if len <= f32::EPSILON {
        return;
    }
    let dir = dir / len;
    let perp = Vec2::new(-dir.y, dir.x);
    let base = to - dir * ARROW_LENGTH;
    painter.add(egui::Shape::convex_polygon(
        vec![to, base + perp * ARROW_HALF_WIDTH, base - perp * ARROW_HALF_WIDTH],
        COLOR_WIRE,
        Stroke::NONE,
    ));
}
