// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor window.

use crate::session::WireSession;
use crate::upload::UploadStatus;

/// The WireBench application: a toolbar plus the wire editor canvas
pub struct WireBenchApp {
    session: WireSession,
}

impl WireBenchApp {
    /// Wrap a started session
    pub fn new(session: WireSession) -> Self {
        Self { session }
    }
}

impl eframe::App for WireBenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.poll_uploads();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&self.session.testbed.testbed_name);
                ui.separator();

                if ui.button("Save").clicked() {
                    self.session.submit();
                }

                ui.label(format!(
                    "{} connection(s)",
                    self.session.editor.controller().connections().len()
                ));

                if !self.session.restore_skipped.is_empty() {
                    ui.colored_label(
                        egui::Color32::DARK_RED,
                        format!(
                            "{} saved connection(s) skipped",
                            self.session.restore_skipped.len()
                        ),
                    );
                }

                match &self.session.last_upload {
                    Some(UploadStatus::Accepted) => {
                        ui.colored_label(egui::Color32::DARK_GREEN, "saved");
                    }
                    Some(UploadStatus::Failed(reason)) => {
                        ui.colored_label(egui::Color32::DARK_RED, format!("save failed: {reason}"));
                    }
                    None => {}
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.session.editor.ui(ui, &self.session.testbed);
            });
        });
    }
}
