//! Modal dialog with the details of a clicked feature.

use log::warn;
use map_interaction::{Inline, ModalState};

/// Draws a [`ModalState`] as an egui modal and opens clicked links.
#[derive(Debug, Default)]
pub struct DetailsWindow {
    pub state: ModalState,
}

impl DetailsWindow {
    /// Show the dialog if open. Returns the href of a clicked link.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<String> {
        if !self.state.open {
            return None;
        }

        let mut clicked = None;
        let mut close = false;
        let response = egui::Modal::new(egui::Id::new("feature_details")).show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.heading(&self.state.header);
            ui.separator();

            for line in self.state.body.lines() {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for inline in line {
                        match inline {
                            Inline::Text(text) => {
                                ui.label(text);
                            }
                            Inline::Link { href, label, .. } => {
                                if ui.link(label).on_hover_text(href).clicked() {
                                    clicked = Some(href.clone());
                                }
                            }
                            Inline::Break => {}
                        }
                    }
                });
            }

            ui.separator();
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

        if close || response.should_close() {
            self.state.close();
        }
        clicked
    }
}

/// Hand a link to the system browser or URI handler
pub fn open_link(href: &str) {
    if let Err(e) = webbrowser::open(href) {
        warn!("Failed to open {}: {}", href, e);
    }
}
