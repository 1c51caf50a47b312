//! Hover tooltip showing the name of the feature under the pointer.

use map_interaction::TooltipState;

/// Draws a [`TooltipState`] above its anchor pixel on the map.
#[derive(Debug, Default)]
pub struct FeatureTooltip {
    pub state: TooltipState,
}

impl FeatureTooltip {
    /// Screen position of the tooltip anchor, if it should be drawn
    pub fn anchor(&self, map_rect: egui::Rect) -> Option<egui::Pos2> {
        if !self.state.visible {
            return None;
        }
        let pixel = self.state.position?;
        Some(map_rect.min + egui::vec2(pixel.x, pixel.y))
    }

    pub fn show(&self, ctx: &egui::Context, map_rect: egui::Rect) {
        let Some(anchor) = self.anchor(map_rect) else {
            return;
        };
        let title = self.state.title.as_deref().unwrap_or_default();

        // Placed on top of the anchor, centred horizontally
        egui::Area::new(egui::Id::new("feature_tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(anchor)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(title);
                });
            });
    }
}
