// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Map widget: base tiles, the KML vector layer and pointer handling.
//!
//! The widget draws one frame of the [`MapScene`] and turns pointer input
//! into pan/zoom changes and [`MapEvent`]s for the dispatcher.

use crate::tiles::{self, TileManager};
use map_interaction::projection::Coordinate;
use map_interaction::style::{Rgba, Style};
use map_interaction::{Feature, Geometry, MapEvent, MapScene, Pixel, VectorLayer, Viewport};

/// Zoom levels per point of scroll
const SCROLL_ZOOM_RATE: f64 = 1.0 / 200.0;

/// Line width for LineString and polygon outlines
const LINE_WIDTH: f32 = 2.0;

/// What one frame of the map produced
#[derive(Debug)]
pub struct MapOutput {
    pub events: Vec<MapEvent>,
    pub hovered: bool,
    pub rect: egui::Rect,
}

#[derive(Debug)]
pub struct MapView {
    scene: MapScene,
    tile_manager: TileManager,
    attribution: String,
    tile_status: Option<String>,
    last_pointer: Option<Pixel>,
}

impl MapView {
    pub fn new(scene: MapScene, tile_manager: TileManager, attribution: String) -> Self {
        Self {
            scene,
            tile_manager,
            attribution,
            tile_status: None,
            last_pointer: None,
        }
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    pub fn layer(&self) -> &VectorLayer {
        &self.scene.layer
    }

    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.scene.layer.set_features(features);
    }

    /// Draw the map and collect this frame's pointer events.
    ///
    /// `notice` is an extra banner message and whether it is an error.
    pub fn show(&mut self, ui: &mut egui::Ui, notice: Option<(String, bool)>) -> MapOutput {
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        self.scene.viewport.set_size(rect.width(), rect.height());

        // Background shows through while tiles load
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(200, 220, 240));

        if response.dragged() {
            let delta = response.drag_delta();
            self.scene.viewport.pan_by(delta.x, delta.y);
        }

        if let Some(pos) = response.hover_pos() {
            let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
            let delta = zoom_change(scroll, pinch);
            if delta != 0.0 {
                self.scene.viewport.zoom_around(to_pixel(rect, pos), delta);
            }
        }

        let tiles_rendered = self.draw_tiles(ui.ctx(), &painter, rect);
        self.tile_status = tile_status(
            self.tile_manager.get_error_count(),
            self.tile_manager.has_loading_tiles(),
            tiles_rendered,
            self.tile_status.take(),
        );

        self.draw_features(&painter, rect);
        self.draw_overlay(&painter, rect, notice);

        let mut events = Vec::new();
        match response.hover_pos() {
            Some(pos) => {
                let pixel = to_pixel(rect, pos);
                let dragging = response.dragged();
                if dragging || self.last_pointer != Some(pixel) {
                    events.push(MapEvent::PointerMove { pixel, dragging });
                    self.last_pointer = Some(pixel);
                }
            }
            None => self.last_pointer = None,
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(MapEvent::Click {
                    pixel: to_pixel(rect, pos),
                });
            }
        }

        MapOutput {
            events,
            hovered: response.hovered() || response.dragged(),
            rect,
        }
    }

    fn draw_tiles(&self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect) -> usize {
        let mut rendered = 0;
        for tile in tiles::visible_tiles(&self.scene.viewport) {
            if let Some(texture) = self.tile_manager.get_tile(tile.coord, ctx) {
                let tile_rect = egui::Rect::from_min_size(
                    rect.min + egui::vec2(tile.min.x, tile.min.y),
                    egui::vec2(tile.size, tile.size),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                rendered += 1;
            }
        }
        rendered
    }

    fn draw_features(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        let viewport = &self.scene.viewport;
        let world_width = viewport.world_width();
        let copies = viewport.world_copies();
        for (feature, style) in self.scene.layer.styled_features() {
            for copy in copies.clone() {
                let shifted = rect.translate(egui::vec2(copy as f32 * world_width, 0.0));
                draw_geometry(painter, shifted, viewport, feature.geometry(), &style);
            }
        }
    }

    fn draw_overlay(&self, painter: &egui::Painter, rect: egui::Rect, notice: Option<(String, bool)>) {
        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            "Drag to pan | Scroll to zoom | Click a marker for details",
            egui::FontId::proportional(12.0),
            egui::Color32::BLACK,
        );

        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            egui::Align2::RIGHT_BOTTOM,
            &self.attribution,
            egui::FontId::proportional(10.0),
            egui::Color32::from_black_alpha(180),
        );

        let banner = notice.or_else(|| {
            self.tile_status
                .clone()
                .map(|msg| (msg, self.tile_manager.get_error_count() > 0))
        });
        if let Some((message, is_error)) = banner {
            draw_banner(painter, rect, &message, is_error);
        }
    }
}

fn to_pixel(rect: egui::Rect, pos: egui::Pos2) -> Pixel {
    let local = pos - rect.min;
    Pixel::new(local.x, local.y)
}

fn to_screen(rect: egui::Rect, viewport: &Viewport, coord: Coordinate) -> egui::Pos2 {
    let pixel = viewport.to_pixel(coord);
    rect.min + egui::vec2(pixel.x, pixel.y)
}

fn color(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.alpha_u8())
}

/// Zoom change in levels from scroll distance and pinch factor
fn zoom_change(scroll: f32, pinch: f32) -> f64 {
    let mut delta = f64::from(scroll) * SCROLL_ZOOM_RATE;
    if (pinch - 1.0).abs() > 0.001 {
        delta += f64::from(pinch.log2());
    }
    delta
}

/// Banner text for tile loading, keeping the previous message until tiles appear
fn tile_status(errors: usize, loading: bool, rendered: usize, previous: Option<String>) -> Option<String> {
    if errors > 0 {
        Some(format!("Failed to load {errors} tiles"))
    } else if loading {
        Some("Loading map tiles...".to_string())
    } else if rendered > 0 {
        None
    } else {
        previous
    }
}

fn draw_geometry(painter: &egui::Painter, rect: egui::Rect, viewport: &Viewport, geometry: &Geometry, style: &Style) {
    let marker = &style.image;
    match geometry {
        Geometry::Point(c) => {
            painter.circle(
                to_screen(rect, viewport, *c),
                marker.radius,
                color(marker.fill),
                egui::Stroke::new(marker.stroke.width, color(marker.stroke.color)),
            );
        }
        Geometry::LineString(line) => {
            let points = line.iter().map(|c| to_screen(rect, viewport, *c)).collect();
            painter.add(egui::Shape::line(points, egui::Stroke::new(LINE_WIDTH, color(marker.fill))));
        }
        Geometry::Polygon(rings) => {
            // Outlines only: egui fills convex shapes only and rings may be concave
            for ring in rings {
                let points = ring.iter().map(|c| to_screen(rect, viewport, *c)).collect();
                painter.add(egui::Shape::closed_line(
                    points,
                    egui::Stroke::new(LINE_WIDTH, color(marker.fill)),
                ));
            }
        }
        Geometry::Multi(parts) => {
            for part in parts {
                draw_geometry(painter, rect, viewport, part, style);
            }
        }
    }
}

fn draw_banner(painter: &egui::Painter, rect: egui::Rect, message: &str, is_error: bool) {
    let bg_color = if is_error {
        egui::Color32::from_rgb(220, 50, 50)
    } else {
        egui::Color32::from_rgb(255, 200, 100)
    };

    let pos = rect.center_top() + egui::vec2(0.0, 20.0);
    let galley = painter.layout_no_wrap(
        message.to_string(),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let padding = egui::vec2(12.0, 6.0);
    let bubble_rect = egui::Rect::from_center_size(pos, galley.size() + padding * 2.0);

    painter.rect_filled(bubble_rect, 5.0, bg_color);
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
}
