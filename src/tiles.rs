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

//! Raster base layer: tile addressing, disk cache and background downloads.

use egui::{ColorImage, TextureHandle};
use log::{debug, info, warn};
use map_interaction::projection::{Coordinate, HALF_WORLD};
use map_interaction::viewport::{MAX_ZOOM, MIN_ZOOM};
use map_interaction::{Pixel, Viewport};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

#[derive(Debug, Error)]
enum TileError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("cache IO failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Fill a `{z}/{x}/{y}` URL template
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// Cache filename based on hash of URL
fn cache_filename(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}.png", hasher.finalize())
}

/// A tile to draw: its address and screen placement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedTile {
    pub coord: TileCoord,
    pub min: Pixel,
    pub size: f32,
}

/// Tile zoom level used for a fractional view zoom
pub fn tile_zoom(view_zoom: f64) -> u8 {
    view_zoom.round().clamp(MIN_ZOOM, MAX_ZOOM) as u8
}

/// Get all tiles needed to cover the viewport
pub fn visible_tiles(viewport: &Viewport) -> Vec<PlacedTile> {
    let zoom = tile_zoom(viewport.zoom());
    let count = 1_i64 << zoom;
    let span = 2.0 * HALF_WORLD / count as f64;
    let size = (span / viewport.resolution()) as f32;

    let (width, height) = viewport.size();
    let top_left = viewport.to_coordinate(Pixel::new(0.0, 0.0));
    let bottom_right = viewport.to_coordinate(Pixel::new(width, height));

    let x0 = ((top_left.x + HALF_WORLD) / span).floor() as i64;
    let x1 = ((bottom_right.x + HALF_WORLD) / span).floor() as i64;
    let y0 = (((HALF_WORLD - top_left.y) / span).floor() as i64).max(0);
    let y1 = (((HALF_WORLD - bottom_right.y) / span).floor() as i64).min(count - 1);

    let mut tiles = Vec::new();
    for ty in y0..=y1 {
        for tx in x0..=x1 {
            // Wrap X coordinate (longitude wraps around)
            let wrapped_x = tx.rem_euclid(count);
            let origin = Coordinate::new(-HALF_WORLD + tx as f64 * span, HALF_WORLD - ty as f64 * span);
            tiles.push(PlacedTile {
                coord: TileCoord::new(wrapped_x as u32, ty as u32, zoom),
                min: viewport.to_pixel(origin),
                size,
            });
        }
    }
    tiles
}

/// Failed tiles are fetched again once this much time has passed
const RETRY_FAILED_AFTER: Duration = Duration::from_secs(30);

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed(Instant),
}

fn retry_due(failed_at: Instant, now: Instant) -> bool {
    now.saturating_duration_since(failed_at) >= RETRY_FAILED_AFTER
}

/// Cache expiry for a configured number of days, saturating for huge values
fn cache_max_age(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(24 * 60 * 60))
}

type TileMap = Arc<Mutex<HashMap<TileCoord, TileState>>>;

pub struct TileManager {
    url_template: String,
    cache_dir: PathBuf,
    tiles: TileMap,
    download_queue: Arc<Mutex<HashSet<TileCoord>>>,
}

impl std::fmt::Debug for TileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileManager")
            .field("url_template", &self.url_template)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl TileManager {
    pub fn new(url_template: String, max_age_days: u64) -> Self {
        let cache_dir = Self::get_cache_dir();

        // Create cache directory if it doesn't exist
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory {}: {}", cache_dir.display(), e);
        }

        Self::cleanup_old_tiles(&cache_dir, cache_max_age(max_age_days));

        Self {
            url_template,
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            download_queue: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("kmlmap-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path, max_age: Duration) {
        let now = SystemTime::now();
        let Ok(entries) = fs::read_dir(cache_dir) else {
            return;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired && fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Removed {} expired tiles from cache", removed);
        }
    }

    /// Get tile from memory or disk cache, or queue it for download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading) => None,
            Some(TileState::Failed(at)) if !retry_due(*at, Instant::now()) => None,
            Some(TileState::Failed(_)) | None => {
                let url = coord.url(&self.url_template);
                let cache_path = self.cache_dir.join(cache_filename(&url));

                if cache_path.exists() {
                    match fs::read(&cache_path)
                        .map_err(TileError::from)
                        .and_then(|bytes| decode_texture(&bytes, coord, ctx))
                    {
                        Ok(texture) => {
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            return Some(texture);
                        }
                        Err(e) => warn!("Failed to load cached tile {}: {}", cache_path.display(), e),
                    }
                }

                tiles.insert(coord, TileState::Loading);
                drop(tiles);
                self.queue_download(coord, url, cache_path, ctx.clone());
                None
            }
        }
    }

    fn queue_download(&self, coord: TileCoord, url: String, cache_path: PathBuf, ctx: egui::Context) {
        let mut queue = self.download_queue.lock().unwrap_or_else(PoisonError::into_inner);
        if !queue.insert(coord) {
            return;
        }

        let tiles = Arc::clone(&self.tiles);
        let queue_handle = Arc::clone(&self.download_queue);
        std::thread::spawn(move || {
            debug!("Downloading tile: {}", url);
            let state = match download_tile(&url, &cache_path, coord, &ctx) {
                Ok(texture) => TileState::Loaded(texture),
                Err(e) => {
                    warn!("Failed to fetch tile {}: {}", url, e);
                    TileState::Failed(Instant::now())
                }
            };
            tiles
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(coord, state);
            queue_handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&coord);
            ctx.request_repaint();
        });
    }

    pub fn has_loading_tiles(&self) -> bool {
        let tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        tiles.values().any(|state| matches!(state, TileState::Loading))
    }

    pub fn get_error_count(&self) -> usize {
        let tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        tiles.values().filter(|state| matches!(state, TileState::Failed(_))).count()
    }
}

fn download_tile(
    url: &str,
    cache_path: &Path,
    coord: TileCoord,
    ctx: &egui::Context,
) -> Result<TextureHandle, TileError> {
    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(TileError::Status(response.status()));
    }
    let bytes = response.bytes()?;

    // A failed cache write only costs a re-download later
    if let Err(e) = fs::write(cache_path, &bytes) {
        warn!("Failed to save tile to cache: {}", e);
    }

    decode_texture(&bytes, coord, ctx)
}

fn decode_texture(bytes: &[u8], coord: TileCoord, ctx: &egui::Context) -> Result<TextureHandle, TileError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw());

    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
        color_image,
        egui::TextureOptions::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_interaction::viewport::TILE_SIZE;

    #[test]
    fn test_url_template() {
        let coord = TileCoord::new(3, 5, 4);
        assert_eq!(
            coord.url("https://tiles.example/stamen_toner/{z}/{x}/{y}.png"),
            "https://tiles.example/stamen_toner/4/3/5.png"
        );
    }

    #[test]
    fn test_cache_filename_is_stable_hash() {
        let a = cache_filename("https://tiles.example/1/0/0.png");
        assert_eq!(a, cache_filename("https://tiles.example/1/0/0.png"));
        assert_ne!(a, cache_filename("https://tiles.example/1/0/1.png"));
        assert_eq!(a.len(), 64 + ".png".len());
    }

    #[test]
    fn test_cache_max_age_saturates() {
        assert_eq!(cache_max_age(7), Duration::from_secs(7 * 86_400));
        assert_eq!(cache_max_age(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_failed_tiles_retry_after_delay() {
        let failed_at = Instant::now();
        assert!(!retry_due(failed_at, failed_at));
        assert!(!retry_due(failed_at, failed_at + Duration::from_secs(5)));
        assert!(retry_due(failed_at, failed_at + RETRY_FAILED_AFTER));
    }

    #[test]
    fn test_initial_view_covers_world() {
        let mut viewport = Viewport::new(Coordinate::new(0.0, 0.0), 2.0);
        viewport.set_size(800.0, 600.0);

        let tiles = visible_tiles(&viewport);
        assert_eq!(tiles.len(), 16);
        assert!(tiles.iter().all(|t| (t.size - TILE_SIZE as f32).abs() < 1e-3));

        let top_left = tiles
            .iter()
            .find(|t| t.coord == TileCoord::new(0, 0, 2))
            .unwrap();
        assert!((top_left.min.x - (400.0 - 512.0)).abs() < 1e-3);
        assert!((top_left.min.y - (300.0 - 512.0)).abs() < 1e-3);
    }

    #[test]
    fn test_tiles_wrap_horizontally() {
        let mut viewport = Viewport::new(Coordinate::new(HALF_WORLD, 0.0), 1.0);
        viewport.set_size(600.0, 200.0);

        let tiles = visible_tiles(&viewport);
        assert!(tiles.iter().all(|t| t.coord.x < 2));
        assert!(tiles.iter().any(|t| t.coord.x == 0 && t.min.x >= 300.0 - 1e-3));
    }

    #[test]
    fn test_fractional_zoom_scales_tiles() {
        let mut viewport = Viewport::new(Coordinate::new(0.0, 0.0), 2.4);
        viewport.set_size(400.0, 400.0);
        let tiles = visible_tiles(&viewport);
        assert_eq!(tiles[0].coord.zoom, 2);
        assert!(tiles[0].size > TILE_SIZE as f32);
    }
}
