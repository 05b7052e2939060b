//! Drawing primitives fanned out over tiles

use tracing::{trace, warn};

use super::TiledSurface;
use crate::constants::STAMP_PADDING;
use crate::raster::Raster;
use crate::sprite::Sprite;
use crate::types::{BlendMode, DirtyRect, Paint};

impl TiledSurface {
    /// Visit every pixel of `bounds` on the tiles it covers, drawing on each
    /// tile's head at the current version. Touched tiles are marked dirty.
    ///
    /// `apply` receives the tile raster, tile-local coordinates and canvas coordinates.
    fn for_each_tile_pixel(
        &mut self,
        bounds: (u32, u32, u32, u32),
        mut apply: impl FnMut(&mut Raster, u32, u32, u32, u32),
    ) {
        let (x, y, w, h) = bounds;
        if w == 0 || h == 0 {
            return;
        }
        let (tx0, ty0, tx1, ty1) = self.tile_range(bounds);
        let (x_end, y_end) = ((x + w).min(self.width), (y + h).min(self.height));
        let version = self.version;
        let max_versions = self.max_versions;
        let tiles_x = self.tiles_x;
        let snapshot = self.snapshot_tile;

        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                let Some(tile) = self.tiles.get_mut((ty * tiles_x + tx) as usize) else {
                    continue;
                };
                let (origin_x, origin_y) = (tile.x, tile.y);
                if let Err(e) = tile.begin_version(version, max_versions, snapshot) {
                    warn!("Tile {:?}: undo snapshot for version {} failed: {}", tile.coord, version, e);
                    self.lost_undo_tiles.insert(tile.coord);
                }
                let raster = tile.head_mut();

                let px0 = x.max(origin_x);
                let py0 = y.max(origin_y);
                let px1 = x_end.min(origin_x + raster.width);
                let py1 = y_end.min(origin_y + raster.height);
                for py in py0..py1 {
                    for px in px0..px1 {
                        apply(raster, px - origin_x, py - origin_y, px, py);
                    }
                }
                self.dirty_tiles.insert(tile.coord);
            }
        }
    }

    /// Fill a hard-edged circle; returns the padded pixel bounds that were touched
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) -> Option<(u32, u32, u32, u32)> {
        if radius.is_nan() || radius <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return None;
        }
        let bounds = DirtyRect::around(cx, cy, radius).to_pixel_bounds(STAMP_PADDING, self.width, self.height)?;
        trace!(
            "fill_circle: center=({:.1}, {:.1}), radius={:.2}, mode={:?}",
            cx, cy, radius, paint.blend_mode
        );

        let r_sq = radius * radius;
        self.for_each_tile_pixel(bounds, |raster, lx, ly, px, py| {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r_sq {
                raster.blend_pixel(lx, ly, paint, 1.0);
            }
        });
        Some(bounds)
    }

    /// Fill an axis-aligned rectangle (pixel centers inside `rect`)
    pub fn fill_rect(&mut self, rect: DirtyRect, paint: &Paint) -> Option<(u32, u32, u32, u32)> {
        let bounds = rect.to_pixel_bounds(STAMP_PADDING, self.width, self.height)?;
        self.for_each_tile_pixel(bounds, |raster, lx, ly, px, py| {
            if rect.contains(px as f32 + 0.5, py as f32 + 0.5) {
                raster.blend_pixel(lx, ly, paint, 1.0);
            }
        });
        Some(bounds)
    }

    /// Stretch a sprite's coverage over `dst` and composite `paint` through it
    pub fn draw_sprite(&mut self, sprite: &Sprite, dst: DirtyRect, paint: &Paint) -> Option<(u32, u32, u32, u32)> {
        if dst.is_empty() {
            return None;
        }
        let bounds = dst.to_pixel_bounds(STAMP_PADDING, self.width, self.height)?;
        let (w, h) = (dst.width(), dst.height());
        self.for_each_tile_pixel(bounds, |raster, lx, ly, px, py| {
            let s = (px as f32 + 0.5 - dst.left) / w;
            let t = (py as f32 + 0.5 - dst.top) / h;
            let coverage = sprite.sample(s, t);
            if coverage > 0.0 {
                raster.blend_pixel(lx, ly, paint, coverage);
            }
        });
        Some(bounds)
    }

    /// Source-over a premultiplied raster with its top-left at `(x, y)`
    pub fn draw_bitmap(&mut self, bitmap: &Raster, x: i32, y: i32) -> Option<(u32, u32, u32, u32)> {
        let left = x.max(0) as i64;
        let top = y.max(0) as i64;
        let right = (x as i64 + bitmap.width as i64).min(self.width as i64);
        let bottom = (y as i64 + bitmap.height as i64).min(self.height as i64);
        if left >= right || top >= bottom {
            return None;
        }
        let bounds = (left as u32, top as u32, (right - left) as u32, (bottom - top) as u32);
        self.for_each_tile_pixel(bounds, |raster, lx, ly, px, py| {
            let sx = (px as i64 - x as i64) as u32;
            let sy = (py as i64 - y as i64) as u32;
            if let Some(src) = bitmap.get_pixel(sx, sy) {
                raster.blend_premultiplied(lx, ly, src);
            }
        });
        Some(bounds)
    }

    /// Replace every pixel with `color` (straight RGBA in 0..1)
    pub fn fill(&mut self, color: [f32; 4]) {
        let paint = Paint::new(color, 1.0, BlendMode::Source);
        let bounds = (0, 0, self.width, self.height);
        self.for_each_tile_pixel(bounds, |raster, lx, ly, _, _| {
            raster.blend_pixel(lx, ly, &paint, 1.0);
        });
    }
}

#[cfg(test)]
mod tests {
    use slate_config::SurfaceConfig;

    use super::*;
    use crate::tiles::TileCoord;

    fn surface() -> TiledSurface {
        let config = SurfaceConfig {
            tile_size: 64,
            ..Default::default()
        };
        TiledSurface::new(256, 256, &config).unwrap()
    }

    fn red() -> Paint {
        Paint::new([1.0, 0.0, 0.0, 1.0], 1.0, BlendMode::Normal)
    }

    #[test]
    fn test_fill_circle() {
        let mut surface = surface();
        let bounds = surface.fill_circle(128.0, 128.0, 10.0, &red()).unwrap();
        assert_eq!(bounds, (117, 117, 22, 22));

        assert_eq!(surface.get_pixel(128, 128), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(128, 140), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_circle_outside_is_noop() {
        let mut surface = surface();
        assert!(surface.fill_circle(-100.0, -100.0, 10.0, &red()).is_none());
        assert!(surface.fill_circle(10.0, 10.0, 0.0, &red()).is_none());
        assert!(surface.fill_circle(f32::NAN, 10.0, 3.0, &red()).is_none());
        assert!(!surface.has_dirty_tiles());
    }

    #[test]
    fn test_fill_circle_erase() {
        let mut surface = surface();
        surface.fill([1.0, 0.0, 0.0, 1.0]);
        surface.fill_circle(128.0, 128.0, 10.0, &Paint::eraser());

        assert_eq!(surface.get_pixel(128, 128), Some([0, 0, 0, 0]));
        assert_eq!(surface.get_pixel(10, 10), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_reduced_density_builds_up() {
        let mut surface = surface();
        let felt = Paint::new([0.0, 0.0, 1.0, 1.0], 0x10 as f32 / 255.0, BlendMode::Normal);

        surface.fill_circle(50.0, 50.0, 5.0, &felt);
        let once = surface.get_pixel(50, 50).unwrap()[3];
        surface.fill_circle(50.0, 50.0, 5.0, &felt);
        let twice = surface.get_pixel(50, 50).unwrap()[3];

        assert!(once > 0 && once < 32);
        assert!(twice > once);
    }

    #[test]
    fn test_fill_rect_marks_tiles() {
        let mut surface = surface();
        surface.fill_rect(DirtyRect::new(10.0, 10.0, 100.0, 20.0), &red());

        let mut dirty = surface.take_dirty_tiles();
        dirty.sort();
        assert_eq!(dirty, vec![TileCoord { x: 0, y: 0 }, TileCoord { x: 1, y: 0 }]);
        assert_eq!(surface.get_pixel(99, 19), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(100, 19), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_sprite() {
        let mut surface = surface();
        let sprite = Sprite::airbrush();
        surface.draw_sprite(&sprite, DirtyRect::around(100.0, 100.0, 20.0), &red());

        let center = surface.get_pixel(100, 100).unwrap();
        let edge = surface.get_pixel(118, 100).unwrap();
        assert!(center[3] > 200);
        assert!(edge[3] < center[3]);
        assert_eq!(surface.get_pixel(125, 100), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_bitmap_clipped() {
        let mut surface = surface();
        let mut bitmap = Raster::try_new(20, 20).unwrap();
        bitmap.clear([0, 255, 0, 255]);

        let bounds = surface.draw_bitmap(&bitmap, -10, 250).unwrap();
        assert_eq!(bounds, (0, 250, 10, 6));
        assert_eq!(surface.get_pixel(0, 255), Some([0, 255, 0, 255]));
        assert_eq!(surface.get_pixel(10, 255), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_replaces() {
        let mut surface = surface();
        surface.fill_circle(30.0, 30.0, 5.0, &red());
        surface.fill([0.0, 0.0, 0.0, 0.0]);
        assert_eq!(surface.get_pixel(30, 30), Some([0, 0, 0, 0]));
        assert_eq!(surface.dirty_tile_count(), 16);
    }
}
