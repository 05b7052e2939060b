//! Compositing tiles into flat rasters, snapshots and canvas growth

use tracing::debug;

use super::{TileCoord, TiledSurface};
use crate::error::SurfaceError;
use crate::raster::Raster;

impl TiledSurface {
    /// Copy tile heads into `target` with the canvas origin at `(origin_x, origin_y)`
    ///
    /// With `only_dirty`, only dirty tiles are copied. Copied tiles are no
    /// longer dirty. Returns the number of tiles copied.
    pub fn draw_to(&mut self, target: &mut Raster, origin_x: i32, origin_y: i32, only_dirty: bool) -> usize {
        let mut drawn = 0;
        for tile in &self.tiles {
            if only_dirty && !self.dirty_tiles.contains(&tile.coord) {
                continue;
            }
            let raster = &tile.head().raster;
            let dst_x = tile.x as i64 + origin_x as i64;
            let dst_y = tile.y as i64 + origin_y as i64;
            // Clip against the target's top-left; the copy clips the rest.
            let src_x = (-dst_x).max(0);
            let src_y = (-dst_y).max(0);
            if src_x < raster.width as i64 && src_y < raster.height as i64 {
                target.copy_region_from(
                    raster,
                    src_x as u32,
                    src_y as u32,
                    raster.width,
                    raster.height,
                    dst_x.max(0).min(u32::MAX as i64) as u32,
                    dst_y.max(0).min(u32::MAX as i64) as u32,
                );
            }
            drawn += 1;
        }

        self.dirty_tiles.clear();
        debug!("draw_to: {} tiles at ({}, {}), only_dirty={}", drawn, origin_x, origin_y, only_dirty);
        drawn
    }

    /// Owned copy of the whole canvas, independent of dirty state
    pub fn to_bitmap(&self) -> Result<Raster, SurfaceError> {
        let mut bitmap = Raster::try_new(self.width, self.height)?;
        for tile in &self.tiles {
            let raster = &tile.head().raster;
            bitmap.copy_region_from(raster, 0, 0, raster.width, raster.height, tile.x, tile.y);
        }
        Ok(bitmap)
    }

    /// Straight-alpha export of the whole canvas
    pub fn to_image(&self) -> Result<image::RgbaImage, SurfaceError> {
        Ok(self.to_bitmap()?.to_image())
    }

    /// Grow to at least `width × height`, keeping the current content
    ///
    /// Never shrinks. History is not carried over. Returns whether the surface grew.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, SurfaceError> {
        let new_width = self.width.max(width);
        let new_height = self.height.max(height);
        if new_width == self.width && new_height == self.height {
            return Ok(false);
        }

        let snapshot = self.to_bitmap()?;
        let mut grown = Self::with_version(new_width, new_height, self.tile_size, self.max_versions, self.version)?;
        grown.draw_bitmap(&snapshot, 0, 0);
        grown.mark_all_dirty();

        debug!(
            "TiledSurface::resize: {}x{} -> {}x{}",
            self.width, self.height, new_width, new_height
        );
        *self = grown;
        Ok(true)
    }

    /// Pixel bounding box `(x, y, w, h)` of the given tiles
    pub fn compute_tiles_bounding_box(&self, tiles: &[TileCoord]) -> Option<(u32, u32, u32, u32)> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        for tile in tiles {
            let (x, y, w, h) = self.get_tile_bounds(*tile);
            if w == 0 || h == 0 {
                continue;
            }
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x + w);
            max_y = max_y.max(y + h);
        }

        (max_x > min_x && max_y > min_y).then(|| (min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

#[cfg(test)]
mod tests {
    use slate_config::SurfaceConfig;

    use super::*;
    use crate::types::{BlendMode, Paint};

    fn surface(width: u32, height: u32) -> TiledSurface {
        let config = SurfaceConfig {
            tile_size: 64,
            ..Default::default()
        };
        TiledSurface::new(width, height, &config).unwrap()
    }

    fn red() -> Paint {
        Paint::new([1.0, 0.0, 0.0, 1.0], 1.0, BlendMode::Normal)
    }

    #[test]
    fn test_to_bitmap_matches_pixels() {
        let mut surface = surface(150, 100);
        surface.fill_circle(100.0, 70.0, 8.0, &red());

        let bitmap = surface.to_bitmap().unwrap();
        assert_eq!((bitmap.width, bitmap.height), (150, 100));
        for (x, y) in [(100, 70), (0, 0), (149, 99), (92, 70)] {
            assert_eq!(bitmap.get_pixel(x, y), surface.get_pixel(x, y));
        }
        // snapshot does not consume dirty state
        assert!(surface.has_dirty_tiles());
    }

    #[test]
    fn test_draw_to_clears_dirty() {
        let mut surface = surface(128, 128);
        surface.fill_circle(20.0, 20.0, 4.0, &red());
        let mut target = Raster::try_new(128, 128).unwrap();

        assert_eq!(surface.draw_to(&mut target, 0, 0, true), 1);
        assert!(!surface.has_dirty_tiles());
        assert_eq!(target.get_pixel(20, 20), Some([255, 0, 0, 255]));

        // nothing left to draw
        assert_eq!(surface.draw_to(&mut target, 0, 0, true), 0);
    }

    #[test]
    fn test_draw_to_only_dirty_leaves_other_tiles() {
        let mut surface = surface(128, 128);
        surface.fill_circle(100.0, 100.0, 4.0, &red());
        let mut target = Raster::try_new(128, 128).unwrap();
        target.clear([1, 1, 1, 255]);

        surface.draw_to(&mut target, 0, 0, true);
        assert_eq!(target.get_pixel(10, 10), Some([1, 1, 1, 255]));
        assert_eq!(target.get_pixel(70, 70), Some([0, 0, 0, 0]));

        assert_eq!(surface.draw_to(&mut target, 0, 0, false), 4);
        assert_eq!(target.get_pixel(10, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_to_with_offset() {
        let mut surface = surface(128, 128);
        surface.fill_circle(20.0, 20.0, 4.0, &red());
        let mut target = Raster::try_new(64, 64).unwrap();

        surface.draw_to(&mut target, -10, 5, false);
        assert_eq!(target.get_pixel(10, 25), Some([255, 0, 0, 255]));
        assert_eq!(target.get_pixel(20, 20), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_resize_grows_only() {
        let mut surface = surface(100, 100);
        surface.fill_circle(50.0, 50.0, 5.0, &red());
        surface.commit();
        surface.commit();

        assert!(!surface.resize(80, 100).unwrap());
        assert_eq!((surface.width(), surface.height()), (100, 100));

        assert!(surface.resize(80, 200).unwrap());
        assert_eq!((surface.width(), surface.height()), (100, 200));
        assert_eq!(surface.get_pixel(50, 50), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(50, 150), Some([0, 0, 0, 0]));
        assert_eq!(surface.version(), 2);
        assert_eq!(surface.dirty_tile_count(), (surface.tiles_x() * surface.tiles_y()) as usize);
    }

    #[test]
    fn test_resize_drops_history() {
        let mut surface = surface(100, 100);
        surface.commit();
        surface.fill_circle(50.0, 50.0, 5.0, &red());
        surface.resize(200, 200).unwrap();

        assert_eq!(surface.tile_version_count(TileCoord { x: 0, y: 0 }), Some(1));
        surface.step(-1);
        // the resized content is the oldest version and survives undo
        assert_eq!(surface.get_pixel(50, 50), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_snapshot_moves_to_another_thread() {
        let mut surface = surface(64, 64);
        surface.fill_circle(10.0, 10.0, 3.0, &red());
        let snapshot = surface.to_bitmap().unwrap();

        let handle = std::thread::spawn(move || snapshot.to_image().get_pixel(10, 10).0);
        assert_eq!(handle.join().unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_tiles_bounding_box() {
        let surface = surface(150, 150);
        assert_eq!(surface.compute_tiles_bounding_box(&[]), None);
        assert_eq!(
            surface.compute_tiles_bounding_box(&[TileCoord { x: 0, y: 0 }, TileCoord { x: 2, y: 1 }]),
            Some((0, 0, 150, 128))
        );
    }
}
