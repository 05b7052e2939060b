//! Surface operations for the drawing session

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::error::SurfaceError;
use crate::raster::Raster;
use crate::tiles::TileCoord;

use super::StrokeSession;

impl StrokeSession {
    /// Take dirty tiles for redraw; the dirty flags are cleared
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.surface.take_dirty_tiles()
    }

    pub fn has_dirty_tiles(&self) -> bool {
        self.surface.has_dirty_tiles()
    }

    /// Tiles drawn without an undo step because their snapshot could not be allocated
    pub fn take_lost_undo_tiles(&mut self) -> Vec<TileCoord> {
        self.surface.take_lost_undo_tiles()
    }

    /// Take dirty tiles and return their pixel bounding box `(x, y, w, h)`
    pub fn take_dirty_region(&mut self) -> Option<(u32, u32, u32, u32)> {
        let tiles = self.surface.take_dirty_tiles();
        self.surface.compute_tiles_bounding_box(&tiles)
    }

    /// Copy (optionally only dirty) tiles into `target`; see [`crate::TiledSurface::draw_to`]
    pub fn draw_to(&mut self, target: &mut Raster, origin_x: i32, origin_y: i32, only_dirty: bool) -> usize {
        self.surface.draw_to(target, origin_x, origin_y, only_dirty)
    }

    /// Owned premultiplied copy of the canvas, safe to hand to another thread
    pub fn snapshot(&self) -> Result<Raster, SurfaceError> {
        self.surface.to_bitmap()
    }

    /// Straight-alpha copy of the canvas for encoding
    pub fn export_image(&self) -> Result<RgbaImage, SurfaceError> {
        self.surface.to_image()
    }

    /// Grow the canvas to at least `width × height`; never shrinks
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, SurfaceError> {
        self.surface.resize(width, height)
    }

    /// Draw an image scaled to fit and centered, as its own undoable step
    pub fn load_image(&mut self, image: &RgbaImage) -> Result<(), SurfaceError> {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(SurfaceError::InvalidDimensions {
                width: src_w,
                height: src_h,
            });
        }

        self.finish_all();
        self.surface.commit();

        let (canvas_w, canvas_h) = (self.surface.width(), self.surface.height());
        let scale = (canvas_w as f32 / src_w as f32).min(canvas_h as f32 / src_h as f32);
        let dst_w = ((src_w as f32 * scale).round() as u32).clamp(1, canvas_w);
        let dst_h = ((src_h as f32 * scale).round() as u32).clamp(1, canvas_h);

        let bitmap = if (dst_w, dst_h) == (src_w, src_h) {
            Raster::from_image(image)?
        } else {
            Raster::from_image(&imageops::resize(image, dst_w, dst_h, FilterType::Triangle))?
        };
        let x = ((canvas_w - dst_w) / 2) as i32;
        let y = ((canvas_h - dst_h) / 2) as i32;
        self.surface.draw_bitmap(&bitmap, x, y);

        debug!(
            "load_image: {}x{} -> {}x{} at ({}, {})",
            src_w, src_h, dst_w, dst_h, x, y
        );
        Ok(())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.surface.get_pixel(x, y)
    }
}
