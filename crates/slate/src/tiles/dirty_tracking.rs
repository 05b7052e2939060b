//! Dirty tile tracking for incremental redraws

use tracing::trace;

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Mark the tile containing a pixel as modified
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.dirty_tiles.insert(TileCoord {
            x: x / self.tile_size,
            y: y / self.tile_size,
        });
    }

    /// Mark every tile overlapping a pixel rectangle
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 || x >= self.width || y >= self.height {
            return;
        }

        let (tx0, ty0, tx1, ty1) = self.tile_range((x, y, w, h));
        let before = self.dirty_tiles.len();
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }

        trace!(
            "mark_region_dirty: ({}, {}) {}x{} -> {} new tiles (total {})",
            x,
            y,
            w,
            h,
            self.dirty_tiles.len() - before,
            self.dirty_tiles.len()
        );
    }

    /// Mark the whole canvas dirty
    pub fn mark_all_dirty(&mut self) {
        self.mark_region_dirty(0, 0, self.width, self.height);
    }

    /// Drain the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.dirty_tiles.drain().collect()
    }

    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }

    #[inline]
    pub fn is_tile_dirty(&self, coord: TileCoord) -> bool {
        self.dirty_tiles.contains(&coord)
    }
}

#[cfg(test)]
mod tests {
    use slate_config::SurfaceConfig;

    use super::*;

    fn surface() -> TiledSurface {
        let config = SurfaceConfig {
            tile_size: 100,
            ..Default::default()
        };
        TiledSurface::new(250, 250, &config).unwrap()
    }

    #[test]
    fn test_mark_dirty_pixel() {
        let mut surface = surface();
        surface.mark_dirty(150, 20);
        surface.mark_dirty(160, 30);
        surface.mark_dirty(999, 0);

        assert_eq!(surface.dirty_tile_count(), 1);
        assert!(surface.is_tile_dirty(TileCoord { x: 1, y: 0 }));
    }

    #[test]
    fn test_mark_region_clipped() {
        let mut surface = surface();
        surface.mark_region_dirty(190, 190, 500, 500);

        let mut dirty = surface.take_dirty_tiles();
        dirty.sort();
        assert_eq!(
            dirty,
            vec![
                TileCoord { x: 1, y: 1 },
                TileCoord { x: 1, y: 2 },
                TileCoord { x: 2, y: 1 },
                TileCoord { x: 2, y: 2 },
            ]
        );
        assert!(!surface.has_dirty_tiles());
    }

    #[test]
    fn test_mark_all_dirty() {
        let mut surface = surface();
        surface.mark_all_dirty();
        assert_eq!(surface.dirty_tile_count(), 9);
    }

    #[test]
    fn test_empty_region_ignored() {
        let mut surface = surface();
        surface.mark_region_dirty(10, 10, 0, 5);
        surface.mark_region_dirty(300, 10, 5, 5);
        assert!(!surface.has_dirty_tiles());
    }
}
