//! Tiled, versioned raster backing store
//!
//! The canvas is split into fixed-size tiles. Each tile keeps a short history
//! of versions; drawing goes to the newest (head) version, and the first draw
//! after a [`TiledSurface::commit`] snapshots the head into a new version so
//! that [`TiledSurface::step`] can revert it. Untouched tiles never copy
//! anything, so a commit is just a counter bump.

mod composite;
mod dirty_tracking;
mod draw;
mod history;

use std::collections::HashSet;

use slate_config::SurfaceConfig;
use tracing::debug;

use crate::error::SurfaceError;
use crate::raster::Raster;

pub use history::{Tile, TileVersion};

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Tiled canvas with per-tile version history and dirty tracking
#[derive(Debug)]
pub struct TiledSurface {
    width: u32,
    height: u32,
    tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    /// Row-major
    tiles: Vec<Tile>,
    /// Current version; every tile head is at or below it
    version: u32,
    max_versions: usize,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
    /// Tiles that lost an undo step to a failed snapshot
    lost_undo_tiles: HashSet<TileCoord>,
    pub(crate) snapshot_tile: fn(&Raster) -> Result<Raster, SurfaceError>,
}

impl TiledSurface {
    /// Create a transparent surface, failing if any tile cannot be allocated
    pub fn new(width: u32, height: u32, config: &SurfaceConfig) -> Result<Self, SurfaceError> {
        Self::with_version(width, height, config.tile_size, config.max_versions, 0)
    }

    fn with_version(
        width: u32,
        height: u32,
        tile_size: u32,
        max_versions: usize,
        version: u32,
    ) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height });
        }
        if tile_size == 0 {
            return Err(SurfaceError::InvalidTileSize(tile_size));
        }

        let tiles_x = width.div_ceil(tile_size);
        let tiles_y = height.div_ceil(tile_size);

        let mut tiles = Vec::new();
        tiles
            .try_reserve_exact((tiles_x * tiles_y) as usize)
            .map_err(|_| SurfaceError::Allocation { width, height })?;
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let x = tx * tile_size;
                let y = ty * tile_size;
                let w = tile_size.min(width - x);
                let h = tile_size.min(height - y);
                tiles.push(Tile::new(TileCoord { x: tx, y: ty }, x, y, Raster::try_new(w, h)?, version));
            }
        }

        debug!(
            "TiledSurface::new: {}x{} in {}x{} tiles of {}px, max_versions={}",
            width, height, tiles_x, tiles_y, tile_size, max_versions
        );

        Ok(Self {
            width,
            height,
            tile_size,
            tiles_x,
            tiles_y,
            tiles,
            version,
            max_versions: max_versions.max(1),
            dirty_tiles: HashSet::new(),
            lost_undo_tiles: HashSet::new(),
            snapshot_tile: Raster::try_clone,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Current version number
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    /// Tile at `coord`, if inside the grid
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        if coord.x >= self.tiles_x || coord.y >= self.tiles_y {
            return None;
        }
        self.tiles.get((coord.y * self.tiles_x + coord.x) as usize)
    }

    /// Tile bounds `(x, y, width, height)` in pixels; edge tiles may be smaller
    pub fn get_tile_bounds(&self, coord: TileCoord) -> (u32, u32, u32, u32) {
        let x = coord.x * self.tile_size;
        let y = coord.y * self.tile_size;
        let w = self.tile_size.min(self.width.saturating_sub(x));
        let h = self.tile_size.min(self.height.saturating_sub(y));
        (x, y, w, h)
    }

    /// Read a pixel from the current content
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let tile = self.tile(TileCoord {
            x: x / self.tile_size,
            y: y / self.tile_size,
        })?;
        tile.head().raster.get_pixel(x - tile.x, y - tile.y)
    }

    /// Inclusive tile index range covering pixel bounds `(x, y, w, h)`
    pub(crate) fn tile_range(&self, bounds: (u32, u32, u32, u32)) -> (u32, u32, u32, u32) {
        let (x, y, w, h) = bounds;
        let x_end = (x + w).min(self.width).saturating_sub(1);
        let y_end = (y + h).min(self.height).saturating_sub(1);
        (
            x / self.tile_size,
            y / self.tile_size,
            x_end / self.tile_size,
            y_end / self.tile_size,
        )
    }
}
