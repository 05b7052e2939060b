//! Per-tile version history, commit and undo

use std::collections::VecDeque;

use tracing::debug;

use super::{TileCoord, TiledSurface};
use crate::error::SurfaceError;
use crate::raster::Raster;

/// One snapshot of a tile's pixels
#[derive(Debug)]
pub struct TileVersion {
    pub version: u32,
    pub raster: Raster,
}

/// A tile and its retained history
///
/// The head is always present; older versions sit in `history`, oldest first,
/// all with version numbers below the head's.
#[derive(Debug)]
pub struct Tile {
    pub coord: TileCoord,
    /// Pixel origin on the canvas
    pub x: u32,
    pub y: u32,
    head: TileVersion,
    history: VecDeque<TileVersion>,
}

impl Tile {
    pub(crate) fn new(coord: TileCoord, x: u32, y: u32, raster: Raster, version: u32) -> Self {
        Self {
            coord,
            x,
            y,
            head: TileVersion { version, raster },
            history: VecDeque::new(),
        }
    }

    /// Current content
    #[inline]
    pub fn head(&self) -> &TileVersion {
        &self.head
    }

    /// Number of retained versions, head included
    #[inline]
    pub fn version_count(&self) -> usize {
        self.history.len() + 1
    }

    /// Version numbers, oldest first
    pub fn versions(&self) -> Vec<u32> {
        self.history
            .iter()
            .chain(std::iter::once(&self.head))
            .map(|v| v.version)
            .collect()
    }

    /// Prepare the head for drawing at `version`
    ///
    /// If the head predates `version`, it is pushed into history and a
    /// `snapshot` of it becomes the new head; history is trimmed so at most
    /// `max_versions` versions remain. When the snapshot fails the head is
    /// retagged and drawn in place, losing this tile's undo step.
    pub(crate) fn begin_version(
        &mut self,
        version: u32,
        max_versions: usize,
        snapshot: fn(&Raster) -> Result<Raster, SurfaceError>,
    ) -> Result<(), SurfaceError> {
        if self.head.version >= version {
            return Ok(());
        }
        match snapshot(&self.head.raster) {
            Ok(raster) => {
                let previous = std::mem::replace(&mut self.head, TileVersion { version, raster });
                self.history.push_back(previous);
                while self.history.len() + 1 > max_versions {
                    self.history.pop_front();
                }
                Ok(())
            }
            Err(e) => {
                self.head.version = version;
                Err(e)
            }
        }
    }

    #[inline]
    pub(crate) fn head_mut(&mut self) -> &mut Raster {
        &mut self.head.raster
    }

    /// Revert to the newest retained version at or below `target`
    ///
    /// Saturates at the oldest retained version, which is retagged to `target`.
    /// Returns true if the head changed.
    pub(crate) fn revert_to(&mut self, target: u32) -> bool {
        let mut changed = false;
        while self.head.version > target {
            match self.history.pop_back() {
                Some(previous) => {
                    self.head = previous;
                    changed = true;
                }
                None => {
                    self.head.version = target;
                    break;
                }
            }
        }
        changed
    }
}

impl TiledSurface {
    /// Finalize the current drawing; the next draw on each tile starts a new version
    pub fn commit(&mut self) {
        self.version += 1;
        debug!("TiledSurface::commit -> version {}", self.version);
    }

    /// Move the current version by `delta` (negative to undo)
    ///
    /// Every tile drops versions newer than the target. Undoing past the
    /// retained history saturates at the oldest retained version. Returns the
    /// number of tiles whose content changed.
    pub fn step(&mut self, delta: i32) -> usize {
        let target = (self.version as i64 + delta as i64).clamp(0, u32::MAX as i64) as u32;

        let mut reverted = Vec::new();
        for tile in &mut self.tiles {
            if tile.revert_to(target) {
                reverted.push(tile.coord);
            }
        }
        let count = reverted.len();
        self.dirty_tiles.extend(reverted);

        debug!(
            "TiledSurface::step({}): version {} -> {}, {} tiles reverted",
            delta, self.version, target, count
        );
        self.version = target;
        count
    }

    /// Drain the tiles drawn in place because their undo snapshot could not be allocated
    pub fn take_lost_undo_tiles(&mut self) -> Vec<TileCoord> {
        self.lost_undo_tiles.drain().collect()
    }

    #[inline]
    pub fn has_lost_undo_tiles(&self) -> bool {
        !self.lost_undo_tiles.is_empty()
    }

    /// Versions retained for the tile at `coord`
    pub fn tile_version_count(&self, coord: TileCoord) -> Option<usize> {
        self.tile(coord).map(Tile::version_count)
    }
}
