//! Per-run tile population tracking

use crate::{Grid, TileId, TileVocabulary};

/// Live per-tile cell counts for a single generation run.
///
/// Counts always equal the number of cells holding each tile, provided every
/// grid write goes through [`RunState::record_write`]. Caps come from the
/// [`TileVocabulary`] and are checked by rule outcomes before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    counts: Vec<u32>,
    caps: Vec<Option<u32>>,
}

impl RunState {
    /// Start a run by counting the tiles already present in `grid`
    pub fn new(vocabulary: &TileVocabulary, grid: &Grid) -> Self {
        let mut counts = vec![0u32; vocabulary.len()];
        for tile in grid.tiles() {
            if let Some(count) = counts.get_mut(tile.index()) {
                *count += 1;
            }
        }
        let caps = vocabulary.iter().map(|(_, _, cap)| cap).collect();
        Self { counts, caps }
    }

    pub fn count(&self, tile: TileId) -> u32 {
        self.counts.get(tile.index()).copied().unwrap_or(0)
    }

    pub fn cap(&self, tile: TileId) -> Option<u32> {
        self.caps.get(tile.index()).copied().flatten()
    }

    /// Whether another cell of `tile` would exceed its cap
    pub fn is_exhausted(&self, tile: TileId) -> bool {
        match self.cap(tile) {
            Some(cap) => self.count(tile) >= cap,
            None => false,
        }
    }

    /// Account for a cell changing from `old` to `new`
    pub fn record_write(&mut self, old: TileId, new: TileId) {
        if old == new {
            return;
        }
        if let Some(count) = self.counts.get_mut(old.index()) {
            *count = count.saturating_sub(1);
        }
        if let Some(count) = self.counts.get_mut(new.index()) {
            *count += 1;
        }
    }

    /// Write `tile` at `(x, y)` and keep the counts in sync. Returns `false` if out of bounds.
    pub fn write(&mut self, grid: &mut Grid, x: u32, y: u32, tile: TileId) -> bool {
        match grid.set(x, y, tile) {
            Some(old) => {
                self.record_write(old, tile);
                true
            }
            None => false,
        }
    }
}
