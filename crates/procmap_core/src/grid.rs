//! The tile grid mutated by every generation stage

use crate::{Point, Rect, TileId};
use serde::{Deserialize, Serialize};

/// A `width × height` row-major array of [`TileId`]s
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
}

impl Grid {
    /// Create a grid filled entirely with `fill`
    pub fn new(width: u32, height: u32, fill: TileId) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            tiles: vec![fill; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The rect covering the whole grid
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<TileId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.tiles[self.index(x, y)])
    }

    /// Set a tile, returning the previous value. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: TileId) -> Option<TileId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        Some(std::mem::replace(&mut self.tiles[idx], tile))
    }

    /// Translate `p` by a signed offset, returning `None` if the result leaves the grid.
    pub fn offset(&self, p: Point, dx: i32, dy: i32) -> Option<Point> {
        let x = p.x as i64 + dx as i64;
        let y = p.y as i64 + dy as i64;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(Point::new(x as u32, y as u32))
    }

    /// Clip a rect to the grid bounds
    pub fn clip(&self, rect: &Rect) -> Rect {
        rect.intersect(&self.bounds())
    }

    /// Number of cells holding `tile`
    pub fn count(&self, tile: TileId) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Copy the cells of `rect` from `source`. Both grids must share dimensions.
    pub fn copy_rect_from(&mut self, source: &Grid, rect: &Rect) {
        debug_assert_eq!(self.width, source.width);
        debug_assert_eq!(self.height, source.height);
        let rect = self.clip(rect);
        for y in rect.y..rect.bottom() {
            let start = self.index(rect.x, y);
            let end = start + rect.width as usize;
            self.tiles[start..end].copy_from_slice(&source.tiles[start..end]);
        }
    }

    /// Row-major flat view of all tiles
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[TileId]> + '_ {
        self.tiles.chunks(self.width.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLID: TileId = TileId(0);
    const EMPTY: TileId = TileId(1);

    #[test]
    fn test_new_grid_is_filled() {
        let grid = Grid::new(4, 3, SOLID);
        assert_eq!(grid.tiles().len(), 12);
        assert_eq!(grid.count(SOLID), 12);
        assert_eq!(grid.rows().count(), 3);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut grid = Grid::new(4, 3, SOLID);
        assert_eq!(grid.set(3, 2, EMPTY), Some(SOLID));
        assert_eq!(grid.get(3, 2), Some(EMPTY));
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.set(0, 3, EMPTY), None);
        assert_eq!(grid.count(EMPTY), 1);
    }

    #[test]
    fn test_offset_never_wraps() {
        let grid = Grid::new(3, 3, SOLID);
        assert_eq!(grid.offset(Point::new(0, 0), -1, 0), None);
        assert_eq!(grid.offset(Point::new(2, 1), 1, 0), None);
        assert_eq!(grid.offset(Point::new(1, 1), 1, 1), Some(Point::new(2, 2)));
    }

    #[test]
    fn test_copy_rect_only_touches_rect() {
        let mut target = Grid::new(4, 4, SOLID);
        let source = Grid::new(4, 4, EMPTY);
        target.copy_rect_from(&source, &Rect::new(1, 1, 2, 2));
        assert_eq!(target.count(EMPTY), 4);
        assert_eq!(target.get(0, 0), Some(SOLID));
        assert_eq!(target.get(2, 2), Some(EMPTY));
    }
}
