//! Grid coordinates and rectangular regions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on a [`Grid`](crate::Grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned region of a grid. `width` or `height` may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Shrink by `margin` tiles on every side, collapsing to an empty rect if too small.
    pub fn shrink(&self, margin: u32) -> Rect {
        let width = self.width.saturating_sub(margin.saturating_mul(2));
        let height = self.height.saturating_sub(margin.saturating_mul(2));
        Rect::new(
            self.x.saturating_add(margin),
            self.y.saturating_add(margin),
            width,
            height,
        )
    }

    /// Overlapping part of two rects. Empty (zero-sized) if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rect::new(x.min(right), y.min(bottom), 0, 0);
        }
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// All cells of the rect in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let (x0, right) = (self.x, self.right());
        (self.y..self.bottom()).flat_map(move |y| (x0..right).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}
