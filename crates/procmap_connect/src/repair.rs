//! Connectivity repair: prune minor regions or join everything with corridors

use procmap_core::{Grid, Point, Rect, RunState};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::label::{label, largest_component};
use crate::{RepairMode, RepairReport, RepairTiles, UnconnectedPolicy};

/// Enforce `policy` on the open cells of `rect`.
///
/// In [`RepairMode::Delete`] every component except the largest is filled with
/// `tiles.blocking`. In [`RepairMode::Connect`] random pairs of components are
/// joined by L-shaped corridors of `tiles.dig` until one component remains.
/// All writes go through `state` so per-tile counts stay exact. Population
/// caps are not applied to repair writes.
pub fn repair(
    grid: &mut Grid,
    rect: Rect,
    policy: &UnconnectedPolicy,
    tiles: RepairTiles,
    state: &mut RunState,
    rng: &mut impl Rng,
) -> RepairReport {
    let rect = grid.clip(&rect);
    let components = label(grid, rect, &policy.kernel, tiles.blocking);
    let mut report = RepairReport {
        components_before: components.len(),
        ..RepairReport::default()
    };

    if components.len() > 1 {
        match policy.mode {
            RepairMode::Delete => {
                report.removed_cells = delete_minor(grid, &components, tiles, state);
            }
            RepairMode::Connect => {
                if !policy.kernel.has_orthogonal_offsets() {
                    warn!(
                        kernel = %policy.kernel,
                        "connectivity kernel lacks orthogonal steps; corridors may not join regions"
                    );
                }
                let (corridors, carved) =
                    connect_all(grid, rect, components, policy.thickness, tiles, state, rng);
                report.corridors = corridors;
                report.carved_cells = carved;
            }
        }
    }

    debug!(
        rect = %rect,
        mode = %policy.mode,
        components = report.components_before,
        removed = report.removed_cells,
        corridors = report.corridors,
        carved = report.carved_cells,
        "repaired connectivity"
    );
    report
}

fn delete_minor(
    grid: &mut Grid,
    components: &[Vec<Point>],
    tiles: RepairTiles,
    state: &mut RunState,
) -> usize {
    let Some(keep) = largest_component(components) else {
        return 0;
    };

    let mut removed = 0;
    for (index, component) in components.iter().enumerate() {
        if index == keep {
            continue;
        }
        for p in component {
            if state.write(grid, p.x, p.y, tiles.blocking) {
                removed += 1;
            }
        }
    }
    removed
}

/// Join components pairwise until one is left. Returns `(corridors, carved cells)`.
fn connect_all(
    grid: &mut Grid,
    rect: Rect,
    mut pending: Vec<Vec<Point>>,
    thickness: u32,
    tiles: RepairTiles,
    state: &mut RunState,
    rng: &mut impl Rng,
) -> (usize, usize) {
    let mut corridors = 0;
    let mut carved = 0;

    while pending.len() > 1 {
        let count = pending.len();
        let first = rng.gen_range(0..count);
        let mut second = rng.gen_range(0..count - 1);
        if second >= first {
            second += 1;
        }

        let from = pending[first][rng.gen_range(0..pending[first].len())];
        let to = pending[second][rng.gen_range(0..pending[second].len())];
        let horizontal_first = rng.gen_bool(0.5);

        let path = corridor_path(from, to, horizontal_first);
        let dug = carve_corridor(grid, rect, &path, thickness, tiles, state);
        trace!(?from, ?to, dug, "carved corridor");
        carved += dug;
        corridors += 1;

        let merged = pending.remove(second);
        let target = if first > second { first - 1 } else { first };
        pending[target].extend(merged);
    }

    (corridors, carved)
}

/// L-shaped path from `from` to `to`, both ends included.
///
/// With `horizontal_first` the path walks along x to `to.x` before turning,
/// otherwise it walks along y first.
pub fn corridor_path(from: Point, to: Point, horizontal_first: bool) -> Vec<Point> {
    let corner = if horizontal_first {
        Point::new(to.x, from.y)
    } else {
        Point::new(from.x, to.y)
    };

    let mut path = vec![from];
    let mut current = from;
    for waypoint in [corner, to] {
        while current != waypoint {
            if current.x != waypoint.x {
                current.x = step_toward(current.x, waypoint.x);
            } else {
                current.y = step_toward(current.y, waypoint.y);
            }
            path.push(current);
        }
    }
    path
}

fn step_toward(from: u32, to: u32) -> u32 {
    if to > from {
        from + 1
    } else {
        from - 1
    }
}

/// Stamp a `thickness × thickness` brush along `path`, turning blocking cells
/// inside `rect` into the dig tile. Returns the number of cells changed.
///
/// The brush extends `(thickness - 1) / 2` cells before each path cell and
/// `thickness / 2` after it, so odd widths are centered.
pub fn carve_corridor(
    grid: &mut Grid,
    rect: Rect,
    path: &[Point],
    thickness: u32,
    tiles: RepairTiles,
    state: &mut RunState,
) -> usize {
    let thickness = thickness.max(1) as i64;
    let before = (thickness - 1) / 2;
    let after = thickness / 2;

    let mut carved = 0;
    for p in path {
        let (x_lo, x_hi) = brush_span(p.x, before, after, rect.x, rect.right());
        let (y_lo, y_hi) = brush_span(p.y, before, after, rect.y, rect.bottom());
        for y in y_lo..y_hi {
            for x in x_lo..x_hi {
                if grid.get(x, y) == Some(tiles.blocking) && state.write(grid, x, y, tiles.dig) {
                    carved += 1;
                }
            }
        }
    }
    carved
}

/// Half-open span `center - before ..= center + after`, clamped to `[lo, hi)`.
fn brush_span(center: u32, before: i64, after: i64, lo: u32, hi: u32) -> (u32, u32) {
    let start = (center as i64 - before).max(lo as i64);
    let end = (center as i64 + after + 1).min(hi as i64);
    if end <= start {
        return (lo, lo);
    }
    (start as u32, end as u32)
}
