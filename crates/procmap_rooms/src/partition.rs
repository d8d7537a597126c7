//! Room partitioning algorithms.
//!
//! Both modes work on *cells* that tile the whole map and return *rooms*, each
//! room being its cell shrunk by [`ROOM_MARGIN`] on every side. Neighbouring
//! rooms are therefore always separated by wall.

use procmap_core::Rect;
use rand::Rng;
use tracing::debug;

use crate::{PartitionConfig, PartitionError, PartitionMode, ROOM_MARGIN};

/// Divide a `width × height` map into `config.target` disjoint rooms.
pub fn partition(
    width: u32,
    height: u32,
    config: &PartitionConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Rect>, PartitionError> {
    if config.target == 0 {
        return Err(PartitionError::InvalidParameters(
            "target room count must be at least 1".to_string(),
        ));
    }

    let rooms = match config.mode {
        PartitionMode::Equal { columns, rows } => {
            equal_split(width, height, columns, rows, config.target, rng)?
        }
        PartitionMode::Tree {
            min_width,
            min_height,
        } => tree_split(width, height, min_width, min_height, config.target, rng)?,
    };

    debug!(mode = %config.mode, rooms = rooms.len(), "partitioned map");
    Ok(rooms)
}

// ─── Equal mode ──────────────────────────────────────────────────────────────

fn equal_split(
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
    target: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Rect>, PartitionError> {
    if columns == 0 || rows == 0 {
        return Err(PartitionError::InvalidParameters(format!(
            "equal mode needs at least one column and row, got {}x{}",
            columns, rows
        )));
    }

    let available = columns as usize * rows as usize;
    if target > available {
        return Err(PartitionError::Unreachable {
            requested: target,
            available,
        });
    }

    let cell_width = width / columns;
    let cell_height = height / rows;
    let mut rooms: Vec<Rect> = (0..rows)
        .flat_map(|row| {
            (0..columns).map(move |col| {
                Rect::new(col * cell_width, row * cell_height, cell_width, cell_height)
                    .shrink(ROOM_MARGIN)
            })
        })
        .collect();

    while rooms.len() > target {
        let index = rng.gen_range(0..rooms.len());
        rooms.remove(index);
    }

    Ok(rooms)
}

// ─── Tree mode ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Cut with a vertical line, splitting the width
    X,
    /// Cut with a horizontal line, splitting the height
    Y,
}

fn tree_split(
    width: u32,
    height: u32,
    min_width: u32,
    min_height: u32,
    target: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Rect>, PartitionError> {
    // Minimum cell extent that still leaves a room of the minimum size.
    let min_cell = (
        min_width.saturating_add(2 * ROOM_MARGIN),
        min_height.saturating_add(2 * ROOM_MARGIN),
    );

    let mut cells = vec![Rect::new(0, 0, width, height)];

    while cells.len() < target {
        let (index, axis, weighted) = match pick_weighted(&cells, min_cell, rng) {
            Some(index) => (index, splittable_axis(&cells[index], min_cell), true),
            None => match pick_fallback(&cells, rng) {
                Some((index, axis)) => (index, axis, false),
                None => {
                    return Err(PartitionError::Unreachable {
                        requested: target,
                        available: cells.len(),
                    })
                }
            },
        };

        // Fallback splits always halve the cell.
        let min_extent = weighted.then_some(match axis {
            Axis::X => min_cell.0,
            Axis::Y => min_cell.1,
        });
        let (first, second) = split_cell(cells[index], axis, min_extent, rng);
        cells[index] = first;
        cells.push(second);
    }

    Ok(cells
        .into_iter()
        .map(|cell| cell.shrink(ROOM_MARGIN))
        .collect())
}

/// Choose a cell that exceeds the minimum extent on some axis, with
/// probability proportional to its area.
fn pick_weighted(cells: &[Rect], min_cell: (u32, u32), rng: &mut impl Rng) -> Option<usize> {
    let candidates: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.width > min_cell.0 || c.height > min_cell.1)
        .map(|(i, _)| i)
        .collect();

    let total: u64 = candidates.iter().map(|&i| cells[i].area()).sum();
    if total == 0 {
        return None;
    }

    let mut pick = rng.gen_range(0..total);
    for &index in &candidates {
        let area = cells[index].area();
        if pick < area {
            return Some(index);
        }
        pick -= area;
    }
    candidates.last().copied()
}

/// Termination safeguard: any cell that can still be halved, chosen uniformly.
fn pick_fallback(cells: &[Rect], rng: &mut impl Rng) -> Option<(usize, Axis)> {
    let candidates: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.width >= 2 || c.height >= 2)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let index = candidates[rng.gen_range(0..candidates.len())];
    let cell = cells[index];
    let axis = if cell.width >= 2 && (cell.width >= cell.height || cell.height < 2) {
        Axis::X
    } else {
        Axis::Y
    };
    Some((index, axis))
}

/// The longer axis among those that exceed the minimum extent.
fn splittable_axis(cell: &Rect, min_cell: (u32, u32)) -> Axis {
    let x_ok = cell.width > min_cell.0;
    let y_ok = cell.height > min_cell.1;
    match (x_ok, y_ok) {
        (true, true) if cell.width >= cell.height => Axis::X,
        (true, true) => Axis::Y,
        (true, false) => Axis::X,
        _ => Axis::Y,
    }
}

/// Split `cell` along `axis`. The cut lands in `[min_extent, extent - min_extent]`
/// when the cell is at least twice the minimum, otherwise exactly at the half.
fn split_cell(cell: Rect, axis: Axis, min_extent: Option<u32>, rng: &mut impl Rng) -> (Rect, Rect) {
    let extent = match axis {
        Axis::X => cell.width,
        Axis::Y => cell.height,
    };

    let cut = match min_extent {
        Some(min) if min > 0 && extent / 2 >= min => rng.gen_range(min..=extent - min),
        _ => extent / 2,
    };

    match axis {
        Axis::X => (
            Rect::new(cell.x, cell.y, cut, cell.height),
            Rect::new(cell.x + cut, cell.y, extent - cut, cell.height),
        ),
        Axis::Y => (
            Rect::new(cell.x, cell.y, cell.width, cut),
            Rect::new(cell.x, cell.y + cut, cell.width, extent - cut),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn seeded_rng() -> SmallRng {
        SmallRng::seed_from_u64(0)
    }

    fn assert_disjoint(rooms: &[Rect]) {
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn equal_quadrants_on_24x8() {
        let rooms = partition(24, 8, &PartitionConfig::equal(2, 2, 4), &mut seeded_rng()).unwrap();
        assert_eq!(
            rooms,
            vec![
                Rect::new(1, 1, 10, 2),
                Rect::new(13, 1, 10, 2),
                Rect::new(1, 5, 10, 2),
                Rect::new(13, 5, 10, 2),
            ]
        );
        assert_disjoint(&rooms);
    }

    #[test]
    fn equal_single_room_is_interior() {
        let rooms = partition(15, 7, &PartitionConfig::single_room(), &mut seeded_rng()).unwrap();
        assert_eq!(rooms, vec![Rect::new(1, 1, 13, 5)]);
    }

    #[test]
    fn equal_removes_down_to_target() {
        let full = partition(30, 30, &PartitionConfig::equal(3, 3, 9), &mut seeded_rng()).unwrap();
        let rooms = partition(30, 30, &PartitionConfig::equal(3, 3, 4), &mut seeded_rng()).unwrap();
        assert_eq!(rooms.len(), 4);
        assert!(rooms.iter().all(|r| full.contains(r)));
        assert_disjoint(&rooms);
    }

    #[test]
    fn equal_unreachable_target() {
        let err = partition(20, 20, &PartitionConfig::equal(2, 2, 5), &mut seeded_rng()).unwrap_err();
        assert_eq!(
            err,
            PartitionError::Unreachable {
                requested: 5,
                available: 4
            }
        );
    }

    #[test]
    fn zero_target_rejected() {
        let err = partition(20, 20, &PartitionConfig::equal(2, 2, 0), &mut seeded_rng()).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidParameters(_)));
        let err = partition(20, 20, &PartitionConfig::equal(0, 2, 1), &mut seeded_rng()).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidParameters(_)));
    }

    #[test]
    fn tree_produces_disjoint_rooms_inside_map() {
        let config = PartitionConfig::tree(3, 3, 8);
        let rooms = partition(64, 48, &config, &mut seeded_rng()).unwrap();
        assert_eq!(rooms.len(), 8);
        assert_disjoint(&rooms);
        for room in &rooms {
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.right() <= 63 && room.bottom() <= 47);
        }
    }

    #[test]
    fn tree_first_split_keeps_minimum() {
        let rooms = partition(60, 40, &PartitionConfig::tree(4, 4, 2), &mut seeded_rng()).unwrap();
        assert_eq!(rooms.len(), 2);
        for room in &rooms {
            assert!(room.width >= 4, "{}", room);
            assert_eq!(room.height, 38);
        }
        assert_eq!(rooms[0].width + rooms[1].width + 4, 60);
    }

    #[test]
    fn tree_is_deterministic_for_seed() {
        let config = PartitionConfig::tree(2, 2, 10);
        let a = partition(50, 50, &config, &mut SmallRng::seed_from_u64(11)).unwrap();
        let b = partition(50, 50, &config, &mut SmallRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn weighted_pick_tracks_area() {
        let cells = [
            Rect::new(0, 0, 1, 3),
            Rect::new(0, 0, 2, 2),
            Rect::new(0, 0, 30, 30),
            Rect::new(0, 0, 10, 10),
            Rect::new(0, 0, 10, 30),
        ];
        let mut rng = seeded_rng();
        let mut hits = [0u32; 5];
        for _ in 0..40_000 {
            let index = pick_weighted(&cells, (2, 2), &mut rng).unwrap();
            hits[index] += 1;
        }

        // 2x2 never exceeds the minimum, so it is never a candidate
        assert_eq!(hits[1], 0);
        // areas 3 : 900 : 100 : 300 out of 1303
        assert!(hits[0] < 300, "{:?}", hits);
        assert!((27_000..28_300).contains(&hits[2]), "{:?}", hits);
        assert!((2_700..3_450).contains(&hits[3]), "{:?}", hits);
        assert!((8_700..9_700).contains(&hits[4]), "{:?}", hits);
        assert!(hits[4] > 2 * hits[3]);
    }

    #[test]
    fn weighted_pick_without_candidates() {
        let cells = [Rect::new(0, 0, 2, 2), Rect::new(4, 0, 1, 1)];
        assert_eq!(pick_weighted(&cells, (2, 2), &mut seeded_rng()), None);
    }

    #[test]
    fn tree_falls_back_when_nothing_is_splittable() {
        let rooms = partition(4, 4, &PartitionConfig::tree(10, 10, 3), &mut seeded_rng()).unwrap();
        assert_eq!(rooms.len(), 3);
    }

    #[test]
    fn tree_unreachable_when_cells_are_single_tiles() {
        let err = partition(2, 2, &PartitionConfig::tree(1, 1, 5), &mut seeded_rng()).unwrap_err();
        assert_eq!(
            err,
            PartitionError::Unreachable {
                requested: 5,
                available: 4
            }
        );
    }

    #[test]
    fn split_cell_half_when_small() {
        let (a, b) = split_cell(Rect::new(0, 0, 7, 3), Axis::X, Some(5), &mut seeded_rng());
        assert_eq!(a, Rect::new(0, 0, 3, 3));
        assert_eq!(b, Rect::new(3, 0, 4, 3));
    }
}
