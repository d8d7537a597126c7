//! Connected-component labeling under an arbitrary kernel

use procmap_core::{Grid, Kernel, Point, Rect, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Blocked,
    Unlabeled,
    Component(usize),
}

/// Group the open cells of `rect` into connected components.
///
/// Cells holding `blocking` are excluded; every other tile is open. Two open
/// cells touch when one lies at a kernel offset from the other, in either
/// direction. Components are numbered in row-major order of their first cell
/// and each component lists its points in row-major order. Cells outside
/// `rect` are never visited.
pub fn label(grid: &Grid, rect: Rect, kernel: &Kernel, blocking: TileId) -> Vec<Vec<Point>> {
    let rect = grid.clip(&rect);
    let width = rect.width as usize;
    let height = rect.height as usize;

    let mut marks: Vec<Mark> = rect
        .points()
        .map(|p| {
            if grid.get(p.x, p.y) == Some(blocking) {
                Mark::Blocked
            } else {
                Mark::Unlabeled
            }
        })
        .collect();

    let offsets = symmetric_offsets(kernel);
    let mut count = 0;
    let mut stack = Vec::new();

    for start in 0..marks.len() {
        if marks[start] != Mark::Unlabeled {
            continue;
        }
        marks[start] = Mark::Component(count);
        stack.push(start);

        while let Some(index) = stack.pop() {
            let x = (index % width) as i64;
            let y = (index / width) as i64;
            for &(dx, dy) in &offsets {
                let nx = x + dx as i64;
                let ny = y + dy as i64;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let neighbour = ny as usize * width + nx as usize;
                if marks[neighbour] == Mark::Unlabeled {
                    marks[neighbour] = Mark::Component(count);
                    stack.push(neighbour);
                }
            }
        }
        count += 1;
    }

    let mut components = vec![Vec::new(); count];
    for (p, mark) in rect.points().zip(marks) {
        if let Mark::Component(c) = mark {
            components[c].push(p);
        }
    }
    components
}

/// Index of the component with the most cells; ties go to the first one seen.
pub fn largest_component(components: &[Vec<Point>]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, component) in components.iter().enumerate() {
        match best {
            Some((_, len)) if component.len() <= len => {}
            _ => best = Some((index, component.len())),
        }
    }
    best.map(|(index, _)| index)
}

/// Kernel offsets plus their negations, without the center.
fn symmetric_offsets(kernel: &Kernel) -> Vec<(i32, i32)> {
    let mut offsets: Vec<(i32, i32)> = kernel
        .offsets()
        .flat_map(|(dx, dy)| [(dx, dy), (-dx, -dy)])
        .filter(|&o| o != (0, 0))
        .collect();
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLID: TileId = TileId(0);
    const EMPTY: TileId = TileId(1);
    const WATER: TileId = TileId(2);

    fn grid_from(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows[0].len() as u32, rows.len() as u32, SOLID);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let tile = match c {
                    '.' => EMPTY,
                    '~' => WATER,
                    _ => SOLID,
                };
                grid.set(x as u32, y as u32, tile);
            }
        }
        grid
    }

    #[test]
    fn separate_regions_get_separate_labels() {
        let grid = grid_from(&["#######", "#..#.##", "#######"]);
        let components = label(&grid, grid.bounds(), &Kernel::plus(), SOLID);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec![Point::new(1, 1), Point::new(2, 1)]);
        assert_eq!(components[1], vec![Point::new(4, 1)]);
    }

    #[test]
    fn kernel_defines_adjacency() {
        let grid = grid_from(&["#####", "#.###", "##.##", "#####"]);
        assert_eq!(label(&grid, grid.bounds(), &Kernel::plus(), SOLID).len(), 2);
        assert_eq!(label(&grid, grid.bounds(), &Kernel::all(), SOLID).len(), 1);
    }

    #[test]
    fn one_sided_kernel_is_applied_both_ways() {
        let right_only = Kernel::from_rows(&[[0u8, 0, 0], [0, 0, 1], [0, 0, 0]]).unwrap();
        let grid = grid_from(&["#...#"]);
        let components = label(&grid, grid.bounds(), &right_only, SOLID);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn non_blocking_tiles_are_open() {
        let grid = grid_from(&["#.~.#"]);
        let components = label(&grid, grid.bounds(), &Kernel::plus(), SOLID);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn labeling_stays_inside_rect() {
        let grid = grid_from(&["......", "......", "......"]);
        let components = label(&grid, Rect::new(1, 1, 2, 1), &Kernel::plus(), SOLID);
        assert_eq!(components, vec![vec![Point::new(1, 1), Point::new(2, 1)]]);
    }

    #[test]
    fn points_are_row_major_within_component() {
        let grid = grid_from(&["#.#", "...", "#.#"]);
        let components = label(&grid, grid.bounds(), &Kernel::plus(), SOLID);
        assert_eq!(
            components[0],
            vec![
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2)
            ]
        );
    }

    #[test]
    fn large_region_does_not_overflow_stack() {
        let grid = Grid::new(512, 512, EMPTY);
        let components = label(&grid, grid.bounds(), &Kernel::plus(), SOLID);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 512 * 512);
    }

    #[test]
    fn largest_prefers_first_on_tie() {
        let a = vec![Point::new(0, 0); 3];
        let b = vec![Point::new(0, 0); 5];
        let c = vec![Point::new(0, 0); 5];
        assert_eq!(largest_component(&[a.clone(), b, c]), Some(1));
        assert_eq!(largest_component(&[a]), Some(0));
        assert_eq!(largest_component(&[]), None);
    }
}
