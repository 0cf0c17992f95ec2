//! Stack-based connectivity walker over a grid.
//!
//! The walker is deliberately iterative: region sizes can approach the full
//! level grid, which would overflow the call stack if written recursively.
//! A cell is marked visited the first time it is reached regardless of which
//! event fires, guaranteeing termination.

use std::collections::BTreeSet;

use crate::types::Pos;

use super::grid::{CARDINAL_OFFSETS, Grid, points_to_grid};

/// One visited cell, classified against the walkable predicate.
pub(super) enum FloodEvent {
    /// In bounds and inside the region; the flood may spread from here.
    Inside { pos: Pos },
    /// In bounds but outside the region. `prev` is the in-region cell the
    /// flood stepped out of.
    Outside { pos: Pos, prev: Option<Pos> },
    OutOfBounds { pos: Pos, prev: Option<Pos> },
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum FloodControl {
    Spread,
    Stop,
}

/// Walks the connected area around `start`, invoking `visit` once per
/// reachable cell. `is_inside` decides membership; `offsets` chooses the
/// neighbourhood. Cells outside the region (or out of bounds) are reported
/// but never spread from.
pub(super) fn flood_visit<I, V>(
    width: usize,
    height: usize,
    start: Pos,
    offsets: &[Pos],
    is_inside: I,
    mut visit: V,
) where
    I: Fn(Pos) -> bool,
    V: FnMut(FloodEvent) -> FloodControl,
{
    let in_bounds = |p: Pos| {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < width && (p.y as usize) < height
    };

    let mut seen = BTreeSet::new();
    let mut stack: Vec<(Pos, Option<Pos>)> = vec![(start, None)];

    while let Some((pos, prev)) = stack.pop() {
        if !seen.insert(pos) {
            continue;
        }

        if !in_bounds(pos) {
            if visit(FloodEvent::OutOfBounds { pos, prev }) == FloodControl::Stop {
                break;
            }
            continue;
        }
        if !is_inside(pos) {
            if visit(FloodEvent::Outside { pos, prev }) == FloodControl::Stop {
                break;
            }
            continue;
        }

        match visit(FloodEvent::Inside { pos }) {
            FloodControl::Spread => {
                for &d in offsets {
                    stack.push((pos + d, Some(pos)));
                }
            }
            FloodControl::Stop => {}
        }
    }
}

/// All in-region cells connected to `start`, in discovery order.
pub(super) fn flood_region(grid: &Grid<bool>, start: Pos, offsets: &[Pos]) -> Vec<Pos> {
    let mut collected = Vec::new();
    flood_visit(
        grid.width(),
        grid.height(),
        start,
        offsets,
        |p| grid[p],
        |event| {
            if let FloodEvent::Inside { pos } = event {
                collected.push(pos);
            }
            FloodControl::Spread
        },
    );
    collected
}

/// Every disjoint 4-connected region of the grid, by repeated fills over
/// remaining unvisited cells.
pub(super) fn find_regions(grid: &Grid<bool>) -> Vec<Vec<Pos>> {
    let mut working = grid.clone();
    let mut regions = Vec::new();
    for pos in grid.positions() {
        if !working[pos] {
            continue;
        }
        let region = flood_region(&working, pos, &CARDINAL_OFFSETS);
        for &p in &region {
            working[p] = false;
        }
        regions.push(region);
    }
    regions
}

pub(super) fn largest_region_index(regions: &[Vec<Pos>]) -> Option<usize> {
    regions
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

/// Boundary cells of a filled point set: filled cells with at least one
/// empty or out-of-bounds neighbour, in discovery order.
///
/// A degenerate region can produce an outline equal to the whole region;
/// callers using outline ratio as a validity heuristic must handle this.
pub(super) fn find_outline(points: &[Pos]) -> Vec<Pos> {
    let grid = points_to_grid(points);
    find_outline_on_grid(&grid, points[0])
}

pub(super) fn find_outline_on_grid(grid: &Grid<bool>, start: Pos) -> Vec<Pos> {
    let mut outline = Vec::new();
    let mut seen_outline = BTreeSet::new();
    flood_visit(
        grid.width(),
        grid.height(),
        start,
        &CARDINAL_OFFSETS,
        |p| grid[p],
        |event| {
            match event {
                FloodEvent::Inside { .. } => {}
                FloodEvent::Outside { prev, .. } | FloodEvent::OutOfBounds { prev, .. } => {
                    if let Some(prev) = prev
                        && seen_outline.insert(prev)
                    {
                        outline.push(prev);
                    }
                }
            }
            FloodControl::Spread
        },
    );
    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::grid::DIAGONAL_OFFSETS;

    fn filled_rect(width: usize, height: usize) -> Vec<Pos> {
        (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Pos::new(x, y)))
            .collect()
    }

    #[test]
    fn outline_of_a_three_by_three_block_is_its_eight_perimeter_cells() {
        let points = filled_rect(3, 3);
        let mut outline = find_outline(&points);
        outline.sort_unstable();

        let mut expected: Vec<Pos> =
            points.iter().copied().filter(|p| *p != Pos::new(1, 1)).collect();
        expected.sort_unstable();
        assert_eq!(outline, expected);
    }

    #[test]
    fn outline_of_a_single_point_is_the_point_itself() {
        let outline = find_outline(&[Pos::new(0, 0)]);
        assert_eq!(outline, vec![Pos::new(0, 0)]);
    }

    #[test]
    fn flood_region_collects_the_connected_component_only() {
        let mut grid = Grid::filled(5, 1, false);
        grid[Pos::new(0, 0)] = true;
        grid[Pos::new(1, 0)] = true;
        grid[Pos::new(3, 0)] = true;

        let region = flood_region(&grid, Pos::new(0, 0), &CARDINAL_OFFSETS);
        assert_eq!(region.len(), 2);
        assert!(!region.contains(&Pos::new(3, 0)));
    }

    #[test]
    fn diagonal_neighbourhood_bridges_corner_contacts() {
        let mut grid = Grid::filled(2, 2, false);
        grid[Pos::new(0, 0)] = true;
        grid[Pos::new(1, 1)] = true;

        assert_eq!(flood_region(&grid, Pos::new(0, 0), &CARDINAL_OFFSETS).len(), 1);
        assert_eq!(flood_region(&grid, Pos::new(0, 0), &DIAGONAL_OFFSETS).len(), 2);
    }

    #[test]
    fn find_regions_separates_disjoint_areas() {
        let mut grid = Grid::filled(5, 3, false);
        for p in [Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1)] {
            grid[p] = true;
        }
        for p in [Pos::new(4, 2), Pos::new(4, 1)] {
            grid[p] = true;
        }

        let regions = find_regions(&grid);
        assert_eq!(regions.len(), 2);
        assert_eq!(largest_region_index(&regions), Some(0));
    }

    #[test]
    fn large_region_does_not_overflow_the_stack() {
        // A worst-case single region far larger than any level grid.
        let grid = Grid::filled(300, 300, true);
        let region = flood_region(&grid, Pos::new(0, 0), &CARDINAL_OFFSETS);
        assert_eq!(region.len(), 300 * 300);
    }
}
