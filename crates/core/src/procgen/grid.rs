//! Grid storage and neighbourhood primitives shared by all generation passes.

use std::ops::{Index, IndexMut};

use crate::types::Pos;

/// 4-connected neighbourhood, in the fixed order the flood fill spreads.
pub(super) const CARDINAL_OFFSETS: [Pos; 4] =
    [Pos::new(0, -1), Pos::new(-1, 0), Pos::new(1, 0), Pos::new(0, 1)];

/// 8-connected neighbourhood, row-major.
pub(super) const DIAGONAL_OFFSETS: [Pos; 8] = [
    Pos::new(-1, -1),
    Pos::new(0, -1),
    Pos::new(1, -1),
    Pos::new(-1, 0),
    Pos::new(1, 0),
    Pos::new(-1, 1),
    Pos::new(0, 1),
    Pos::new(1, 1),
];

/// Rectangular 2D cell store, row-major, 0-indexed from the top-left.
///
/// `get`/`get_mut` are the bounds-checked accessors; indexing with a
/// position panics when out of bounds, which is treated as a logic defect
/// rather than a recoverable condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { width, height, cells: vec![value; width * height] }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        if self.in_bounds(pos) { Some(&self.cells[self.flat_index(pos)]) } else { None }
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        if self.in_bounds(pos) {
            let i = self.flat_index(pos);
            Some(&mut self.cells[i])
        } else {
            None
        }
    }

    /// Row-major iteration over every position.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<T> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x as i32, y as i32)))
    }

    fn flat_index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

impl<T> Index<Pos> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &T {
        assert!(self.in_bounds(pos), "grid access out of bounds at {pos:?}");
        &self.cells[self.flat_index(pos)]
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        assert!(self.in_bounds(pos), "grid access out of bounds at {pos:?}");
        let i = self.flat_index(pos);
        &mut self.cells[i]
    }
}

/// Smallest occupancy grid covering `points`, anchored at the origin.
pub(super) fn points_to_grid(points: &[Pos]) -> Grid<bool> {
    let (max_x, max_y) = points
        .iter()
        .fold((0, 0), |(mx, my), p| (mx.max(p.x), my.max(p.y)));
    let mut grid = Grid::filled(max_x as usize + 1, max_y as usize + 1, false);
    for &p in points {
        grid[p] = true;
    }
    grid
}

/// Bounding extents (max − min per axis) of a point set.
pub(super) fn bounding_extents(points: &[Pos]) -> (i32, i32) {
    debug_assert!(!points.is_empty(), "extents of an empty point set");
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x, max_y - min_y)
}

/// Number of occupied neighbours of `pos` under the given neighbourhood.
pub(super) fn neighbour_count(grid: &Grid<bool>, pos: Pos, offsets: &[Pos]) -> usize {
    offsets
        .iter()
        .filter(|&&d| grid.get(pos + d).copied().unwrap_or(false))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_outside_bounds() {
        let grid = Grid::filled(4, 3, 0u8);
        assert!(grid.get(Pos::new(3, 2)).is_some());
        assert!(grid.get(Pos::new(4, 0)).is_none());
        assert!(grid.get(Pos::new(0, 3)).is_none());
        assert!(grid.get(Pos::new(-1, 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_outside_bounds_panics() {
        let grid = Grid::filled(2, 2, 0u8);
        let _ = grid[Pos::new(2, 0)];
    }

    #[test]
    fn positions_iterate_row_major() {
        let grid = Grid::filled(2, 2, ());
        let all: Vec<Pos> = grid.positions().collect();
        assert_eq!(
            all,
            vec![Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)]
        );
    }

    #[test]
    fn points_to_grid_covers_the_point_set_exactly() {
        let points = [Pos::new(0, 0), Pos::new(2, 1)];
        let grid = points_to_grid(&points);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid[Pos::new(0, 0)]);
        assert!(grid[Pos::new(2, 1)]);
        assert!(!grid[Pos::new(1, 0)]);
    }

    #[test]
    fn bounding_extents_are_max_minus_min() {
        let points = [Pos::new(2, 3), Pos::new(7, 3), Pos::new(4, 9)];
        assert_eq!(bounding_extents(&points), (5, 6));
    }

    #[test]
    fn neighbour_count_respects_the_chosen_neighbourhood() {
        let mut grid = Grid::filled(3, 3, false);
        grid[Pos::new(0, 0)] = true;
        grid[Pos::new(1, 0)] = true;
        let center = Pos::new(1, 1);
        assert_eq!(neighbour_count(&grid, center, &CARDINAL_OFFSETS), 1);
        assert_eq!(neighbour_count(&grid, center, &DIAGONAL_OFFSETS), 2);
    }
}
