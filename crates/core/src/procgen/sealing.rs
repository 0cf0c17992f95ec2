//! Perimeter sealing.
//!
//! Corridor carving can leave walkable cells exposed to the void. A flood
//! over the walkable area finds every floor or door with a void (or
//! out-of-bounds) cell in its eight-neighbourhood, then backfills those
//! void cells with ownerless walls so no walkable cell borders the void.

use std::collections::BTreeSet;

use crate::types::{Pos, TileKind};

use super::flood::{FloodControl, FloodEvent, flood_visit};
use super::grid::DIAGONAL_OFFSETS;
use super::model::LevelCell;
use super::placement::LevelBuilder;

pub(super) fn seal_perimeter(builder: &mut LevelBuilder) {
    let exposed = exposed_floors(builder);

    for floor in exposed {
        for offset in DIAGONAL_OFFSETS {
            let target = floor + offset;
            if builder.grid.in_bounds(target) && builder.grid[target].is_none() {
                builder.grid[target] =
                    Some(LevelCell { kind: TileKind::Wall, room_indices: Vec::new() });
            }
        }
    }
}

/// Walkable cells adjacent to the void, in flood discovery order.
fn exposed_floors(builder: &LevelBuilder) -> Vec<Pos> {
    let Some(start) = flood_start(builder) else {
        return Vec::new();
    };

    let grid = &builder.grid;
    let walkable = |p: Pos| {
        grid[p]
            .as_ref()
            .is_some_and(|cell| matches!(cell.kind, TileKind::Floor | TileKind::Door))
    };

    let mut exposed = Vec::new();
    let mut recorded = BTreeSet::new();
    flood_visit(
        grid.width(),
        grid.height(),
        start,
        &DIAGONAL_OFFSETS,
        walkable,
        |event| {
            let prev = match event {
                FloodEvent::Inside { .. } => None,
                FloodEvent::Outside { pos, prev } => {
                    // A wall between the floor and the void already seals it.
                    if grid[pos].is_some() { None } else { prev }
                }
                FloodEvent::OutOfBounds { prev, .. } => prev,
            };
            if let Some(prev) = prev
                && recorded.insert(prev)
            {
                exposed.push(prev);
            }
            FloodControl::Spread
        },
    );
    exposed
}

/// First floor tile of the seed room, matching where the walkable flood
/// can usefully begin.
fn flood_start(builder: &LevelBuilder) -> Option<Pos> {
    builder.rooms.first().and_then(|room| {
        room.tiles.iter().map(|t| t.pos).find(|&p| {
            builder.grid[p].as_ref().is_some_and(|cell| cell.kind == TileKind::Floor)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::model::{Room, RoomKind, RoomTile};

    fn room_from_cells(cells: &[(Pos, TileKind)]) -> Room {
        Room {
            tiles: cells.iter().map(|&(pos, kind)| RoomTile { pos, kind }).collect(),
            exits: Vec::new(),
            outline: cells
                .iter()
                .filter(|(_, kind)| *kind == TileKind::Wall)
                .map(|&(pos, _)| pos)
                .collect(),
            connectable_edges: Default::default(),
            max_width: 0,
            max_height: 0,
            kind: RoomKind::Unknown,
        }
    }

    #[test]
    fn exposed_floor_gets_walled_in_on_all_open_sides() {
        // A lone floor cell with no walls at all.
        let mut builder = LevelBuilder::new(10, 10);
        let room = room_from_cells(&[(Pos::new(5, 5), TileKind::Floor)]);
        builder.add_room(room);

        seal_perimeter(&mut builder);

        for offset in DIAGONAL_OFFSETS {
            let cell = builder.grid[Pos::new(5, 5) + offset].as_ref();
            assert_eq!(cell.map(|c| c.kind), Some(TileKind::Wall));
        }
        let sealed = builder.grid[Pos::new(4, 4)].as_ref().unwrap();
        assert!(sealed.room_indices.is_empty(), "backfilled walls are ownerless");
    }

    #[test]
    fn fully_walled_room_is_left_untouched() {
        let mut cells = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                let kind = if x == 1 && y == 1 { TileKind::Floor } else { TileKind::Wall };
                cells.push((Pos::new(x + 3, y + 3), kind));
            }
        }
        let mut builder = LevelBuilder::new(10, 10);
        builder.add_room(room_from_cells(&cells));

        let before: Vec<Option<TileKind>> = builder
            .grid
            .positions()
            .map(|p| builder.grid[p].as_ref().map(|c| c.kind))
            .collect();
        seal_perimeter(&mut builder);
        let after: Vec<Option<TileKind>> = builder
            .grid
            .positions()
            .map(|p| builder.grid[p].as_ref().map(|c| c.kind))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn floor_at_the_grid_border_is_sealed_inside_the_grid_only() {
        let mut builder = LevelBuilder::new(10, 10);
        builder.add_room(room_from_cells(&[(Pos::new(0, 0), TileKind::Floor)]));

        seal_perimeter(&mut builder);

        for pos in [Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)] {
            assert_eq!(
                builder.grid[pos].as_ref().map(|c| c.kind),
                Some(TileKind::Wall)
            );
        }
    }
}
