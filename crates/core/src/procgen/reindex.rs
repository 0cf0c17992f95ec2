//! Level re-indexing.
//!
//! After carving, the provisional room list no longer matches the grid:
//! corridors merge rooms, and some doors end up joining a room to itself.
//! This pass rebuilds rooms from the grid by flooding walkable regions
//! with doors as region boundaries, then re-derives the connection list
//! and demotes doors that no longer join two distinct rooms.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Pos, TileKind};

use super::generator::GenEvent;
use super::grid::{CARDINAL_OFFSETS, DIAGONAL_OFFSETS, Grid, bounding_extents};
use super::model::{LevelCell, LevelData, Room, RoomConnection, RoomKind, RoomTile};
use super::placement::LevelBuilder;

pub(super) fn index_level(builder: LevelBuilder, events: &mut Vec<GenEvent>) -> LevelData {
    let mut grid = builder.grid;

    let start = grid
        .positions()
        .find(|&p| grid[p].as_ref().is_some_and(|c| c.kind == TileKind::Floor));

    let mut rooms: Vec<Room> = Vec::new();
    let mut seen = BTreeSet::new();
    let mut doors: Vec<Pos> = Vec::new();
    let mut door_set = BTreeSet::new();
    let mut room_of: BTreeMap<Pos, usize> = BTreeMap::new();

    // Doors found while flooding one region seed the next. A grid with
    // no floor at all has nothing to index.
    let mut search_stack: Vec<Pos> = start.into_iter().collect();
    while let Some(seed) = search_stack.pop() {
        let (floors, walls) = flood_room(
            seed,
            &grid,
            &mut seen,
            &mut doors,
            &mut door_set,
            &mut search_stack,
        );
        if floors.is_empty() && walls.is_empty() {
            continue;
        }

        let positions: Vec<Pos> = walls.iter().chain(floors.iter()).copied().collect();
        let (max_width, max_height) = bounding_extents(&positions);
        let index = rooms.len();
        for &pos in &positions {
            room_of.insert(pos, index);
            if let Some(cell) = &mut grid[pos] {
                cell.room_indices = vec![index];
            }
        }

        rooms.push(Room {
            tiles: positions
                .iter()
                .map(|&pos| RoomTile {
                    pos,
                    kind: grid[pos].as_ref().map_or(TileKind::Floor, |c| c.kind),
                })
                .collect(),
            outline: walls,
            connectable_edges: Default::default(),
            exits: Vec::new(),
            max_width,
            max_height,
            kind: RoomKind::Unknown,
        });
    }

    // Re-derive connections from the doors, demoting any door whose
    // cardinal neighbours resolve to fewer than two rooms.
    let mut connections = Vec::new();
    for door in doors {
        let mut adjacent: Vec<usize> = Vec::new();
        for offset in CARDINAL_OFFSETS {
            // Neighbouring doors belong to no rebuilt room and resolve
            // to nothing.
            if let Some(&index) = room_of.get(&(door + offset))
                && !adjacent.contains(&index)
            {
                adjacent.push(index);
            }
        }

        if adjacent.len() > 1 {
            if let Some(cell) = &mut grid[door] {
                cell.room_indices = vec![adjacent[0], adjacent[1]];
            }
            connections.push(RoomConnection::new(adjacent[0], adjacent[1], door));
        } else if let Some(&owner) = adjacent.first() {
            // A door joining a room to itself is just a floor tile.
            if let Some(cell) = &mut grid[door] {
                cell.kind = TileKind::Floor;
                cell.room_indices = vec![owner];
            }
            rooms[owner].tiles.push(RoomTile { pos: door, kind: TileKind::Floor });
            room_of.insert(door, owner);
            events.push(GenEvent::DoorDemoted { door, room: owner });
        }
    }

    // Cells the flood never claimed are inert debris (walls buried
    // behind walls). Strip their stale memberships so the grid carries
    // only live indices.
    let live_doors: BTreeSet<Pos> = connections.iter().map(|c| c.door).collect();
    for pos in grid.positions() {
        if room_of.contains_key(&pos) || live_doors.contains(&pos) {
            continue;
        }
        if let Some(cell) = &mut grid[pos] {
            if cell.kind == TileKind::Door {
                cell.kind = TileKind::Wall;
            }
            cell.room_indices.clear();
        }
    }

    LevelData { grid, rooms, connections }
}

/// Collects one walkable region starting at `seed`. Walls bound the
/// region; doors bound it too but are queued as seeds so the flood later
/// continues on their far side.
fn flood_room(
    seed: Pos,
    grid: &Grid<Option<LevelCell>>,
    seen: &mut BTreeSet<Pos>,
    doors: &mut Vec<Pos>,
    door_set: &mut BTreeSet<Pos>,
    search_stack: &mut Vec<Pos>,
) -> (Vec<Pos>, Vec<Pos>) {
    let mut floors = Vec::new();
    let mut walls = Vec::new();

    // (position, whether this is the region's seed cell)
    let mut stack = vec![(seed, true)];
    while let Some((pos, is_seed)) = stack.pop() {
        // Doors are revisitable: a door seen from one side must still be
        // able to seed the region on its other side.
        if seen.contains(&pos) && !door_set.contains(&pos) {
            continue;
        }
        seen.insert(pos);

        let Some(cell) = grid.get(pos).and_then(|c| c.as_ref()) else {
            continue;
        };

        match cell.kind {
            TileKind::Wall => walls.push(pos),
            TileKind::Floor => {
                floors.push(pos);
                for offset in DIAGONAL_OFFSETS.iter().rev() {
                    stack.push((pos + *offset, false));
                }
            }
            TileKind::Door => {
                if door_set.insert(pos) {
                    doors.push(pos);
                    search_stack.push(pos);
                } else if is_seed {
                    for offset in DIAGONAL_OFFSETS.iter().rev() {
                        stack.push((pos + *offset, false));
                    }
                }
            }
        }
    }

    (floors, walls)
}
