//! Room placement against a growing level grid.
//!
//! The first room lands at a random in-bounds position. Every later room
//! is slid along a connectable edge of an existing room until one of its
//! speculative exits lines up with an edge cell without illegal overlap,
//! then the shared wall cell becomes a door.

use std::collections::BTreeSet;

use crate::rng::Random;
use crate::types::{Cardinal, Pos, TileKind};

use super::grid::Grid;
use super::model::{LevelCell, Room, RoomConnection};
use super::rooms::generate_room;

/// Mutable placement state shared by the generation passes.
pub(super) struct LevelBuilder {
    pub grid: Grid<Option<LevelCell>>,
    pub rooms: Vec<Room>,
    pub connections: Vec<RoomConnection>,
    pub total_area: usize,
}

impl LevelBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::filled(width, height, None),
            rooms: Vec::new(),
            connections: Vec::new(),
            total_area: 0,
        }
    }

    /// Registers a room, stamping its tiles into the grid. Cells already
    /// owned by another room keep their tile kind and gain an index.
    pub fn add_room(&mut self, room: Room) -> usize {
        self.rooms.push(room);
        let index = self.rooms.len() - 1;
        for tile in &self.rooms[index].tiles {
            match &mut self.grid[tile.pos] {
                Some(cell) => cell.room_indices.push(index),
                empty => {
                    *empty = Some(LevelCell { kind: tile.kind, room_indices: vec![index] });
                }
            }
        }
        self.total_area += self.rooms[index].tiles.len();
        index
    }

    /// Generates and places the seed room at a uniformly random position
    /// that keeps its bounding box in the grid. Returns false when the
    /// generated room does not fit the grid at all.
    pub fn place_first_room(&mut self, random: &mut Random) -> bool {
        let mut room = generate_room(random);
        // Rooms are origin-anchored, so tiles span `max_width + 1` by
        // `max_height + 1` cells from wherever the anchor lands.
        let span_x = self.grid.width() as i32 - room.max_width;
        let span_y = self.grid.height() as i32 - room.max_height;
        if span_x < 1 || span_y < 1 {
            return false;
        }
        let position = Pos::new(random.int_between(0, span_x), random.int_between(0, span_y));
        room.translate(position);
        self.add_room(room);
        true
    }

    /// Attempts to attach `room` to any existing room. Target rooms and
    /// exits are tried in random order; edge cells in stored order. On
    /// success the shared cell becomes a door and the connection is
    /// recorded. Returns false when no alignment passes the checks.
    pub fn place_connected_room(&mut self, mut room: Room, random: &mut Random) -> bool {
        let mut target_indices: Vec<usize> = (0..self.rooms.len()).collect();

        while !target_indices.is_empty() {
            let target_index = random.take(&mut target_indices);

            let mut exits = room.exits.clone();
            while !exits.is_empty() {
                let exit = random.take(&mut exits);
                let connecting = exit.cardinal.opposite();
                let edge = self.rooms[target_index].connectable_edges.get(connecting).to_vec();

                for &edge_position in &edge {
                    let offset = edge_position - exit.pos;
                    if !self.placement_fits(&room, offset, target_index, &edge) {
                        continue;
                    }

                    room.translate(offset);
                    let door = exit.pos + offset;

                    self.trim_consumed_edges(&mut room, exit.cardinal, target_index, connecting);

                    let new_index = self.add_room(room);
                    self.carve_door(door, new_index, target_index);
                    self.connections.push(RoomConnection::new(new_index, target_index, door));
                    return true;
                }
            }
        }
        false
    }

    fn placement_fits(&self, room: &Room, offset: Pos, target_index: usize, edge: &[Pos]) -> bool {
        let positions: Vec<Pos> = room.tiles.iter().map(|t| t.pos + offset).collect();

        if !positions.iter().all(|&p| self.grid.in_bounds(p)) {
            return false;
        }

        // Overlap with anything other than the target room is illegal.
        let overlaps_foreign = positions.iter().any(|&p| {
            self.grid[p]
                .as_ref()
                .is_some_and(|cell| !cell.room_indices.contains(&target_index))
        });
        if overlaps_foreign {
            return false;
        }

        // Within the target room, only the connecting edge may be shared.
        let edge_set: BTreeSet<Pos> = edge.iter().copied().collect();
        let target_body: BTreeSet<Pos> = self.rooms[target_index]
            .tiles
            .iter()
            .map(|t| t.pos)
            .filter(|p| !edge_set.contains(p))
            .collect();
        !positions.iter().any(|p| target_body.contains(p))
    }

    /// Cells shared by both connecting edges are used up and can never
    /// host another doorway.
    fn trim_consumed_edges(
        &mut self,
        room: &mut Room,
        room_side: Cardinal,
        target_index: usize,
        target_side: Cardinal,
    ) {
        let target_edge = self.rooms[target_index].connectable_edges.get_mut(target_side);
        let consumed: BTreeSet<Pos> = room
            .connectable_edges
            .get(room_side)
            .iter()
            .filter(|p| target_edge.contains(p))
            .copied()
            .collect();
        target_edge.retain(|p| !consumed.contains(p));
        room.connectable_edges.get_mut(room_side).retain(|p| !consumed.contains(p));
    }

    fn carve_door(&mut self, door: Pos, room_a: usize, room_b: usize) {
        if let Some(cell) = &mut self.grid[door] {
            cell.kind = TileKind::Door;
        }
        for index in [room_a, room_b] {
            if let Some(tile) = self.rooms[index].tile_mut(door) {
                tile.kind = TileKind::Door;
            }
        }
    }
}
