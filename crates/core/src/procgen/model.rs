//! Public data model for generated levels.
//!
//! The level grid owns the ground truth; rooms and connections are derived
//! bookkeeping. Grid cells refer to rooms by index into the level's room
//! list, which is append-only during placement and replaced wholesale by
//! re-indexing, so indices stay stable for the lifetime of the list they
//! were minted against.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Cardinal, Pos, TileKind};

use super::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomKind {
    Circle,
    Rect,
    Bite,
    Overlap,
    /// Rooms derived by re-indexing carry no shape information.
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomTile {
    pub pos: Pos,
    pub kind: TileKind,
}

/// Candidate doorway seed on a room's outline, consumed during placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exit {
    pub pos: Pos,
    pub cardinal: Cardinal,
}

/// Outline cells per side eligible to host a new room's doorway.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectableEdges {
    pub north: Vec<Pos>,
    pub south: Vec<Pos>,
    pub east: Vec<Pos>,
    pub west: Vec<Pos>,
}

impl ConnectableEdges {
    pub fn get(&self, cardinal: Cardinal) -> &[Pos] {
        match cardinal {
            Cardinal::North => &self.north,
            Cardinal::South => &self.south,
            Cardinal::East => &self.east,
            Cardinal::West => &self.west,
        }
    }

    pub fn get_mut(&mut self, cardinal: Cardinal) -> &mut Vec<Pos> {
        match cardinal {
            Cardinal::North => &mut self.north,
            Cardinal::South => &mut self.south,
            Cardinal::East => &mut self.east,
            Cardinal::West => &mut self.west,
        }
    }

    fn translate(&mut self, offset: Pos) {
        for cardinal in Cardinal::ALL {
            for p in self.get_mut(cardinal) {
                *p = *p + offset;
            }
        }
    }
}

/// A standalone shape until placed, after which the level's room list owns
/// it and the grid holds back-references by index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    /// Every cell of the room, walls and floors both.
    pub tiles: Vec<RoomTile>,
    /// Wall cells bounding the shape.
    pub outline: Vec<Pos>,
    pub connectable_edges: ConnectableEdges,
    pub exits: Vec<Exit>,
    /// Bounding extents of the final point set.
    pub max_width: i32,
    pub max_height: i32,
    pub kind: RoomKind,
}

impl Room {
    pub fn translate(&mut self, offset: Pos) {
        for tile in &mut self.tiles {
            tile.pos = tile.pos + offset;
        }
        for p in &mut self.outline {
            *p = *p + offset;
        }
        self.connectable_edges.translate(offset);
        for exit in &mut self.exits {
            exit.pos = exit.pos + offset;
        }
    }

    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Interior cells, i.e. tiles that are not walls.
    pub fn floor_tiles(&self) -> impl Iterator<Item = &RoomTile> {
        self.tiles.iter().filter(|t| t.kind != TileKind::Wall)
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut RoomTile> {
        self.tiles.iter_mut().find(|t| t.pos == pos)
    }
}

/// One door or corridor joint between exactly two distinct rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomConnection {
    pub room_a: usize,
    pub room_b: usize,
    pub door: Pos,
}

impl RoomConnection {
    pub fn new(room_a: usize, room_b: usize, door: Pos) -> Self {
        debug_assert_ne!(room_a, room_b, "connection must join two distinct rooms");
        Self { room_a, room_b, door }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCell {
    pub kind: TileKind,
    /// Rooms this cell belongs to. More than two memberships violates the
    /// placement invariants and is rejected during corridor stitching.
    pub room_indices: Vec<usize>,
}

/// `None` is void: unplaced space, neither walkable nor wall.
pub type LevelGrid = Grid<Option<LevelCell>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelData {
    pub grid: LevelGrid,
    pub rooms: Vec<Room>,
    pub connections: Vec<RoomConnection>,
}

impl LevelData {
    pub fn tile_at(&self, pos: Pos) -> Option<TileKind> {
        self.grid.get(pos).and_then(|cell| cell.as_ref()).map(|cell| cell.kind)
    }

    pub fn room_indices_at(&self, pos: Pos) -> &[usize] {
        self.grid
            .get(pos)
            .and_then(|cell| cell.as_ref())
            .map(|cell| cell.room_indices.as_slice())
            .unwrap_or(&[])
    }

    /// Stable byte encoding of the whole level, for determinism checks and
    /// fingerprinting. Not a persistence format.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        for pos in self.grid.positions() {
            match &self.grid[pos] {
                None => bytes.push(0),
                Some(cell) => {
                    bytes.push(match cell.kind {
                        TileKind::Wall => 1,
                        TileKind::Floor => 2,
                        TileKind::Door => 3,
                    });
                    bytes.push(cell.room_indices.len() as u8);
                    for &index in &cell.room_indices {
                        bytes.extend((index as u32).to_le_bytes());
                    }
                }
            }
        }

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.tiles.len() as u32).to_le_bytes());
            for tile in &room.tiles {
                bytes.extend(tile.pos.y.to_le_bytes());
                bytes.extend(tile.pos.x.to_le_bytes());
            }
        }

        bytes.extend((self.connections.len() as u32).to_le_bytes());
        for connection in &self.connections {
            bytes.extend((connection.room_a as u32).to_le_bytes());
            bytes.extend((connection.room_b as u32).to_le_bytes());
            bytes.extend(connection.door.y.to_le_bytes());
            bytes.extend(connection.door.x.to_le_bytes());
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
