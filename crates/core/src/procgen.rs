//! Procedural dungeon generation split into coherent submodules.
//!
//! The pipeline places irregularly shaped rooms against each other's edges,
//! stitches nearby unconnected rooms with corridors, seals the playable
//! perimeter with walls, and finally re-derives the room and connection
//! index from the tile grid itself. The grid is the single source of truth;
//! room and connection lists are derived artifacts.

pub mod config;
pub mod model;

mod flood;
mod generator;
mod grid;
mod placement;
mod reindex;
mod rooms;
mod sealing;
mod stitching;

pub use config::GenerationConfig;
pub use generator::{GenEvent, GenerateError, LevelGenerator, generate_level};
pub use grid::Grid;
pub use model::{
    ConnectableEdges, Exit, LevelCell, LevelData, LevelGrid, Room, RoomConnection, RoomKind,
    RoomTile,
};
