//! Generation pipeline driver.
//!
//! Runs the passes in order: seed room placement, connected growth until
//! the area target, corridor stitching, perimeter sealing, and a final
//! re-index of the grid. All randomness flows through one seeded handle,
//! so the same seed and config always produce the same level.

use std::error::Error;
use std::fmt;

use crate::rng::Random;
use crate::types::Pos;

use super::config::GenerationConfig;
use super::model::LevelData;
use super::placement::LevelBuilder;
use super::reindex::index_level;
use super::rooms::generate_room;
use super::sealing::seal_perimeter;
use super::stitching::stitch_corridors;

/// Diagnostic record of a recoverable oddity during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenEvent {
    /// A candidate room fit nowhere and was thrown away.
    RoomDiscarded { consecutive_failures: u32 },
    /// A corridor trace crossed exactly one wall and was not carved.
    CorridorSkippedSingleWall { room_a: usize, room_b: usize },
    /// Re-indexing found a door joining a room to itself and turned it
    /// into a floor tile.
    DoorDemoted { door: Pos, room: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// Too many candidate rooms were discarded in a row; the area target
    /// is unreachable for this room-size distribution.
    PlacementBudgetExhausted { attempts: u32 },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlacementBudgetExhausted { attempts } => {
                write!(f, "discarded {attempts} rooms in a row without placing one")
            }
        }
    }
}

impl Error for GenerateError {}

pub struct LevelGenerator {
    random: Random,
    config: GenerationConfig,
    events: Vec<GenEvent>,
}

impl LevelGenerator {
    pub fn new(seed: u64, config: GenerationConfig) -> Self {
        Self { random: Random::from_seed(seed), config, events: Vec::new() }
    }

    /// Runs the full pipeline once. Calling this again continues the same
    /// random sequence and produces a different level.
    pub fn generate(&mut self) -> Result<LevelData, GenerateError> {
        self.events.clear();

        let mut builder = LevelBuilder::new(self.config.width, self.config.height);

        // The seed room draws against the same budget: a grid too small
        // for the room-size distribution fails instead of panicking.
        let mut consecutive_failures = 0u32;
        while !builder.place_first_room(&mut self.random) {
            consecutive_failures += 1;
            self.events.push(GenEvent::RoomDiscarded { consecutive_failures });
            if consecutive_failures >= self.config.placement_attempt_budget {
                return Err(GenerateError::PlacementBudgetExhausted {
                    attempts: consecutive_failures,
                });
            }
        }

        let target_area = self.config.target_area();
        let mut consecutive_failures = 0u32;
        while builder.total_area < target_area {
            let room = generate_room(&mut self.random);
            if builder.place_connected_room(room, &mut self.random) {
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
                self.events.push(GenEvent::RoomDiscarded { consecutive_failures });
                if consecutive_failures >= self.config.placement_attempt_budget {
                    return Err(GenerateError::PlacementBudgetExhausted {
                        attempts: consecutive_failures,
                    });
                }
            }
        }

        stitch_corridors(&mut builder, &mut self.random, &mut self.events);
        seal_perimeter(&mut builder);
        Ok(index_level(builder, &mut self.events))
    }

    /// Diagnostics recorded by the most recent `generate` call.
    pub fn events(&self) -> &[GenEvent] {
        &self.events
    }
}

/// One-shot generation, discarding diagnostics.
pub fn generate_level(seed: u64, config: &GenerationConfig) -> Result<LevelData, GenerateError> {
    LevelGenerator::new(seed, config.clone()).generate()
}
