pub mod procgen;
pub mod rng;
pub mod types;

pub use procgen::{
    GenEvent, GenerateError, GenerationConfig, Grid, LevelData, LevelGenerator, generate_level,
};
pub use rng::Random;
pub use types::*;
