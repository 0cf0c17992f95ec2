//! Generation parameters.

use serde::{Deserialize, Serialize};

/// Tunable inputs to level generation. The defaults match a standard
/// 90x33 play field filled to roughly 60% with rooms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Fraction of the grid area that room tiles must reach before
    /// placement stops.
    pub target_area_fraction: f64,
    /// Consecutive failed room placements tolerated before generation
    /// gives up.
    pub placement_attempt_budget: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 90,
            height: 33,
            target_area_fraction: 0.6,
            placement_attempt_budget: 64,
        }
    }
}

impl GenerationConfig {
    /// Total room area, in cells, that placement aims for.
    pub fn target_area(&self) -> usize {
        (self.width as f64 * self.height as f64 * self.target_area_fraction) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_area_matches_the_play_field() {
        let config = GenerationConfig::default();
        assert_eq!(config.target_area(), (90.0_f64 * 33.0 * 0.6) as usize);
    }

    #[test]
    fn partial_deserialization_falls_back_to_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"width": 120}"#).unwrap();
        assert_eq!(config.width, 120);
        assert_eq!(config.height, 33);
        assert_eq!(config.placement_attempt_budget, 64);
    }
}
