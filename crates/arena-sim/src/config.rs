//! Simulation configuration.
//!
//! [`SimConfig`] is loaded once before the simulation is built and never
//! changes afterwards. Every field has a default, so a config document only
//! needs to name what it overrides:
//!
//! ```
//! use arena_sim::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "tps": 30, "mob_spawning": false }"#).unwrap();
//! assert_eq!(config.tps, 30);
//! assert_eq!(config.max_entities, SimConfig::default().max_entities);
//! ```

use serde::{Deserialize, Serialize};

use crate::SimError;

/// Tunables for one simulation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation ticks per second. Durations in the static tables are in
    /// seconds and are converted with this rate.
    pub tps: u32,
    /// Entity store capacity.
    pub max_entities: usize,
    /// Side of a spatial hash cell.
    pub spatial_cell_size: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Reflection hops allowed per damage application. Reflected hits never
    /// reflect again, so any value of 1 or more allows the single bounce and
    /// 0 disables reflection.
    pub max_reflection_depth: u32,
    /// Chance that each spawned revival petal saves its flower from a lethal hit.
    pub revival_chance: f32,
    pub rng_seed: u64,
    /// Run the zone spawner.
    pub mob_spawning: bool,
    /// Live mob cap per zone, scaled by the zone's density.
    pub max_mobs_per_zone: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tps: 20,
            max_entities: 16_384,
            spatial_cell_size: 200.0,
            arena_width: 40_000.0,
            arena_height: 4_000.0,
            max_reflection_depth: 4,
            revival_chance: 0.5,
            rng_seed: 0x5eed_a7e4,
            mob_spawning: true,
            max_mobs_per_zone: 150,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.tps == 0 {
            return Err(SimError::InvalidConfig("tps must be positive".to_owned()));
        }
        if self.max_entities == 0 {
            return Err(SimError::InvalidConfig(
                "max_entities must be positive".to_owned(),
            ));
        }
        if !(self.spatial_cell_size > 0.0 && self.spatial_cell_size.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "spatial_cell_size must be positive and finite, got {}",
                self.spatial_cell_size
            )));
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "arena must have positive size, got {}x{}",
                self.arena_width, self.arena_height
            )));
        }
        if !(0.0..=1.0).contains(&self.revival_chance) {
            return Err(SimError::InvalidConfig(format!(
                "revival_chance must be within [0, 1], got {}",
                self.revival_chance
            )));
        }
        Ok(())
    }

    /// Convert a duration in seconds to whole ticks (truncating).
    #[inline]
    pub fn ticks(&self, seconds: f32) -> u32 {
        (seconds * self.tps as f32) as u32
    }

    /// Seconds per tick.
    #[inline]
    pub fn fixed_dt(&self) -> f64 {
        1.0 / self.tps as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
