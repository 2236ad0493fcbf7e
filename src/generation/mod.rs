//! # Generation Module
//!
//! Floor population: the exit, enemies and consumables.
//!
//! Layouts are fixed (a walled rectangle), so generation is purely about
//! placing entities. Every entity lands on a distinct empty floor tile taken
//! from a uniformly shuffled list of candidates.

pub mod population;

pub use population::*;

use crate::{config, DelveError, DelveResult, Grid, ItemKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for floor population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Enemies placed on every floor
    pub enemy_count: usize,
    /// Consumables placed on every floor
    pub consumable_count: usize,
    /// Item id used for the floor exit
    pub exit_item_id: String,
}

impl GenerationConfig {
    /// Creates the default population settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.entity_count(), 1 + config.enemy_count + config.consumable_count);
    /// ```
    pub fn new() -> Self {
        Self {
            enemy_count: config::DEFAULT_ENEMY_COUNT,
            consumable_count: config::DEFAULT_CONSUMABLE_COUNT,
            exit_item_id: config::EXIT_ITEM_ID.to_string(),
        }
    }

    /// Creates a sparser configuration for small test maps.
    pub fn for_testing() -> Self {
        Self {
            enemy_count: 2,
            consumable_count: 1,
            ..Self::new()
        }
    }

    /// Total entities placed per floor, the exit included.
    pub fn entity_count(&self) -> usize {
        1 + self.enemy_count + self.consumable_count
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Fills `target` using the configuration and random number generator.
    fn generate(&self, target: &mut T, config: &GenerationConfig, rng: &mut StdRng)
        -> DelveResult<()>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Checks entity counts and that nothing sits on a wall.
    pub fn validate_population(grid: &Grid, config: &GenerationConfig) -> DelveResult<()> {
        let mut exits = 0;
        let mut consumables = 0;
        let mut enemies = 0;

        for tile in grid.tiles() {
            if tile.is_wall() && (tile.enemy().is_some() || tile.has_item()) {
                return Err(DelveError::GenerationFailed(format!(
                    "entity placed on wall at {:?}",
                    tile.position()
                )));
            }
            if tile.enemy().is_some() {
                enemies += 1;
            }
            match tile.item().map(|item| item.kind) {
                Some(ItemKind::Exit) => exits += 1,
                Some(ItemKind::Consumable) => consumables += 1,
                None => {}
            }
        }

        if exits != 1 {
            return Err(DelveError::GenerationFailed(format!(
                "expected exactly one exit, found {}",
                exits
            )));
        }
        if enemies != config.enemy_count || consumables != config.consumable_count {
            return Err(DelveError::GenerationFailed(format!(
                "expected {} enemies and {} consumables, found {} and {}",
                config.enemy_count, config.consumable_count, enemies, consumables
            )));
        }

        Ok(())
    }
}
