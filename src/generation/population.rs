//! # Floor Population
//!
//! Places one exit, the configured number of depth-scaled enemies and the
//! configured number of consumables on distinct empty floor tiles.

use crate::{
    generation::utils, DataProvider, DelveError, DelveResult, DungeonTheme, GenerationConfig,
    Generator, Grid, Item, Position, Unit,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Populates a freshly reset grid for one dungeon floor.
pub struct PopulationGenerator<'a> {
    data: &'a dyn DataProvider,
    theme: &'a DungeonTheme,
    level: u32,
}

impl<'a> PopulationGenerator<'a> {
    /// Creates a generator spawning enemies at unit level `level`.
    pub fn new(data: &'a dyn DataProvider, theme: &'a DungeonTheme, level: u32) -> Self {
        Self {
            data,
            theme,
            level: level.max(1),
        }
    }

    fn pick<'p>(pool: &'p [String], what: &str, rng: &mut StdRng) -> DelveResult<&'p str> {
        pool.choose(rng)
            .map(String::as_str)
            .ok_or_else(|| DelveError::GenerationFailed(format!("theme has no {} pool", what)))
    }
}

impl Generator<Grid> for PopulationGenerator<'_> {
    fn generate(
        &self,
        grid: &mut Grid,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        let mut candidates: Vec<Position> = grid
            .tiles()
            .filter(|tile| tile.is_vacant())
            .map(|tile| tile.position())
            .collect();

        if candidates.len() < config.entity_count() {
            return Err(DelveError::GenerationFailed(format!(
                "{} entities do not fit on {} empty tiles",
                config.entity_count(),
                candidates.len()
            )));
        }

        candidates.shuffle(rng);
        let mut slots = candidates.into_iter();
        // The length check above guarantees a slot for every entity.
        let mut next_slot = || {
            slots
                .next()
                .ok_or_else(|| DelveError::GenerationFailed("ran out of empty tiles".to_string()))
        };

        let exit = Item::from_details(self.data.item(&config.exit_item_id)?);
        let position = next_slot()?;
        grid.require_mut(position)?.place_item(exit)?;
        log::debug!("exit @ {:?}", position);

        for _ in 0..config.enemy_count {
            let id = Self::pick(&self.theme.enemies, "enemy", rng)?;
            let enemy = Unit::at_level(self.data.unit(id)?, self.level);
            let position = next_slot()?;
            log::debug!("{} (level {}) @ {:?}", enemy.name(), enemy.level(), position);
            grid.require_mut(position)?.place_enemy(enemy)?;
        }

        for _ in 0..config.consumable_count {
            let id = Self::pick(&self.theme.consumables, "consumable", rng)?;
            let item = Item::from_details(self.data.item(id)?);
            let position = next_slot()?;
            log::debug!("{} @ {:?}", item.name, position);
            grid.require_mut(position)?.place_item(item)?;
        }

        Ok(())
    }

    fn validate(&self, grid: &Grid, config: &GenerationConfig) -> DelveResult<()> {
        utils::validate_population(grid, config)
    }

    fn generator_type(&self) -> &'static str {
        "PopulationGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonDataProvider, DelveError};
    use std::collections::HashSet;

    fn setup() -> (JsonDataProvider, DungeonTheme) {
        let data = JsonDataProvider::builtin().unwrap();
        let theme = data.theme("crypt").unwrap().clone();
        (data, theme)
    }

    #[test]
    fn test_population_on_distinct_floor_tiles() {
        let (data, theme) = setup();
        let config = GenerationConfig::new();
        let generator = PopulationGenerator::new(&data, &theme, 1);
        let mut rng = utils::create_rng(12345);
        let mut grid = Grid::new(10, 8);

        generator.generate(&mut grid, &config, &mut rng).unwrap();
        generator.validate(&grid, &config).unwrap();

        let occupied: HashSet<Position> = grid
            .tiles()
            .filter(|tile| tile.enemy().is_some() || tile.has_item())
            .map(|tile| tile.position())
            .collect();
        assert_eq!(occupied.len(), config.entity_count());
        assert!(grid
            .tiles()
            .all(|tile| !(tile.enemy().is_some() && tile.has_item())));
    }

    #[test]
    fn test_enemies_scale_with_level() {
        let (data, theme) = setup();
        let config = GenerationConfig::new();
        let mut rng = utils::create_rng(7);
        let mut grid = Grid::new(10, 8);

        PopulationGenerator::new(&data, &theme, 4)
            .generate(&mut grid, &config, &mut rng)
            .unwrap();

        let levels: Vec<u32> = grid
            .tiles()
            .filter_map(|tile| tile.enemy())
            .map(Unit::level)
            .collect();
        assert_eq!(levels, vec![4; config.enemy_count]);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let (data, theme) = setup();
        let config = GenerationConfig::new();
        let generator = PopulationGenerator::new(&data, &theme, 1);

        let mut first = Grid::new(10, 8);
        let mut second = Grid::new(10, 8);
        generator
            .generate(&mut first, &config, &mut utils::create_rng(5))
            .unwrap();
        generator
            .generate(&mut second, &config, &mut utils::create_rng(5))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_small_map_fails() {
        let (data, theme) = setup();
        let config = GenerationConfig::new();
        let mut grid = Grid::new(3, 3); // a single floor tile
        let result = PopulationGenerator::new(&data, &theme, 1).generate(
            &mut grid,
            &config,
            &mut utils::create_rng(1),
        );
        assert!(matches!(result, Err(DelveError::GenerationFailed(_))));
    }

    #[test]
    fn test_empty_enemy_pool_fails() {
        let (data, mut theme) = setup();
        theme.enemies.clear();
        let mut grid = Grid::new(10, 8);
        let result = PopulationGenerator::new(&data, &theme, 1).generate(
            &mut grid,
            &GenerationConfig::new(),
            &mut utils::create_rng(1),
        );
        assert!(result.is_err());
    }
}
