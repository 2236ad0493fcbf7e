//! # Dungeon Map
//!
//! One dungeon floor: the tile grid, the depth counter, and the rules that
//! read and mutate them.
//!
//! The explore cascade reveals a target tile together with its hidden,
//! unlocked orthogonal neighbours. Any live enemy uncovered that way locks the
//! item tiles around it (an ambush) until [`DungeonMap::validate_locks`] finds
//! no live, revealed enemy left in range.

use crate::{
    DataProvider, DelveError, DelveResult, DungeonTheme, GenerationConfig, Generator, Grid, Item,
    Join, PopulationGenerator, Position, Presenter, Tile, Unit,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// A single dungeon floor and its depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonMap {
    grid: Grid,
    depth: u32,
}

impl DungeonMap {
    /// Creates an unpopulated map at depth 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self::at_depth(width, height, 0)
    }

    /// Creates an unpopulated map at the given depth.
    pub fn at_depth(width: u32, height: u32, depth: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            depth,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for hand-built floors.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Advances to the next floor's depth. Returns the new depth.
    pub fn descend(&mut self) -> u32 {
        self.depth += 1;
        self.depth
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.grid.get(x, y)
    }

    /// Resets every floor tile and populates the floor for the current depth.
    ///
    /// Enemies are spawned at unit level `max(depth, 1)`.
    pub fn generate(
        &mut self,
        data: &dyn DataProvider,
        theme: &DungeonTheme,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        for tile in self.grid.tiles_mut().filter(|tile| !tile.is_wall()) {
            tile.reset();
        }

        let generator = PopulationGenerator::new(data, theme, self.depth);
        generator.generate(&mut self.grid, config, rng)?;
        generator.validate(&self.grid, config)?;

        log::info!(
            "{} populated depth {} of theme '{}'",
            generator.generator_type(),
            self.depth,
            theme.id
        );
        Ok(())
    }

    /// A revealed tile holding a live enemy.
    pub fn can_attack_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y)
            .is_some_and(|tile| tile.is_revealed() && tile.has_live_enemy())
    }

    /// A revealed, unlocked tile holding an item.
    pub fn can_interact_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y)
            .is_some_and(|tile| tile.is_revealed() && tile.has_item() && !tile.is_locked())
    }

    /// A hidden, unlocked tile.
    pub fn can_reveal_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y)
            .is_some_and(|tile| tile.is_hidden() && !tile.is_locked())
    }

    /// Reveals the target and its hidden, unlocked orthogonal neighbours.
    ///
    /// All tiles are marked revealed first, then ambush locks are applied for
    /// every live enemy among them, then one reveal request per tile is issued
    /// against `join`. Returns the newly revealed positions.
    pub fn explore_at<P: Presenter + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        presenter: &mut P,
        join: &Join,
    ) -> Vec<Position> {
        let Some(target) = self.tile(x, y) else {
            return Vec::new();
        };

        let mut selected = Vec::new();
        if target.is_hidden() {
            selected.push(target.position());
        }
        selected.extend(
            self.grid
                .neighbors(x, y, false)
                .into_iter()
                .filter(|tile| tile.is_hidden() && !tile.is_locked())
                .map(Tile::position),
        );

        let mut revealed = Vec::with_capacity(selected.len());
        for position in selected {
            if let Some(tile) = self.grid.tile_mut(position) {
                if tile.reveal() {
                    revealed.push(position);
                }
            }
        }

        let ambushers: Vec<(Position, u32)> = revealed
            .iter()
            .filter_map(|&position| self.grid.tile(position))
            .filter_map(|tile| {
                tile.enemy()
                    .filter(|enemy| enemy.is_alive())
                    .map(|enemy| (tile.position(), enemy.lock_distance()))
            })
            .collect();
        for (position, radius) in ambushers {
            self.lock_items_around(position, radius);
        }

        for &position in &revealed {
            if let Some(tile) = self.grid.tile(position) {
                presenter.reveal(tile, join.token());
            }
        }

        self.validate_locks();
        log::debug!("explore ({}, {}) revealed {} tiles", x, y, revealed.len());
        revealed
    }

    fn lock_items_around(&mut self, center: Position, radius: u32) {
        for tile in self.grid.tiles_mut() {
            if tile.has_item() && tile.position().manhattan_distance(center) <= radius {
                if !tile.is_locked() {
                    log::debug!("lock {:?} (enemy at {:?})", tile.position(), center);
                }
                tile.lock();
            }
        }
    }

    /// Unlocks every locked tile with no live, revealed enemy in range.
    ///
    /// Returns the positions that were unlocked.
    pub fn validate_locks(&mut self) -> Vec<Position> {
        let guards: Vec<(Position, u32)> = self
            .visible_live_enemies()
            .into_iter()
            .map(|(position, enemy)| (position, enemy.lock_distance()))
            .collect();

        let mut unlocked = Vec::new();
        for tile in self.grid.tiles_mut().filter(|tile| tile.is_locked()) {
            let position = tile.position();
            let guarded = guards
                .iter()
                .any(|&(guard, radius)| guard.manhattan_distance(position) <= radius);
            if !guarded {
                tile.unlock();
                unlocked.push(position);
            }
        }

        if !unlocked.is_empty() {
            log::debug!("unlocked {:?}", unlocked);
        }
        unlocked
    }

    /// Every revealed tile.
    pub fn revealed_tiles(&self) -> Vec<&Tile> {
        self.grid.tiles().filter(|tile| tile.is_revealed()).collect()
    }

    /// Floor tiles with no enemy and no item.
    pub fn empty_tiles(&self) -> Vec<&Tile> {
        self.grid.tiles().filter(|tile| tile.is_vacant()).collect()
    }

    /// Every enemy on the floor, dead or alive.
    pub fn enemies(&self) -> Vec<(Position, &Unit)> {
        self.grid
            .tiles()
            .filter_map(|tile| tile.enemy().map(|enemy| (tile.position(), enemy)))
            .collect()
    }

    /// Live enemies standing on revealed tiles.
    pub fn visible_live_enemies(&self) -> Vec<(Position, &Unit)> {
        self.grid
            .tiles()
            .filter(|tile| tile.is_revealed())
            .filter_map(|tile| {
                tile.enemy()
                    .filter(|enemy| enemy.is_alive())
                    .map(|enemy| (tile.position(), enemy))
            })
            .collect()
    }

    /// Deals `damage` to the enemy at the coordinate. Returns the enemy afterwards.
    ///
    /// The tile must pass [`DungeonMap::can_attack_at`].
    pub fn damage_enemy_at(&mut self, x: i32, y: i32, damage: u32) -> DelveResult<&Unit> {
        if !self.can_attack_at(x, y) {
            return Err(DelveError::InvalidAction(format!(
                "no attackable enemy at ({}, {})",
                x, y
            )));
        }

        let position = Position::new(x, y);
        let enemy = self
            .grid
            .require_mut(position)?
            .enemy_mut()
            .ok_or_else(|| DelveError::InvalidState(format!("enemy vanished at {:?}", position)))?;
        enemy.take_damage(damage);
        Ok(enemy)
    }

    /// Consumes the item at the coordinate.
    ///
    /// Hidden or locked tiles are rejected with [`DelveError::InvalidAction`],
    /// empty ones with [`DelveError::NoItem`].
    pub fn use_item_at(&mut self, x: i32, y: i32) -> DelveResult<Item> {
        let position = Position::new(x, y);
        let tile = self.grid.require_mut(position)?;
        if tile.is_hidden() || tile.is_locked() {
            return Err(DelveError::InvalidAction(format!(
                "item at {:?} is not reachable",
                position
            )));
        }
        tile.use_item()
    }

    /// Sprite frame of the wall at the coordinate, `None` for floor tiles.
    pub fn wall_frame_at(&self, x: i32, y: i32, theme: &DungeonTheme) -> Option<u32> {
        self.tile(x, y)
            .filter(|tile| tile.is_wall())
            .map(|_| theme.wall_frame(self.grid.wall_layout(x, y)))
    }
}
