//! # Delve
//!
//! Rules engine for a turn-based, tile-revealing dungeon crawler.
//!
//! ## Architecture Overview
//!
//! The engine is organised around a handful of small, strongly typed pieces:
//!
//! - **Grid / Tile**: fixed-size tile index with terrain, fog, lock and occupant state
//! - **Unit**: combat statistics, damage, healing and levelling rules
//! - **DungeonMap**: explore cascade, ambush locks and the `can_*_at` predicates
//! - **TurnController**: the phase state machine driving player action, feedback
//!   and enemy counter-attack
//! - **Generation**: placement of the exit, enemies and consumables on a floor
//!
//! Rendering, animation and asset loading live outside the crate. They talk to the
//! core through the [`Presenter`] trait (fire-and-forget requests with completion
//! tokens) and the [`DataProvider`] trait (stat blocks and dungeon themes).

pub mod data;
pub mod game;
pub mod generation;
pub mod input;
pub mod presentation;
pub mod rendering;

// Core module re-exports
pub use data::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use presentation::*;
pub use rendering::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A theme, unit or item id is missing from the data provider
    #[error("Unknown {kind} id: {id}")]
    UnknownData { kind: &'static str, id: String },

    /// A tile already holds an occupant of the same kind
    #[error("Tile {position:?} is already occupied")]
    TileOccupied { position: Position },

    /// A tile holds no item to use
    #[error("Tile {position:?} holds no item")]
    NoItem { position: Position },

    /// Coordinate outside the grid
    #[error("Position {position:?} is out of bounds")]
    OutOfBounds { position: Position },
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 10;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 8;

    /// Enemies placed on every floor
    pub const DEFAULT_ENEMY_COUNT: usize = 3;

    /// Consumable items placed on every floor
    pub const DEFAULT_CONSUMABLE_COUNT: usize = 2;

    /// Theme used when none is configured
    pub const DEFAULT_THEME_ID: &str = "crypt";

    /// Stat block used for the player
    pub const DEFAULT_PLAYER_ID: &str = "hero";

    /// Item id of the floor exit
    pub const EXIT_ITEM_ID: &str = "exit";

    /// Largest grid side accepted by [`crate::GameConfig::validate`]
    pub const MAX_GRID_SIDE: u32 = 1024;

    /// Largest tile count accepted by [`crate::GameConfig::validate`]
    pub const MAX_GRID_TILES: u32 = 65_536;
}

/// Top-level session configuration.
///
/// Groups the grid size, data ids and the generation/combat tuning. Can be
/// built in code or read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the session RNG
    pub seed: u64,
    /// Grid width in tiles, including the border walls
    pub width: u32,
    /// Grid height in tiles, including the border walls
    pub height: u32,
    /// Dungeon theme id looked up in the data provider
    pub theme_id: String,
    /// Player stat block id looked up in the data provider
    pub player_id: String,
    /// Floor population settings
    pub generation: GenerationConfig,
    /// Damage modifier ranges
    pub combat: CombatConfig,
}

impl GameConfig {
    /// Creates the default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GameConfig;
    ///
    /// let config = GameConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert_eq!(config.width, delve::config::DEFAULT_DUNGEON_WIDTH);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_DUNGEON_WIDTH,
            height: config::DEFAULT_DUNGEON_HEIGHT,
            theme_id: config::DEFAULT_THEME_ID.to_string(),
            player_id: config::DEFAULT_PLAYER_ID.to_string(),
            generation: GenerationConfig::new(),
            combat: CombatConfig::default(),
        }
    }

    /// Creates a configuration with deterministic damage modifiers.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            combat: CombatConfig::fixed(1.0, 0.5),
            generation: GenerationConfig::for_testing(),
            ..Self::new(seed)
        }
    }

    /// Reads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> DelveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the grid size and the combat modifier ranges.
    ///
    /// The grid must hold at least one interior floor tile and stay within
    /// [`config::MAX_GRID_SIDE`] and [`config::MAX_GRID_TILES`].
    pub fn validate(&self) -> DelveResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(DelveError::InvalidState(format!(
                "grid {}x{} has no interior floor",
                self.width, self.height
            )));
        }

        let tiles = self.width.checked_mul(self.height);
        if self.width > config::MAX_GRID_SIDE
            || self.height > config::MAX_GRID_SIDE
            || tiles.map_or(true, |tiles| tiles > config::MAX_GRID_TILES)
        {
            return Err(DelveError::InvalidState(format!(
                "grid {}x{} exceeds the {} tile limit",
                self.width,
                self.height,
                config::MAX_GRID_TILES
            )));
        }

        self.combat.validate()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.theme_id, "crypt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let parsed = GameConfig::from_json(r#"{ "seed": 9, "width": 12 }"#).unwrap();
        assert_eq!(parsed.seed, 9);
        assert_eq!(parsed.width, 12);
        assert_eq!(parsed.height, config::DEFAULT_DUNGEON_HEIGHT);
    }

    #[test]
    fn test_config_rejects_degenerate_grid() {
        let result = GameConfig::from_json(r#"{ "width": 2, "height": 2 }"#);
        assert!(matches!(result, Err(DelveError::InvalidState(_))));
    }

    #[test]
    fn test_config_rejects_oversized_grid() {
        let result = GameConfig::from_json(r#"{ "width": 4294967295, "height": 3 }"#);
        assert!(matches!(result, Err(DelveError::InvalidState(_))));

        let mut config = GameConfig::default();
        config.width = config::MAX_GRID_SIDE;
        config.height = config::MAX_GRID_SIDE;
        assert!(config.validate().is_err());

        config.height = config::MAX_GRID_TILES / config::MAX_GRID_SIDE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_combat_ranges() {
        let reversed = GameConfig::from_json(
            r#"{ "combat": {
                "attack_modifier": { "min": 5.0, "max": -1.0 },
                "defense_modifier": { "min": 0.45, "max": 0.6 }
            } }"#,
        );
        assert!(matches!(reversed, Err(DelveError::InvalidState(_))));

        let mut config = GameConfig::default();
        config.combat.defense_modifier = ModifierRange::new(-0.5, 0.5);
        assert!(config.validate().is_err());

        config.combat.defense_modifier = ModifierRange::fixed(0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_json() {
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(DelveError::Serde(_))
        ));
    }
}
