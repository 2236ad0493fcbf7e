//! # Data Module
//!
//! Stat blocks and dungeon themes consumed by the engine.
//!
//! The engine only reads numeric stats and id lists from these records; asset
//! keys and frame lists pass through untouched for the presentation layer.
//! [`JsonDataProvider`] loads the records from JSON arrays and ships a built-in
//! set embedded from `data/*.json`.

use crate::{DelveError, DelveResult, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_THEMES: &str = include_str!("../../data/themes.json");
const BUILTIN_UNITS: &str = include_str!("../../data/units.json");
const BUILTIN_ITEMS: &str = include_str!("../../data/items.json");

fn default_xp() -> u32 {
    1
}

fn default_lock_distance() -> u32 {
    1
}

/// Base stats for a player or enemy at level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDetails {
    pub id: String,
    pub name: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    /// Experience awarded on defeat at level 1
    #[serde(default = "default_xp")]
    pub xp: u32,
    /// Manhattan radius of item tiles locked while this unit is revealed
    #[serde(default = "default_lock_distance")]
    pub tile_lock_distance: u32,
    #[serde(default)]
    pub asset_key: Option<String>,
}

impl UnitDetails {
    /// Builds a stat block with default xp and lock distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::UnitDetails;
    ///
    /// let bat = UnitDetails::new("bat", 4, 3, 1);
    /// assert_eq!(bat.name, "bat");
    /// assert_eq!(bat.tile_lock_distance, 1);
    /// ```
    pub fn new(id: &str, hp: u32, attack: u32, defense: u32) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            hp,
            attack,
            defense,
            xp: default_xp(),
            tile_lock_distance: default_lock_distance(),
            asset_key: None,
        }
    }
}

/// Signed stat deltas carried by an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StatModifiers {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
}

/// Item stat block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub modifiers: StatModifiers,
    #[serde(default)]
    pub asset_key: Option<String>,
}

/// Sprite sheet reference with one or more frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFrames {
    pub asset_key: String,
    #[serde(default)]
    pub frames: Vec<u32>,
}

/// Visual and population settings for a dungeon floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonTheme {
    pub id: String,
    pub name: String,
    pub floor: AssetFrames,
    pub walls: AssetFrames,
    pub exit: AssetFrames,
    /// Unit ids enemies are drawn from
    pub enemies: Vec<String>,
    /// Item ids consumables are drawn from
    #[serde(default)]
    pub consumables: Vec<String>,
}

impl DungeonTheme {
    /// Picks the wall frame for a [`crate::Grid::wall_layout`] bitmask.
    ///
    /// Falls back to the first frame (or 0) when the theme has fewer frames.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DataProvider, JsonDataProvider};
    ///
    /// let data = JsonDataProvider::builtin().unwrap();
    /// let cellar = data.theme("cellar").unwrap();
    /// assert_eq!(cellar.wall_frame(9), 0);
    /// ```
    pub fn wall_frame(&self, layout: u8) -> u32 {
        self.walls
            .frames
            .get(usize::from(layout))
            .or_else(|| self.walls.frames.first())
            .copied()
            .unwrap_or(0)
    }
}

/// Read-only lookup of themes and stat blocks by id.
pub trait DataProvider {
    fn theme(&self, id: &str) -> DelveResult<&DungeonTheme>;
    fn unit(&self, id: &str) -> DelveResult<&UnitDetails>;
    fn item(&self, id: &str) -> DelveResult<&ItemDetails>;
}

/// In-memory provider backed by JSON arrays.
#[derive(Debug, Clone, Default)]
pub struct JsonDataProvider {
    themes: HashMap<String, DungeonTheme>,
    units: HashMap<String, UnitDetails>,
    items: HashMap<String, ItemDetails>,
}

impl JsonDataProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the data set embedded in the crate.
    pub fn builtin() -> DelveResult<Self> {
        Self::from_json(BUILTIN_THEMES, BUILTIN_UNITS, BUILTIN_ITEMS)
    }

    /// Parses three JSON arrays of themes, units and items.
    pub fn from_json(themes: &str, units: &str, items: &str) -> DelveResult<Self> {
        let mut provider = Self::new();
        for theme in serde_json::from_str::<Vec<DungeonTheme>>(themes)? {
            provider.insert_theme(theme);
        }
        for unit in serde_json::from_str::<Vec<UnitDetails>>(units)? {
            provider.insert_unit(unit);
        }
        for item in serde_json::from_str::<Vec<ItemDetails>>(items)? {
            provider.insert_item(item);
        }

        log::debug!(
            "Loaded {} themes, {} units, {} items",
            provider.themes.len(),
            provider.units.len(),
            provider.items.len()
        );
        Ok(provider)
    }

    /// Loads `themes.json`, `units.json` and `items.json` from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> DelveResult<Self> {
        let dir = dir.as_ref();
        let themes = std::fs::read_to_string(dir.join("themes.json"))?;
        let units = std::fs::read_to_string(dir.join("units.json"))?;
        let items = std::fs::read_to_string(dir.join("items.json"))?;
        Self::from_json(&themes, &units, &items)
    }

    pub fn insert_theme(&mut self, theme: DungeonTheme) {
        self.themes.insert(theme.id.clone(), theme);
    }

    pub fn insert_unit(&mut self, unit: UnitDetails) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn insert_item(&mut self, item: ItemDetails) {
        self.items.insert(item.id.clone(), item);
    }
}

impl DataProvider for JsonDataProvider {
    fn theme(&self, id: &str) -> DelveResult<&DungeonTheme> {
        self.themes.get(id).ok_or_else(|| DelveError::UnknownData {
            kind: "theme",
            id: id.to_string(),
        })
    }

    fn unit(&self, id: &str) -> DelveResult<&UnitDetails> {
        self.units.get(id).ok_or_else(|| DelveError::UnknownData {
            kind: "unit",
            id: id.to_string(),
        })
    }

    fn item(&self, id: &str) -> DelveResult<&ItemDetails> {
        self.items.get(id).ok_or_else(|| DelveError::UnknownData {
            kind: "item",
            id: id.to_string(),
        })
    }
}
