//! # Tiles
//!
//! Per-cell dungeon state: terrain, fog-of-war, ambush lock and occupants.
//!
//! A tile holds at most one enemy and at most one item; both may be present at
//! once. Behaviour dispatches on which occupant slots are filled rather than on
//! tile subtypes.

use crate::{DelveError, DelveResult, ItemDetails, Position, StatModifiers, Unit};
use serde::{Deserialize, Serialize};

/// Static terrain of a tile. Fixed once a floor has been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Wall,
    Floor,
}

/// Fog-of-war state.
///
/// Floor tiles move from `Hidden` to `Revealed` at most once per generated
/// floor. Walls are always `Revealed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fog {
    Hidden,
    Revealed,
}

/// Ambush lock flag, independent of fog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockStatus {
    Unlocked,
    Locked,
}

/// Kind of item that can sit on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Descends to the next floor when used
    Exit,
    /// Applies its stat modifiers to the player when used
    Consumable,
}

/// An item placed on a tile. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Data id the item was created from
    pub id: String,
    /// Display name
    pub name: String,
    /// Exit or consumable
    pub kind: ItemKind,
    /// Signed stat deltas applied on use
    pub modifiers: StatModifiers,
}

impl Item {
    /// Creates an item from its stat block.
    pub fn from_details(details: &ItemDetails) -> Self {
        Self {
            id: details.id.clone(),
            name: details.name.clone(),
            kind: details.kind,
            modifiers: details.modifiers,
        }
    }

    /// Returns true if using this item descends to the next floor.
    pub fn is_exit(&self) -> bool {
        self.kind == ItemKind::Exit
    }
}

/// A single cell of the dungeon grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    terrain: Terrain,
    fog: Fog,
    lock: LockStatus,
    enemy: Option<Unit>,
    item: Option<Item>,
}

impl Tile {
    /// Creates an empty tile. Floors start hidden, walls start revealed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Fog, Position, Terrain, Tile};
    ///
    /// let tile = Tile::new(Position::new(2, 3), Terrain::Floor);
    /// assert_eq!(tile.fog(), Fog::Hidden);
    /// assert!(tile.is_vacant());
    /// ```
    pub fn new(position: Position, terrain: Terrain) -> Self {
        Self {
            position,
            terrain,
            fog: Self::initial_fog(terrain),
            lock: LockStatus::Unlocked,
            enemy: None,
            item: None,
        }
    }

    fn initial_fog(terrain: Terrain) -> Fog {
        match terrain {
            Terrain::Wall => Fog::Revealed,
            Terrain::Floor => Fog::Hidden,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn x(&self) -> i32 {
        self.position.x
    }

    pub fn y(&self) -> i32 {
        self.position.y
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn fog(&self) -> Fog {
        self.fog
    }

    pub fn lock_status(&self) -> LockStatus {
        self.lock
    }

    pub fn is_wall(&self) -> bool {
        self.terrain == Terrain::Wall
    }

    pub fn is_hidden(&self) -> bool {
        self.fog == Fog::Hidden
    }

    pub fn is_revealed(&self) -> bool {
        self.fog == Fog::Revealed
    }

    pub fn is_locked(&self) -> bool {
        self.lock == LockStatus::Locked
    }

    pub fn enemy(&self) -> Option<&Unit> {
        self.enemy.as_ref()
    }

    pub fn enemy_mut(&mut self) -> Option<&mut Unit> {
        self.enemy.as_mut()
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn has_item(&self) -> bool {
        self.item.is_some()
    }

    /// Returns true if an enemy with hp left stands here.
    pub fn has_live_enemy(&self) -> bool {
        self.enemy.as_ref().is_some_and(Unit::is_alive)
    }

    /// Floor with neither an enemy nor an item.
    pub fn is_vacant(&self) -> bool {
        self.terrain == Terrain::Floor && self.enemy.is_none() && self.item.is_none()
    }

    /// Changes the terrain during floor setup. Fog only resets when the
    /// terrain actually changes.
    pub(crate) fn set_terrain(&mut self, terrain: Terrain) {
        if self.terrain == terrain {
            return;
        }
        self.terrain = terrain;
        self.fog = Self::initial_fog(terrain);
    }

    /// Puts an enemy on this tile. Fails if one is already present.
    pub fn place_enemy(&mut self, unit: Unit) -> DelveResult<()> {
        if self.enemy.is_some() || self.is_wall() {
            return Err(DelveError::TileOccupied {
                position: self.position,
            });
        }
        self.enemy = Some(unit);
        Ok(())
    }

    /// Puts an item on this tile. Fails if one is already present.
    pub fn place_item(&mut self, item: Item) -> DelveResult<()> {
        if self.item.is_some() || self.is_wall() {
            return Err(DelveError::TileOccupied {
                position: self.position,
            });
        }
        self.item = Some(item);
        Ok(())
    }

    /// Lifts the fog. Returns false if the tile was already revealed.
    pub fn reveal(&mut self) -> bool {
        if self.fog == Fog::Revealed {
            return false;
        }
        self.fog = Fog::Revealed;
        true
    }

    /// Restores the fog on a floor tile. Only floor regeneration does this.
    pub fn hide(&mut self) {
        if self.terrain == Terrain::Floor {
            self.fog = Fog::Hidden;
        }
    }

    pub(crate) fn lock(&mut self) {
        self.lock = LockStatus::Locked;
    }

    pub(crate) fn unlock(&mut self) {
        self.lock = LockStatus::Unlocked;
    }

    /// Empties both occupant slots, returning whatever was there.
    pub fn remove_occupant(&mut self) -> (Option<Unit>, Option<Item>) {
        (self.enemy.take(), self.item.take())
    }

    /// Consumes the item on this tile.
    pub fn use_item(&mut self) -> DelveResult<Item> {
        self.item.take().ok_or(DelveError::NoItem {
            position: self.position,
        })
    }

    /// Returns a floor tile to its freshly generated state.
    pub(crate) fn reset(&mut self) {
        self.hide();
        self.unlock();
        self.remove_occupant();
    }
}
