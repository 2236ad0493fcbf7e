//! # Units
//!
//! Combat statistics shared by the player and enemies, with the damage,
//! healing, experience and level-up rules.

use crate::{StatModifiers, UnitDetails};
use serde::{Deserialize, Serialize};

/// Fraction of a base stat gained per level above 1.
pub const STAT_GROWTH_PER_LEVEL: f64 = 0.42;

/// Scales a base stat to a level: `floor(base + base * 0.42 * (level - 1))`.
///
/// # Examples
///
/// ```
/// use delve::calculate_stat;
///
/// assert_eq!(calculate_stat(10, 1), 10);
/// assert_eq!(calculate_stat(10, 2), 14);
/// assert_eq!(calculate_stat(10, 3), 18);
/// ```
pub fn calculate_stat(base: u32, level: u32) -> u32 {
    let base = f64::from(base);
    let levels_gained = f64::from(level.saturating_sub(1));
    (base + base * STAT_GROWTH_PER_LEVEL * levels_gained).floor() as u32
}

/// Experience needed to leave `level`: `round(0.04 L^3 + 0.8 L^2 + 2 L)`.
///
/// # Examples
///
/// ```
/// use delve::xp_to_next_level;
///
/// assert_eq!(xp_to_next_level(1), 3);
/// assert_eq!(xp_to_next_level(2), 8);
/// assert_eq!(xp_to_next_level(3), 14);
/// ```
pub fn xp_to_next_level(level: u32) -> u32 {
    let level = f64::from(level);
    (0.04 * level.powi(3) + 0.8 * level.powi(2) + 2.0 * level).round() as u32
}

/// A combatant: the player or an enemy.
///
/// Invariant: `0 <= hp <= max_hp`. A unit with zero hp is dead and ignores
/// further damage and healing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: String,
    name: String,
    base: UnitDetails,
    hp: u32,
    max_hp: u32,
    attack: u32,
    defense: u32,
    level: u32,
    xp: u32,
    xp_to_next: u32,
    attack_bonus: i32,
    defense_bonus: i32,
}

impl Unit {
    /// Spawns a level 1 unit at full health from its stat block.
    pub fn new(details: &UnitDetails) -> Self {
        Self {
            id: details.id.clone(),
            name: details.name.clone(),
            base: details.clone(),
            hp: details.hp,
            max_hp: details.hp,
            attack: details.attack,
            defense: details.defense,
            level: 1,
            xp: 0,
            xp_to_next: xp_to_next_level(1),
            attack_bonus: 0,
            defense_bonus: 0,
        }
    }

    /// Spawns a unit already raised to `level`, at full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Unit, UnitDetails};
    ///
    /// let details = UnitDetails::new("rat", 10, 4, 2);
    /// let rat = Unit::at_level(&details, 3);
    /// assert_eq!(rat.level(), 3);
    /// assert_eq!(rat.max_hp(), 18);
    /// assert_eq!(rat.hp(), rat.max_hp());
    /// ```
    pub fn at_level(details: &UnitDetails, level: u32) -> Self {
        let mut unit = Self::new(details);
        while unit.level < level {
            unit.level_up();
        }
        unit
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stat block this unit was spawned from.
    pub fn details(&self) -> &UnitDetails {
        &self.base
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn attack(&self) -> u32 {
        self.attack
    }

    pub fn defense(&self) -> u32 {
        self.defense
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn xp_to_next(&self) -> u32 {
        self.xp_to_next
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Manhattan radius of item tiles this unit locks while alive and revealed.
    pub fn lock_distance(&self) -> u32 {
        self.base.tile_lock_distance
    }

    /// Experience awarded for defeating this unit, scaled to its level.
    pub fn xp_reward(&self) -> u32 {
        calculate_stat(self.base.xp, self.level)
    }

    /// Removes hp, never going below zero. Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Adds a signed hp delta, clamped to `[0, max_hp]`. Returns the applied delta.
    ///
    /// Negative amounts model direct hp loss from items.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let before = i64::from(self.hp);
        let after = (before + i64::from(amount)).clamp(0, i64::from(self.max_hp));
        self.hp = after as u32;
        (after - before) as i32
    }

    /// Adds experience without levelling. See [`Unit::can_level_up`].
    pub fn gain_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    pub fn can_level_up(&self) -> bool {
        self.xp >= self.xp_to_next
    }

    /// Advances one level.
    ///
    /// Leftover experience carries over, stats are recomputed from the base
    /// block and current hp grows by the max hp increase.
    pub fn level_up(&mut self) {
        self.xp = self.xp.saturating_sub(self.xp_to_next);
        self.level += 1;

        let previous_max_hp = self.max_hp;
        self.max_hp = calculate_stat(self.base.hp, self.level);
        self.recompute_combat_stats();

        if self.is_alive() {
            let gained = self.max_hp.saturating_sub(previous_max_hp);
            self.hp = (self.hp + gained).min(self.max_hp);
        }

        self.xp_to_next = xp_to_next_level(self.level);
    }

    /// Adds experience and levels up as many times as it allows.
    ///
    /// Returns the number of levels gained.
    pub fn grant_xp(&mut self, amount: u32) -> u32 {
        self.gain_xp(amount);
        let mut levels = 0;
        while self.can_level_up() {
            self.level_up();
            levels += 1;
        }
        levels
    }

    /// Applies a consumable's modifiers: hp through [`Unit::heal`], attack and
    /// defense as permanent bonuses.
    pub fn apply_modifiers(&mut self, modifiers: &StatModifiers) -> i32 {
        self.attack_bonus += modifiers.attack;
        self.defense_bonus += modifiers.defense;
        self.recompute_combat_stats();
        self.heal(modifiers.hp)
    }

    fn recompute_combat_stats(&mut self) {
        let with_bonus = |stat: u32, bonus: i32| (i64::from(stat) + i64::from(bonus)).max(0) as u32;
        self.attack = with_bonus(calculate_stat(self.base.attack, self.level), self.attack_bonus);
        self.defense = with_bonus(calculate_stat(self.base.defense, self.level), self.defense_bonus);
    }
}
