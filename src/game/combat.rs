//! # Combat
//!
//! Damage resolution used for both player attacks and enemy counter-attacks.
//!
//! ```text
//! damage = max(1, ceil((attack / 2) * atk_mod - (defense / 2) * def_mod))
//! ```
//!
//! The two modifiers are drawn once per attack from configurable ranges.

use crate::{DelveError, DelveResult, Unit};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest damage any attack can deal.
pub const MINIMUM_DAMAGE: u32 = 1;

/// Inclusive range a damage modifier is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierRange {
    pub min: f64,
    pub max: f64,
}

impl ModifierRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always yields `value`.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Requires finite bounds with `0 <= min <= max`.
    pub fn validate(&self, name: &str) -> DelveResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DelveError::InvalidState(format!(
                "{} range {}..={} is not finite",
                name, self.min, self.max
            )));
        }
        if self.min < 0.0 || self.min > self.max {
            return Err(DelveError::InvalidState(format!(
                "{} range {}..={} must satisfy 0 <= min <= max",
                name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draws a uniform value from a validated range. Degenerate ranges skip the RNG.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Damage modifier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Multiplier on half the attacker's attack
    pub attack_modifier: ModifierRange,
    /// Multiplier on half the defender's defense
    pub defense_modifier: ModifierRange,
}

impl CombatConfig {
    /// Uses the same modifiers for every attack.
    pub fn fixed(attack_modifier: f64, defense_modifier: f64) -> Self {
        Self {
            attack_modifier: ModifierRange::fixed(attack_modifier),
            defense_modifier: ModifierRange::fixed(defense_modifier),
        }
    }

    /// Rejects ranges that would reverse or ignore a stat.
    pub fn validate(&self) -> DelveResult<()> {
        self.attack_modifier.validate("attack_modifier")?;
        self.defense_modifier.validate("defense_modifier")
    }

    /// Samples a modifier pair for one attack.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DamageRoll {
        DamageRoll {
            attack_modifier: self.attack_modifier.sample(rng),
            defense_modifier: self.defense_modifier.sample(rng),
        }
    }

    /// Rolls modifiers and resolves damage from `attacker` against `defender`.
    pub fn resolve<R: Rng + ?Sized>(&self, attacker: &Unit, defender: &Unit, rng: &mut R) -> u32 {
        let roll = self.roll(rng);
        calculate_damage(attacker.attack(), defender.defense(), roll)
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_modifier: ModifierRange::new(0.9, 1.1),
            defense_modifier: ModifierRange::new(0.45, 0.6),
        }
    }
}

/// Modifiers drawn for a single attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub attack_modifier: f64,
    pub defense_modifier: f64,
}

/// Applies the damage formula. Never returns less than [`MINIMUM_DAMAGE`].
///
/// # Examples
///
/// ```
/// use delve::{calculate_damage, DamageRoll};
///
/// let roll = DamageRoll { attack_modifier: 1.0, defense_modifier: 0.5 };
/// // ceil(10 / 2 * 1.0 - 4 / 2 * 0.5) = ceil(4.0) = 4
/// assert_eq!(calculate_damage(10, 4, roll), 4);
/// // Heavy armour still takes a point of damage
/// assert_eq!(calculate_damage(1, 100, roll), 1);
/// ```
pub fn calculate_damage(attack: u32, defense: u32, roll: DamageRoll) -> u32 {
    let offense = f64::from(attack) / 2.0 * roll.attack_modifier;
    let mitigation = f64::from(defense) / 2.0 * roll.defense_modifier;
    let raw = (offense - mitigation).ceil();

    if raw < f64::from(MINIMUM_DAMAGE) {
        MINIMUM_DAMAGE
    } else {
        raw as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitDetails;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_damage_rounds_up() {
        let roll = DamageRoll {
            attack_modifier: 1.0,
            defense_modifier: 0.5,
        };
        // 7 / 2 - 3 / 2 * 0.5 = 3.5 - 0.75 = 2.75
        assert_eq!(calculate_damage(7, 3, roll), 3);
    }

    #[test]
    fn test_damage_floor_is_one() {
        let roll = DamageRoll {
            attack_modifier: 0.9,
            defense_modifier: 0.6,
        };
        assert_eq!(calculate_damage(0, 0, roll), 1);
        assert_eq!(calculate_damage(2, 50, roll), 1);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let config = CombatConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let roll = config.roll(&mut rng);
            assert!((0.9..=1.1).contains(&roll.attack_modifier));
            assert!((0.45..=0.6).contains(&roll.defense_modifier));
        }
    }

    #[test]
    fn test_fixed_config_is_deterministic() {
        let config = CombatConfig::fixed(1.0, 0.5);
        let mut rng = StdRng::seed_from_u64(1);
        let attacker = Unit::new(&UnitDetails::new("a", 10, 12, 0));
        let defender = Unit::new(&UnitDetails::new("d", 10, 0, 8));
        for _ in 0..10 {
            // 6 - 2 = 4
            assert_eq!(config.resolve(&attacker, &defender, &mut rng), 4);
        }
    }

    #[test]
    fn test_range_validation() {
        assert!(CombatConfig::default().validate().is_ok());
        assert!(CombatConfig::fixed(0.0, 0.0).validate().is_ok());

        assert!(ModifierRange::new(5.0, -1.0).validate("atk").is_err());
        assert!(ModifierRange::new(1.1, 0.9).validate("atk").is_err());
        assert!(ModifierRange::new(-0.5, 0.5).validate("def").is_err());
        assert!(ModifierRange::new(0.5, f64::INFINITY).validate("def").is_err());
        assert!(ModifierRange::fixed(f64::NAN).validate("def").is_err());

        let reversed = CombatConfig {
            attack_modifier: ModifierRange::new(1.1, 0.9),
            ..CombatConfig::default()
        };
        assert!(matches!(
            reversed.validate(),
            Err(DelveError::InvalidState(_))
        ));
    }

    #[test]
    fn test_midpoint() {
        let range = ModifierRange::new(0.45, 0.6);
        assert!((range.midpoint() - 0.525).abs() < 1e-9);
    }
}
