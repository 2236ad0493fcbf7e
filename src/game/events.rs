//! # Game Events
//!
//! Notifications the turn controller records while resolving actions, and the
//! running statistics derived from them.

use crate::Position;
use serde::{Deserialize, Serialize};

/// How prominently a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageImportance {
    Info,
    Warning,
    Critical,
}

/// Something that happened during play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Tiles lost their fog in one explore cascade
    TilesRevealed { positions: Vec<Position> },
    /// The player struck an enemy
    EnemyDamaged {
        position: Position,
        damage: u32,
        remaining_hp: u32,
    },
    /// An enemy's hp reached zero
    EnemyDied {
        position: Position,
        name: String,
        xp_reward: u32,
    },
    /// Enemies dealt their combined turn-end damage
    PlayerDamaged { damage: u32, attackers: usize },
    /// The player gained a level
    LevelUp { level: u32 },
    /// A consumable was used up
    ItemUsed {
        position: Position,
        item_id: String,
        hp_change: i32,
    },
    /// The player took the exit
    Descended { depth: u32 },
    /// Free-form message for the player
    Message {
        text: String,
        importance: MessageImportance,
    },
    /// The player's hp reached zero
    PlayerDied { depth: u32 },
}

/// Run statistics accumulated from [`GameEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Turns whose action completed
    pub turns_taken: u32,
    pub enemies_defeated: u32,
    pub items_used: u32,
    pub tiles_revealed: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    /// Deepest floor reached
    pub max_depth_reached: u32,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TilesRevealed { positions } => {
                self.tiles_revealed += positions.len() as u32;
            }
            GameEvent::EnemyDamaged { damage, .. } => {
                self.damage_dealt += u64::from(*damage);
            }
            GameEvent::EnemyDied { .. } => {
                self.enemies_defeated += 1;
            }
            GameEvent::PlayerDamaged { damage, .. } => {
                self.damage_taken += u64::from(*damage);
            }
            GameEvent::ItemUsed { .. } => {
                self.items_used += 1;
            }
            GameEvent::Descended { depth } => {
                self.max_depth_reached = self.max_depth_reached.max(*depth);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_from_events() {
        let mut stats = GameStatistics::new();
        stats.update_from_event(&GameEvent::EnemyDamaged {
            position: Position::new(2, 2),
            damage: 4,
            remaining_hp: 1,
        });
        stats.update_from_event(&GameEvent::EnemyDied {
            position: Position::new(2, 2),
            name: "Rat".to_string(),
            xp_reward: 1,
        });
        stats.update_from_event(&GameEvent::PlayerDamaged {
            damage: 3,
            attackers: 2,
        });
        stats.update_from_event(&GameEvent::TilesRevealed {
            positions: vec![Position::new(1, 1), Position::new(1, 2)],
        });

        assert_eq!(stats.damage_dealt, 4);
        assert_eq!(stats.enemies_defeated, 1);
        assert_eq!(stats.damage_taken, 3);
        assert_eq!(stats.tiles_revealed, 2);
    }

    #[test]
    fn test_max_depth_only_grows() {
        let mut stats = GameStatistics::new();
        stats.update_from_event(&GameEvent::Descended { depth: 3 });
        stats.update_from_event(&GameEvent::Descended { depth: 2 });
        assert_eq!(stats.max_depth_reached, 3);
    }

    #[test]
    fn test_messages_leave_statistics_alone() {
        let mut stats = GameStatistics::new();
        stats.update_from_event(&GameEvent::Message {
            text: "hello".to_string(),
            importance: MessageImportance::Info,
        });
        assert_eq!(stats, GameStatistics::default());
    }
}
