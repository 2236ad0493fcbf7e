//! # Rendering Module
//!
//! Plain-text view of a floor for the command-line front end and for debugging.
//!
//! Glyphs:
//!
//! | glyph | meaning |
//! |---|---|
//! | `#` | wall |
//! | `~` | hidden floor |
//! | `.` | revealed empty floor |
//! | `>` | exit |
//! | `!` | consumable |
//! | `*` | locked item |
//! | letter | live enemy (first letter of its name) |
//! | `%` | dead enemy |

use crate::{DungeonMap, GameEvent, GameStatistics, ItemKind, Tile, Unit};

/// Character used for a tile in the text view.
///
/// # Examples
///
/// ```
/// use delve::{glyph_for, Position, Terrain, Tile};
///
/// let wall = Tile::new(Position::new(0, 0), Terrain::Wall);
/// assert_eq!(glyph_for(&wall), '#');
/// let floor = Tile::new(Position::new(1, 1), Terrain::Floor);
/// assert_eq!(glyph_for(&floor), '~');
/// ```
pub fn glyph_for(tile: &Tile) -> char {
    if tile.is_wall() {
        return '#';
    }
    if tile.is_hidden() {
        return '~';
    }
    if let Some(enemy) = tile.enemy() {
        if enemy.is_alive() {
            return enemy
                .name()
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('M');
        }
    }
    match tile.item() {
        Some(_) if tile.is_locked() => '*',
        Some(item) if item.kind == ItemKind::Exit => '>',
        Some(_) => '!',
        None if tile.enemy().is_some() => '%',
        None => '.',
    }
}

/// Renders the map as rows of glyphs with column and row indices.
pub fn render_ascii(map: &DungeonMap) -> String {
    let mut out = String::from("   ");
    for x in 0..map.width() {
        out.push_str(&(x % 10).to_string());
    }
    out.push('\n');

    for y in 0..map.height() as i32 {
        out.push_str(&format!("{:>2} ", y));
        for x in 0..map.width() as i32 {
            out.push(map.tile(x, y).map(glyph_for).unwrap_or(' '));
        }
        out.push('\n');
    }
    out
}

/// One-line summary of the player.
pub fn render_status(player: &Unit, depth: u32) -> String {
    format!(
        "{} | depth {} | level {} | hp {}/{} | atk {} | def {} | xp {}/{}",
        player.name(),
        depth,
        player.level(),
        player.hp(),
        player.max_hp(),
        player.attack(),
        player.defense(),
        player.xp(),
        player.xp_to_next()
    )
}

/// Multi-line summary of the run statistics.
pub fn render_statistics(stats: &GameStatistics) -> String {
    format!(
        "turns {} | enemies defeated {} | items used {} | tiles revealed {}\ndamage dealt {} | damage taken {} | deepest floor {}",
        stats.turns_taken,
        stats.enemies_defeated,
        stats.items_used,
        stats.tiles_revealed,
        stats.damage_dealt,
        stats.damage_taken,
        stats.max_depth_reached
    )
}

/// Player-facing text for an event.
pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::TilesRevealed { positions } => format!("Revealed {} tiles.", positions.len()),
        GameEvent::EnemyDamaged {
            position,
            damage,
            remaining_hp,
        } => format!(
            "You hit the enemy at ({}, {}) for {} ({} hp left).",
            position.x, position.y, damage, remaining_hp
        ),
        GameEvent::EnemyDied {
            name, xp_reward, ..
        } => format!("The {} dies. +{} xp.", name, xp_reward),
        GameEvent::PlayerDamaged { damage, attackers } => {
            format!("{} enemies strike you for {} damage.", attackers, damage)
        }
        GameEvent::LevelUp { level } => format!("You reached level {}!", level),
        GameEvent::ItemUsed {
            item_id, hp_change, ..
        } => format!("You use the {} ({:+} hp).", item_id, hp_change),
        GameEvent::Descended { depth } => format!("You descend to floor {}.", depth),
        GameEvent::Message { text, .. } => text.clone(),
        GameEvent::PlayerDied { depth } => format!("You were slain on floor {}.", depth),
    }
}

/// Bounded message log for the text front end.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: Vec<String>,
    max_messages: usize,
}

impl MessageLog {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: max_messages.max(1),
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        // Keep only the most recent messages
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The last `count` messages, oldest first.
    pub fn recent(&self, count: usize) -> &[String] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }
}

/// Message panel listing the most recent log entries.
pub fn render_messages(log: &MessageLog, count: usize) -> String {
    let mut out = String::new();
    for message in log.recent(count) {
        out.push_str("  ");
        out.push_str(message);
        out.push('\n');
    }
    out
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImmediatePresenter, Item, Join, Position, StatModifiers, UnitDetails};

    #[test]
    fn test_fresh_map_rendering() {
        let map = DungeonMap::new(5, 4);
        let text = render_ascii(&map);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "   01234");
        assert_eq!(lines[1], " 0 #####");
        assert_eq!(lines[2], " 1 #~~~#");
        assert_eq!(lines[4], " 3 #####");
    }

    #[test]
    fn test_revealed_contents() {
        let mut map = DungeonMap::new(6, 5);
        map.grid_mut()
            .get_mut(2, 2)
            .unwrap()
            .place_enemy(Unit::new(&UnitDetails::new("rat", 3, 1, 0)))
            .unwrap();
        map.grid_mut()
            .get_mut(2, 1)
            .unwrap()
            .place_item(Item {
                id: "exit".to_string(),
                name: "Exit".to_string(),
                kind: ItemKind::Exit,
                modifiers: StatModifiers::default(),
            })
            .unwrap();
        map.explore_at(2, 2, &mut ImmediatePresenter, &Join::new());

        assert_eq!(glyph_for(map.tile(2, 2).unwrap()), 'R');
        assert_eq!(glyph_for(map.tile(2, 1).unwrap()), '*');
        assert_eq!(glyph_for(map.tile(1, 2).unwrap()), '.');

        map.damage_enemy_at(2, 2, 10).unwrap();
        map.validate_locks();
        assert_eq!(glyph_for(map.tile(2, 2).unwrap()), '%');
        assert_eq!(glyph_for(map.tile(2, 1).unwrap()), '>');
    }

    #[test]
    fn test_message_log_is_bounded() {
        let mut log = MessageLog::new(2);
        for i in 0..3 {
            log.add_message(format!("m{}", i));
        }
        assert_eq!(log.messages(), &["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn test_message_panel_shows_recent() {
        let mut log = MessageLog::default();
        assert_eq!(render_messages(&log, 3), "");

        for i in 0..5 {
            log.add_message(format!("m{}", i));
        }
        assert_eq!(log.recent(2), &["m3".to_string(), "m4".to_string()]);
        assert_eq!(log.recent(10).len(), 5);
        assert_eq!(render_messages(&log, 2), "  m3\n  m4\n");
    }

    #[test]
    fn test_event_text() {
        let text = describe_event(&GameEvent::EnemyDamaged {
            position: Position::new(1, 2),
            damage: 3,
            remaining_hp: 0,
        });
        assert!(text.contains("(1, 2)"));
        assert_eq!(
            describe_event(&GameEvent::Descended { depth: 2 }),
            "You descend to floor 2."
        );
    }
}
