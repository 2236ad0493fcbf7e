//! # Turn Controller
//!
//! Sequences play through a closed set of phases:
//!
//! ```text
//! CreateDungeon -> GenerateDungeon -> TurnStart -> AwaitPlayerAction
//!       -> AwaitFeedback -> TurnEnd -> TurnStart -> ...
//! ```
//!
//! Taking the exit leaves `AwaitFeedback` for `GenerateDungeon` instead of
//! `TurnEnd`. A player reduced to zero hp at turn end ends in
//! `PlayerDefeated`, which accepts no further input.
//!
//! The only mutating entry point is [`TurnController::select_tile`]. While an
//! action's presentation requests are outstanding the controller waits in
//! `AwaitFeedback`; [`TurnController::poll`] resumes it once they complete.

use crate::{
    CombatConfig, DataProvider, DelveError, DelveResult, DungeonMap, DungeonTheme, GameConfig,
    GameEvent, GameStatistics, ItemKind, Join, MessageImportance, Position, Presenter, Unit,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Phase of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Build an empty grid and advance the depth counter
    CreateDungeon,
    /// Populate the current floor
    GenerateDungeon,
    TurnStart,
    /// Waiting for [`TurnController::select_tile`]
    AwaitPlayerAction,
    /// Waiting for the committed action's presentation to complete
    AwaitFeedback,
    /// Visible enemies strike back
    TurnEnd,
    /// The player died. Terminal.
    PlayerDefeated,
}

impl Phase {
    /// True only in the phase that accepts a tile selection.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::AwaitPlayerAction)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::PlayerDefeated)
    }
}

/// Action chosen for a selected tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack(Position),
    Interact(Position),
    Reveal(Position),
}

impl PlayerAction {
    pub fn position(self) -> Position {
        match self {
            PlayerAction::Attack(position)
            | PlayerAction::Interact(position)
            | PlayerAction::Reveal(position) => position,
        }
    }
}

/// What happens once the outstanding presentation of an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FollowUp {
    TurnEnd,
    LevelUp { levels: Vec<u32> },
    Descend,
}

#[derive(Debug)]
struct PendingFeedback {
    join: Join,
    follow_up: FollowUp,
}

/// Owns the session: map, player, rng and the phase machine.
pub struct TurnController<P: Presenter> {
    config: GameConfig,
    data: Box<dyn DataProvider>,
    presenter: P,
    theme: DungeonTheme,
    map: DungeonMap,
    player: Unit,
    rng: StdRng,
    phase: Phase,
    pending: Option<PendingFeedback>,
    events: Vec<GameEvent>,
    statistics: GameStatistics,
}

impl<P: Presenter> TurnController<P> {
    /// Creates a session in [`Phase::CreateDungeon`]. Call [`TurnController::start`]
    /// to build the first floor.
    pub fn new(config: GameConfig, data: Box<dyn DataProvider>, presenter: P) -> DelveResult<Self> {
        config.validate()?;
        let player = Unit::new(data.unit(&config.player_id)?);
        let theme = data.theme(&config.theme_id)?.clone();
        let map = DungeonMap::new(config.width, config.height);

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            data,
            presenter,
            theme,
            map,
            player,
            phase: Phase::CreateDungeon,
            pending: None,
            events: Vec::new(),
            statistics: GameStatistics::new(),
        })
    }

    /// Creates a session around a prepared map and player, in [`Phase::TurnStart`].
    pub fn from_parts(
        config: GameConfig,
        data: Box<dyn DataProvider>,
        presenter: P,
        map: DungeonMap,
        player: Unit,
    ) -> DelveResult<Self> {
        let mut controller = Self::new(config, data, presenter)?;
        controller.statistics.max_depth_reached = map.depth();
        controller.map = map;
        controller.player = player;
        controller.phase = Phase::TurnStart;
        Ok(controller)
    }

    /// Runs the automatic phases until the controller waits for input.
    pub fn start(&mut self) -> DelveResult<Phase> {
        self.run_until_idle()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    pub fn player(&self) -> &Unit {
        &self.player
    }

    pub fn depth(&self) -> u32 {
        self.map.depth()
    }

    pub fn theme(&self) -> &DungeonTheme {
        &self.theme
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Picks the action a selection would trigger: attack, then interact, then reveal.
    pub fn action_at(&self, x: i32, y: i32) -> Option<PlayerAction> {
        let position = Position::new(x, y);
        if self.map.can_attack_at(x, y) {
            Some(PlayerAction::Attack(position))
        } else if self.map.can_interact_at(x, y) {
            Some(PlayerAction::Interact(position))
        } else if self.map.can_reveal_at(x, y) {
            Some(PlayerAction::Reveal(position))
        } else {
            None
        }
    }

    /// Handles a tile selection from the player.
    ///
    /// Returns the committed action, or `None` when the selection was ignored:
    /// outside [`Phase::AwaitPlayerAction`], or a tile no action applies to.
    pub fn select_tile(&mut self, x: i32, y: i32) -> DelveResult<Option<PlayerAction>> {
        if !self.phase.accepts_input() {
            log::debug!("selection ({}, {}) ignored in {:?}", x, y, self.phase);
            return Ok(None);
        }

        let Some(action) = self.action_at(x, y) else {
            log::warn!("nothing to do at ({}, {})", x, y);
            self.presenter.reject_selection(Position::new(x, y));
            return Ok(None);
        };

        log::debug!("committing {:?}", action);
        let join = Join::new();
        let follow_up = match action {
            PlayerAction::Attack(target) => self.attack(target, &join)?,
            PlayerAction::Interact(target) => self.interact(target)?,
            PlayerAction::Reveal(target) => self.reveal(target, &join),
        };
        self.pending = Some(PendingFeedback { join, follow_up });
        self.phase = Phase::AwaitFeedback;

        self.run_until_idle()?;
        Ok(Some(action))
    }

    /// Resumes after deferred presentation requests have completed.
    pub fn poll(&mut self) -> DelveResult<Phase> {
        self.run_until_idle()
    }

    fn run_until_idle(&mut self) -> DelveResult<Phase> {
        while self.step()? {}
        Ok(self.phase)
    }

    /// Performs one automatic transition. Returns false when the controller
    /// has to wait for input or presentation.
    fn step(&mut self) -> DelveResult<bool> {
        let next = match self.phase {
            Phase::CreateDungeon => {
                self.theme = self.data.theme(&self.config.theme_id)?.clone();
                let depth = self.map.depth() + 1;
                self.map = DungeonMap::at_depth(self.config.width, self.config.height, depth);
                log::info!(
                    "created {}x{} floor at depth {}",
                    self.config.width,
                    self.config.height,
                    depth
                );
                Phase::GenerateDungeon
            }
            Phase::GenerateDungeon => {
                self.map.generate(
                    self.data.as_ref(),
                    &self.theme,
                    &self.config.generation,
                    &mut self.rng,
                )?;
                self.statistics.max_depth_reached =
                    self.statistics.max_depth_reached.max(self.map.depth());
                Phase::TurnStart
            }
            Phase::TurnStart => Phase::AwaitPlayerAction,
            Phase::AwaitPlayerAction => return Ok(false),
            Phase::AwaitFeedback => match self.take_completed() {
                Some(follow_up) => self.follow_up(follow_up),
                None => return Ok(false),
            },
            Phase::TurnEnd => self.enemy_turn(),
            Phase::PlayerDefeated => return Ok(false),
        };

        log::trace!("{:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(true)
    }

    fn take_completed(&mut self) -> Option<FollowUp> {
        if self.pending.as_ref()?.join.is_complete() {
            self.pending.take().map(|pending| pending.follow_up)
        } else {
            None
        }
    }

    fn follow_up(&mut self, follow_up: FollowUp) -> Phase {
        match follow_up {
            FollowUp::TurnEnd => Phase::TurnEnd,
            FollowUp::LevelUp { levels } => {
                let join = Join::new();
                for level in levels {
                    self.presenter.level_up_effect(level, join.token());
                }
                self.pending = Some(PendingFeedback {
                    join,
                    follow_up: FollowUp::TurnEnd,
                });
                Phase::AwaitFeedback
            }
            FollowUp::Descend => {
                self.statistics.turns_taken += 1;
                let depth = self.map.descend();
                log::info!("descending to depth {}", depth);
                self.record(GameEvent::Descended { depth });
                Phase::GenerateDungeon
            }
        }
    }

    fn reveal(&mut self, target: Position, join: &Join) -> FollowUp {
        let positions = self
            .map
            .explore_at(target.x, target.y, &mut self.presenter, join);
        self.record(GameEvent::TilesRevealed { positions });
        FollowUp::TurnEnd
    }

    fn attack(&mut self, target: Position, join: &Join) -> DelveResult<FollowUp> {
        let defender = self
            .map
            .tile(target.x, target.y)
            .and_then(|tile| tile.enemy())
            .ok_or_else(|| DelveError::InvalidAction(format!("no enemy at {:?}", target)))?;
        let damage = self
            .config
            .combat
            .resolve(&self.player, defender, &mut self.rng);

        let enemy = self.map.damage_enemy_at(target.x, target.y, damage)?;
        let remaining_hp = enemy.hp();
        let died = !enemy.is_alive();
        let name = enemy.name().to_string();
        let xp_reward = enemy.xp_reward();

        self.presenter.attack_effect(target, damage, join.token());
        self.record(GameEvent::EnemyDamaged {
            position: target,
            damage,
            remaining_hp,
        });

        if !died {
            return Ok(FollowUp::TurnEnd);
        }

        log::info!("{} defeated, {} xp", name, xp_reward);
        self.record(GameEvent::EnemyDied {
            position: target,
            name,
            xp_reward,
        });
        self.map.validate_locks();

        let first_new_level = self.player.level() + 1;
        let gained = self.player.grant_xp(xp_reward);
        if gained == 0 {
            return Ok(FollowUp::TurnEnd);
        }

        let levels: Vec<u32> = (first_new_level..first_new_level + gained).collect();
        for &level in &levels {
            self.record(GameEvent::LevelUp { level });
        }
        log::info!("player reached level {}", self.player.level());
        Ok(FollowUp::LevelUp { levels })
    }

    fn interact(&mut self, target: Position) -> DelveResult<FollowUp> {
        let item = self.map.use_item_at(target.x, target.y)?;
        match item.kind {
            ItemKind::Exit => Ok(FollowUp::Descend),
            ItemKind::Consumable => {
                let hp_change = self.player.apply_modifiers(&item.modifiers);
                log::info!("used {} ({:+} hp)", item.name, hp_change);
                self.record(GameEvent::ItemUsed {
                    position: target,
                    item_id: item.id,
                    hp_change,
                });
                Ok(FollowUp::TurnEnd)
            }
        }
    }

    /// Every visible live enemy strikes the player once.
    fn enemy_turn(&mut self) -> Phase {
        self.statistics.turns_taken += 1;

        let combat: CombatConfig = self.config.combat;
        let attackers = self.map.visible_live_enemies();
        let count = attackers.len();
        let total: u32 = attackers
            .into_iter()
            .map(|(_, enemy)| combat.resolve(enemy, &self.player, &mut self.rng))
            .sum();

        if total == 0 {
            return Phase::TurnStart;
        }

        self.player.take_damage(total);
        log::debug!("{} enemies dealt {} damage", count, total);
        self.record(GameEvent::PlayerDamaged {
            damage: total,
            attackers: count,
        });

        if self.player.is_alive() {
            return Phase::TurnStart;
        }

        let depth = self.map.depth();
        log::info!("player defeated at depth {}", depth);
        self.record(GameEvent::PlayerDied { depth });
        self.record(GameEvent::Message {
            text: format!("You died on floor {}.", depth),
            importance: MessageImportance::Critical,
        });
        Phase::PlayerDefeated
    }

    fn record(&mut self, event: GameEvent) {
        self.statistics.update_from_event(&event);
        self.events.push(event);
    }
}
