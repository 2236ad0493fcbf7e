//! # Presentation Module
//!
//! Boundary between the rules engine and whatever draws it.
//!
//! The engine issues fire-and-forget requests (reveal a tile, play an attack
//! effect, play a level-up effect) and hands each one a [`Completion`]. A turn
//! only advances once every completion of the current action has fired; the
//! [`Join`] counts them.

use crate::{Position, Tile};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Completion barrier for the presentation requests of one action.
#[derive(Debug, Clone, Default)]
pub struct Join {
    remaining: Rc<Cell<usize>>,
}

impl Join {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more outstanding request and returns its token.
    pub fn token(&self) -> Completion {
        self.remaining.set(self.remaining.get() + 1);
        Completion {
            remaining: Rc::clone(&self.remaining),
        }
    }

    /// Number of tokens that have not completed yet.
    pub fn pending(&self) -> usize {
        self.remaining.get()
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }
}

/// Single-use token a presenter fires when its effect has finished.
///
/// Dropping a token without completing it leaves its [`Join`] pending.
#[derive(Debug)]
#[must_use = "the owning action stays pending until this completion fires"]
pub struct Completion {
    remaining: Rc<Cell<usize>>,
}

impl Completion {
    pub fn complete(self) {
        self.remaining.set(self.remaining.get().saturating_sub(1));
    }
}

/// Presentation callbacks the engine calls into.
pub trait Presenter {
    /// A tile's fog has lifted.
    fn reveal(&mut self, tile: &Tile, done: Completion);

    /// The unit at `target` was struck for `damage`.
    fn attack_effect(&mut self, target: Position, damage: u32, done: Completion);

    /// The player reached `level`.
    fn level_up_effect(&mut self, level: u32, done: Completion);

    /// A selection was rejected. Purely cosmetic, the engine does not wait.
    fn reject_selection(&mut self, _position: Position) {}
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn reveal(&mut self, tile: &Tile, done: Completion) {
        (**self).reveal(tile, done)
    }

    fn attack_effect(&mut self, target: Position, damage: u32, done: Completion) {
        (**self).attack_effect(target, damage, done)
    }

    fn level_up_effect(&mut self, level: u32, done: Completion) {
        (**self).level_up_effect(level, done)
    }

    fn reject_selection(&mut self, position: Position) {
        (**self).reject_selection(position)
    }
}

/// Completes every request on the spot. Used headless and by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediatePresenter;

impl Presenter for ImmediatePresenter {
    fn reveal(&mut self, tile: &Tile, done: Completion) {
        log::trace!("reveal {:?}", tile.position());
        done.complete();
    }

    fn attack_effect(&mut self, target: Position, damage: u32, done: Completion) {
        log::trace!("attack effect at {:?} for {}", target, damage);
        done.complete();
    }

    fn level_up_effect(&mut self, level: u32, done: Completion) {
        log::trace!("level up effect to {}", level);
        done.complete();
    }
}

/// A request as seen by [`QueuedPresenter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationRequest {
    Reveal(Position),
    AttackEffect { target: Position, damage: u32 },
    LevelUpEffect { level: u32 },
    Rejected(Position),
}

/// Holds completions until told to finish them, like an animation queue.
#[derive(Debug, Default)]
pub struct QueuedPresenter {
    queue: VecDeque<Completion>,
    history: Vec<PresentationRequest>,
}

impl QueuedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests waiting for completion.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Completes the oldest outstanding request.
    pub fn complete_next(&mut self) -> bool {
        match self.queue.pop_front() {
            Some(done) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    /// Completes everything outstanding.
    pub fn flush(&mut self) -> usize {
        let count = self.queue.len();
        while self.complete_next() {}
        count
    }

    /// Every request received so far, in order.
    pub fn history(&self) -> &[PresentationRequest] {
        &self.history
    }
}

impl Presenter for QueuedPresenter {
    fn reveal(&mut self, tile: &Tile, done: Completion) {
        self.history
            .push(PresentationRequest::Reveal(tile.position()));
        self.queue.push_back(done);
    }

    fn attack_effect(&mut self, target: Position, damage: u32, done: Completion) {
        self.history
            .push(PresentationRequest::AttackEffect { target, damage });
        self.queue.push_back(done);
    }

    fn level_up_effect(&mut self, level: u32, done: Completion) {
        self.history
            .push(PresentationRequest::LevelUpEffect { level });
        self.queue.push_back(done);
    }

    fn reject_selection(&mut self, position: Position) {
        self.history.push(PresentationRequest::Rejected(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terrain;

    #[test]
    fn test_join_counts_tokens() {
        let join = Join::new();
        assert!(join.is_complete());

        let first = join.token();
        let second = join.token();
        assert_eq!(join.pending(), 2);

        first.complete();
        assert!(!join.is_complete());
        second.complete();
        assert!(join.is_complete());
    }

    #[test]
    fn test_join_clones_share_state() {
        let join = Join::new();
        let observer = join.clone();
        let token = join.token();
        assert_eq!(observer.pending(), 1);
        token.complete();
        assert!(observer.is_complete());
    }

    #[test]
    fn test_queued_presenter_holds_until_flush() {
        let join = Join::new();
        let mut presenter = QueuedPresenter::new();
        let tile = Tile::new(Position::new(1, 1), Terrain::Floor);

        presenter.reveal(&tile, join.token());
        presenter.level_up_effect(2, join.token());
        assert_eq!(presenter.len(), 2);
        assert_eq!(join.pending(), 2);

        assert!(presenter.complete_next());
        assert_eq!(join.pending(), 1);
        assert_eq!(presenter.flush(), 1);
        assert!(join.is_complete());
        assert!(!presenter.complete_next());

        assert_eq!(
            presenter.history(),
            &[
                PresentationRequest::Reveal(Position::new(1, 1)),
                PresentationRequest::LevelUpEffect { level: 2 },
            ]
        );
    }

    #[test]
    fn test_immediate_presenter_completes() {
        let join = Join::new();
        let mut presenter = ImmediatePresenter;
        presenter.attack_effect(Position::new(2, 2), 3, join.token());
        assert!(join.is_complete());
    }
}
