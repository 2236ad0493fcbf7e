//! # Input Module
//!
//! Text command parsing for the command-line front end.
//!
//! The engine itself exposes a single input boundary,
//! [`crate::TurnController::select_tile`]. This module turns lines such as
//! `3 4`, `help` or `quit` into [`PlayerInput`] values and forwards selections
//! to the controller.

use crate::{DelveError, DelveResult, PlayerAction, Position, Presenter, TurnController};

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Select the tile at an absolute grid coordinate
    Select(Position),
    /// Show help information
    Help,
    /// Show player stats and run statistics
    Status,
    /// Quit the game
    Quit,
}

/// Parses text commands into [`PlayerInput`].
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    /// Accept `x,y` in addition to `x y`
    pub allow_commas: bool,
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{InputHandler, PlayerInput, Position};
    ///
    /// let input = InputHandler::new();
    /// assert_eq!(input.parse_line("3 4").unwrap(), Some(PlayerInput::Select(Position::new(3, 4))));
    /// assert_eq!(input.parse_line("q").unwrap(), Some(PlayerInput::Quit));
    /// ```
    pub fn new() -> Self {
        Self { allow_commas: true }
    }

    /// Parses one line. Blank lines yield `None`.
    pub fn parse_line(&self, line: &str) -> DelveResult<Option<PlayerInput>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        match line.to_lowercase().as_str() {
            "q" | "quit" | "exit" => return Ok(Some(PlayerInput::Quit)),
            "h" | "help" | "?" => return Ok(Some(PlayerInput::Help)),
            "s" | "status" | "stats" => return Ok(Some(PlayerInput::Status)),
            _ => {}
        }

        let normalized = if self.allow_commas {
            line.replace(',', " ")
        } else {
            line.to_string()
        };
        let parts: Vec<&str> = normalized.split_whitespace().collect();
        let [x, y] = parts.as_slice() else {
            return Err(DelveError::InvalidAction(format!(
                "expected `x y`, got '{}'",
                line
            )));
        };

        let parse = |value: &str| {
            value.parse::<i32>().map_err(|_| {
                DelveError::InvalidAction(format!("'{}' is not a coordinate", value))
            })
        };
        Ok(Some(PlayerInput::Select(Position::new(parse(*x)?, parse(*y)?))))
    }

    /// Forwards a selection to the controller. Other inputs are handled by the caller.
    pub fn input_to_action<P: Presenter>(
        &self,
        input: PlayerInput,
        controller: &mut TurnController<P>,
    ) -> DelveResult<Option<PlayerAction>> {
        match input {
            PlayerInput::Select(position) => controller.select_tile(position.x, position.y),
            PlayerInput::Help | PlayerInput::Status | PlayerInput::Quit => Ok(None),
        }
    }

    /// Usage text for the interactive prompt.
    pub fn help_text() -> &'static str {
        "Commands:\n  x y     select the tile at column x, row y (attack, use item or explore)\n  status  show player and run statistics\n  help    show this text\n  quit    leave the game"
    }
}
