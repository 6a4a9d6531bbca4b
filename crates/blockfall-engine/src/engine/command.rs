use serde::{Deserialize, Serialize};

use crate::MoveError;

use super::game_engine::{Engine, MoveOutcome};

/// A discrete player command, one per input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::Rotate,
        Command::HardDrop,
    ];

    /// Returns the single-letter script form of this command.
    ///
    /// ```
    /// use blockfall_engine::Command;
    ///
    /// let script = "LLUDH";
    /// let commands = script.chars().map(Command::from_char).collect::<Option<Vec<_>>>().unwrap();
    /// assert_eq!(commands[2], Command::Rotate);
    /// assert_eq!(commands.iter().map(|c| c.as_char()).collect::<String>(), script);
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Command::MoveLeft => 'L',
            Command::MoveRight => 'R',
            Command::SoftDrop => 'D',
            Command::Rotate => 'U',
            Command::HardDrop => 'H',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Command::MoveLeft),
            'R' => Some(Command::MoveRight),
            'D' => Some(Command::SoftDrop),
            'U' => Some(Command::Rotate),
            'H' => Some(Command::HardDrop),
            _ => None,
        }
    }

    /// Applies this command to `engine`.
    pub fn apply(self, engine: &mut Engine) -> Result<MoveOutcome, MoveError> {
        match self {
            Command::MoveLeft => engine.move_left(),
            Command::MoveRight => engine.move_right(),
            Command::SoftDrop => engine.soft_drop(),
            Command::Rotate => engine.rotate(),
            Command::HardDrop => engine.hard_drop(),
        }
    }
}
