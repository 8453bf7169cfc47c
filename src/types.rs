// spe_ed wire types
// See https://github.com/informatiCup/InformatiCup2021/ for the protocol

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EngineError;

/// One of the five moves a player may send each round
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnLeft,
    TurnRight,
    SlowDown,
    SpeedUp,
    ChangeNothing,
}

impl Action {
    /// All actions in the stable order used for iteration and tie-breaking
    pub const ALL: [Action; 5] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::SlowDown,
        Action::SpeedUp,
        Action::ChangeNothing,
    ];

    /// Returns all possible actions
    pub fn all() -> [Action; 5] {
        Self::ALL
    }

    /// Position of this action inside `Action::ALL`
    pub fn index(self) -> usize {
        match self {
            Action::TurnLeft => 0,
            Action::TurnRight => 1,
            Action::SlowDown => 2,
            Action::SpeedUp => 3,
            Action::ChangeNothing => 4,
        }
    }

    /// Converts action to its protocol string
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::SlowDown => "slow_down",
            Action::SpeedUp => "speed_up",
            Action::ChangeNothing => "change_nothing",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the four possible headings of a player
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to its protocol string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Unit step of this direction; the grid origin is top-left so `Up` is -y
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Heading after a 90° turn to the player's left
    pub fn turned_left(self) -> Direction {
        match self {
            Direction::Left => Direction::Down,
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Down => Direction::Right,
        }
    }

    /// Heading after a 90° turn to the player's right
    pub fn turned_right(self) -> Direction {
        match self {
            Direction::Left => Direction::Up,
            Direction::Right => Direction::Down,
            Direction::Up => Direction::Right,
            Direction::Down => Direction::Left,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Player record as transmitted by the server
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerMessage {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub speed: i32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Complete game state received from the server each round
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GameMessage {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Vec<i8>>,
    pub players: BTreeMap<u8, PlayerMessage>,
    pub you: u8,
    pub running: bool,
    /// RFC3339; omitted once the game is over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl GameMessage {
    /// Decodes one server frame
    pub fn decode(text: &str) -> Result<GameMessage, EngineError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Answer sent back to the server
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMessage {
    pub action: Action,
}

impl ActionMessage {
    pub fn encode(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<ActionMessage, EngineError> {
        Ok(serde_json::from_str(text)?)
    }
}
