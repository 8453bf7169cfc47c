// Internal board model
//
// Cells live in a single row-major buffer so a rollout copy is one memcpy.
// Players are stored sorted by id and reference the grid only by position.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::rules::{COLLISION, FIELD_MAX_SIZE, MAX_PLAYERS, MAX_SPEED, MIN_SPEED};
use crate::types::{Action, Direction, GameMessage, PlayerMessage};

/// Player state used by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub id: u8,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub speed: i32,
    /// Once false, stays false; the position is frozen
    pub active: bool,
    /// Rounds completed by this player; governs hole timing
    pub step_counter: u32,
}

impl Player {
    /// Applies the direction/speed part of an action.
    ///
    /// Returns false when the action pushes the speed out of range, which
    /// eliminates the player.
    pub fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::TurnLeft => self.direction = self.direction.turned_left(),
            Action::TurnRight => self.direction = self.direction.turned_right(),
            Action::SpeedUp => self.speed += 1,
            Action::SlowDown => self.speed -= 1,
            Action::ChangeNothing => {}
        }
        (MIN_SPEED..=MAX_SPEED).contains(&self.speed)
    }

    /// The player as it will be when movement of the next round starts:
    /// action applied and step counter advanced. `None` if the action is
    /// self-eliminating by speed.
    pub fn projected(&self, action: Action) -> Option<Player> {
        let mut next = *self;
        if !next.apply_action(action) {
            return None;
        }
        next.step_counter += 1;
        Some(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<i8>,
    pub players: Vec<Player>,
    pub you: u8,
    pub running: bool,
}

impl Board {
    /// Creates an empty, running board without players
    pub fn new(width: i32, height: i32) -> Self {
        Board {
            width,
            height,
            cells: vec![0; (width.max(0) * height.max(0)) as usize],
            players: Vec::new(),
            you: 1,
            running: true,
        }
    }

    /// Builds a board from literal rows (row-major, `rows[y][x]`)
    pub fn from_rows(rows: &[&[i8]]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.len() as i32);
        let mut board = Board::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                board.set_cell(x as i32, y as i32, v);
            }
        }
        board
    }

    /// Validates a server message and converts it to the internal model.
    ///
    /// `round` is the 1-based index of the received message; step counters
    /// are seeded with `round - 1` since the server does not transmit them.
    pub fn from_message(msg: &GameMessage, round: u32) -> Result<Board, EngineError> {
        if msg.width <= 0 || msg.height <= 0 || msg.width > FIELD_MAX_SIZE || msg.height > FIELD_MAX_SIZE {
            return Err(EngineError::Protocol(format!(
                "board size {}x{} outside 1..={}",
                msg.width, msg.height, FIELD_MAX_SIZE
            )));
        }
        if msg.cells.len() != msg.height as usize {
            return Err(EngineError::Protocol(format!(
                "expected {} rows of cells, got {}",
                msg.height,
                msg.cells.len()
            )));
        }

        let mut board = Board::new(msg.width, msg.height);
        board.you = msg.you;
        board.running = msg.running;

        for (y, row) in msg.cells.iter().enumerate() {
            if row.len() != msg.width as usize {
                return Err(EngineError::Protocol(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    msg.width
                )));
            }
            for (x, &v) in row.iter().enumerate() {
                if v < COLLISION || v > MAX_PLAYERS as i8 {
                    return Err(EngineError::Invariant(format!(
                        "cell ({}, {}) holds {}",
                        x, y, v
                    )));
                }
                board.set_cell(x as i32, y as i32, v);
            }
        }

        for (&id, p) in &msg.players {
            if id == 0 || id > MAX_PLAYERS {
                return Err(EngineError::Invariant(format!("player id {} out of range", id)));
            }
            if p.active {
                if !board.in_bounds(p.x, p.y) {
                    return Err(EngineError::Invariant(format!(
                        "active player {} outside the board at ({}, {})",
                        id, p.x, p.y
                    )));
                }
                if !(MIN_SPEED..=MAX_SPEED).contains(&p.speed) {
                    return Err(EngineError::Invariant(format!(
                        "active player {} has speed {}",
                        id, p.speed
                    )));
                }
            }
            board.players.push(Player {
                id,
                x: p.x,
                y: p.y,
                direction: p.direction,
                speed: p.speed,
                active: p.active,
                step_counter: round.saturating_sub(1),
            });
        }

        if board.player(board.you).is_none() {
            return Err(EngineError::Invariant(format!(
                "you={} is not one of the players",
                board.you
            )));
        }

        Ok(board)
    }

    /// Converts back to the wire representation (used by dumps)
    pub fn to_message(&self, deadline: Option<String>) -> GameMessage {
        let cells = self.cells.chunks(self.width as usize).map(|r| r.to_vec()).collect();
        let players: BTreeMap<u8, PlayerMessage> = self
            .players
            .iter()
            .map(|p| {
                (
                    p.id,
                    PlayerMessage {
                        x: p.x,
                        y: p.y,
                        direction: p.direction,
                        speed: p.speed,
                        active: p.active,
                        name: None,
                    },
                )
            })
            .collect();

        GameMessage {
            width: self.width,
            height: self.height,
            cells,
            players,
            you: self.you,
            running: self.running,
            deadline,
        }
    }

    /// Adds a player, keeping the table sorted by id
    pub fn add_player(&mut self, player: Player) {
        let pos = self.players.partition_point(|p| p.id < player.id);
        if self.players.get(pos).map_or(false, |p| p.id == player.id) {
            self.players[pos] = player;
        } else {
            self.players.insert(pos, player);
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Flat index of an in-bounds position
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> i8 {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set_cell(&mut self, x: i32, y: i32, value: i8) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    /// Cell value, or `None` outside the board
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<i8> {
        if self.in_bounds(x, y) {
            Some(self.cell(x, y))
        } else {
            None
        }
    }

    /// Whether `(x, y)` is on the board and empty
    #[inline]
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(0)
    }

    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    pub fn row(&self, y: i32) -> &[i8] {
        let start = (y * self.width) as usize;
        &self.cells[start..start + self.width as usize]
    }

    pub fn player(&self, id: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The self-player
    pub fn me(&self) -> Option<&Player> {
        self.player(self.you)
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    /// Fraction of cells holding `value`
    pub fn usage(&self, value: i8) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let used = self.cells.iter().filter(|&&c| c == value).count();
        used as f64 / self.cells.len() as f64
    }
}
