// Game rules shared by the simulator, the heuristics and telemetry
//
// All movement questions a policy may ask ("does this action kill me?",
// "does it jump a wall?") go through `trace_move` so that every caller
// applies exactly the hole rule the simulator applies.

use crate::board::{Board, Player};

/// Maximum size of the field (both width and height)
pub const FIELD_MAX_SIZE: i32 = 80;
/// After how many steps a hole may occur (if the speed allows it)
pub const HOLES_EACH_STEP: u32 = 6;
/// Minimum speed needed for a hole
pub const HOLE_SPEED: i32 = 3;
pub const MAX_SPEED: i32 = 10;
pub const MIN_SPEED: i32 = 1;
/// Player ids run from 1 to this value
pub const MAX_PLAYERS: u8 = 6;
/// Cell value of a square entered by more than one player
pub const COLLISION: i8 = -1;

/// Whether cell `s` (0-based, in movement order) of a move is left unstamped
///
/// The first and last cells of a move are always stamped.
#[inline]
pub fn is_hole(speed: i32, step_counter: u32, s: i32) -> bool {
    speed >= HOLE_SPEED && step_counter % HOLES_EACH_STEP == 0 && s != 0 && s != speed - 1
}

/// Whether the round after a player's current `step_counter` is a hole round
#[inline]
pub fn next_round_has_holes(step_counter: u32) -> bool {
    (step_counter + 1) % HOLES_EACH_STEP == 0
}

/// Result of walking a projected move over the current board without stamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Some cell of the move lies outside the board
    OffBoard,
    /// A stamped cell lies on the path
    Blocked,
    /// The move ends on `(x, y)`; `jumped` is set when a hole skipped a stamped cell
    Clear { x: i32, y: i32, jumped: bool },
}

impl MoveOutcome {
    pub fn is_clear(&self) -> bool {
        matches!(self, MoveOutcome::Clear { .. })
    }
}

/// Walks the move of `moved` (a player already projected through
/// `Player::projected`) and reports whether it survives against the
/// current cells.
///
/// With `use_holes` unset every traversed cell must be empty; with it set,
/// interior hole cells may be stamped, which is how a player jumps a tail.
pub fn trace_move(board: &Board, moved: &Player, use_holes: bool) -> MoveOutcome {
    let (dx, dy) = moved.direction.delta();
    let (mut x, mut y) = (moved.x, moved.y);
    let mut jumped = false;

    for s in 0..moved.speed {
        x += dx;
        y += dy;
        if !board.in_bounds(x, y) {
            return MoveOutcome::OffBoard;
        }
        let occupied = board.cell(x, y) != 0;
        if use_holes && is_hole(moved.speed, moved.step_counter, s) {
            jumped |= occupied;
            continue;
        }
        if occupied {
            return MoveOutcome::Blocked;
        }
    }

    MoveOutcome::Clear { x, y, jumped }
}
