// Rollout kernel: plays a board copy to the end of the game
//
// Rounds are simultaneous. All actions are collected against the board as
// it was at round start, then applied, then every active player moves,
// then every mover walks back over its path looking for collision marks.

use rand::RngCore;

use crate::board::Board;
use crate::config::{HeuristicsConfig, RolloutConfig};
use crate::policy::{PolicyBook, PolicyKind, PolicyPool};
use crate::profiler::{Category, ProfileGuard};
use crate::rules::{is_hole, next_round_has_holes, COLLISION, HOLE_SPEED, MAX_SPEED, MIN_SPEED};
use crate::types::Action;

/// Outcome of one rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutResult {
    /// First action played by the self-player
    pub seed: Action,
    pub won: bool,
    /// Rounds the self-player started alive, or all rounds when it won
    pub survived: u32,
    /// Rounds in which some opponent started alive
    pub survived_opponent: u32,
    pub rounds: u32,
}

impl RolloutResult {
    fn stillborn(seed: Action) -> Self {
        RolloutResult {
            seed,
            won: false,
            survived: 0,
            survived_opponent: 0,
            rounds: 0,
        }
    }
}

/// Per-worker simulator; owns the policy instances it drives seats with
pub struct Simulator {
    book: PolicyBook,
    pool: PolicyPool,
    self_policy: PolicyKind,
    first_round_policy: PolicyKind,
    seats: Vec<PolicyKind>,
    actions: Vec<Option<Action>>,
}

impl Simulator {
    pub fn new(rollout: &RolloutConfig, heuristics: &HeuristicsConfig) -> Self {
        Simulator {
            book: PolicyBook::new(heuristics),
            pool: PolicyPool::new(&rollout.opponent_pool),
            self_policy: rollout.self_policy,
            first_round_policy: rollout.first_round_policy,
            seats: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Plays `board` to termination with `seed` as the self-player's first
    /// action. The board is consumed; callers pass a copy.
    pub fn simulate(&mut self, mut board: Board, seed: Action, rng: &mut dyn RngCore) -> RolloutResult {
        let _guard = ProfileGuard::new(Category::Rollout);

        let you = board.you;
        let Some(me) = board.me().copied() else {
            return RolloutResult::stillborn(seed);
        };
        if (seed == Action::SlowDown && me.speed <= MIN_SPEED) || (seed == Action::SpeedUp && me.speed >= MAX_SPEED) {
            return RolloutResult::stillborn(seed);
        }

        self.seats.clear();
        for p in &board.players {
            let kind = if p.id == you { self.self_policy } else { self.pool.pick(rng) };
            self.seats.push(kind);
        }

        let mut result = RolloutResult::stillborn(seed);
        loop {
            let self_alive = board.me().map_or(false, |p| p.active);
            let opponent_alive = board.players.iter().any(|p| p.active && p.id != you);
            if self_alive {
                result.survived += 1;
            }
            if opponent_alive {
                result.survived_opponent += 1;
            }

            self.collect_actions(&board, result.rounds == 0, seed, rng);
            play_round(&mut board, &self.actions);
            result.rounds += 1;

            if board.active_count() <= 1 {
                result.won = board.me().map_or(false, |p| p.active);
                break;
            }
        }

        if result.won {
            result.survived = result.rounds;
        }
        result
    }

    fn collect_actions(&mut self, board: &Board, first_round: bool, seed: Action, rng: &mut dyn RngCore) {
        self.actions.clear();
        for (i, p) in board.players.iter().enumerate() {
            if !p.active {
                self.actions.push(None);
                continue;
            }
            let action = if first_round && p.id == board.you {
                seed
            } else {
                let kind = if first_round { self.first_round_policy } else { self.seats[i] };
                let _guard = ProfileGuard::new(Category::Policy);
                self.book.get(kind).decide(board, p.id, rng)
            };
            self.actions.push(Some(action));
        }
    }
}

/// Advances `board` by one simultaneous round.
///
/// `actions` is aligned with `board.players`; `None` eliminates an active
/// player, entries of inactive players are ignored.
pub fn play_round(board: &mut Board, actions: &[Option<Action>]) {
    for (i, player) in board.players.iter_mut().enumerate() {
        if !player.active {
            continue;
        }
        match actions.get(i).copied().flatten() {
            Some(action) => {
                if !player.apply_action(action) {
                    player.active = false;
                }
            }
            None => player.active = false,
        }
    }

    for i in 0..board.players.len() {
        let mut p = board.players[i];
        if !p.active {
            continue;
        }
        p.step_counter += 1;
        let (dx, dy) = p.direction.delta();
        let (mut x, mut y) = (p.x, p.y);
        for s in 0..p.speed {
            x += dx;
            y += dy;
            if !board.in_bounds(x, y) {
                p.active = false;
                break;
            }
            if is_hole(p.speed, p.step_counter, s) {
                continue;
            }
            let stamp = if board.cell(x, y) == 0 { p.id as i8 } else { COLLISION };
            board.set_cell(x, y, stamp);
        }
        if p.active {
            p.x = x;
            p.y = y;
        }
        board.players[i] = p;
    }

    for i in 0..board.players.len() {
        let p = board.players[i];
        if !p.active {
            continue;
        }
        let (dx, dy) = p.direction.delta();
        let crashed = (0..p.speed).any(|s| {
            let back = p.speed - 1 - s;
            !is_hole(p.speed, p.step_counter, s) && board.cell(p.x - dx * back, p.y - dy * back) == COLLISION
        });
        if crashed {
            board.players[i].active = false;
        }
    }
}

/// Whether playing `action` next round makes the self-player jump over a
/// stamped cell: hole round, speed at least 3, both ends of the move empty
/// and at least one interior cell occupied.
pub fn is_jump(board: &Board, action: Action) -> bool {
    let Some(me) = board.me() else {
        return false;
    };
    if !next_round_has_holes(me.step_counter) {
        return false;
    }
    let Some(moved) = me.projected(action) else {
        return false;
    };
    if moved.speed < HOLE_SPEED {
        return false;
    }

    let (dx, dy) = moved.direction.delta();
    let mut interior_occupied = false;
    for s in 0..moved.speed {
        let (x, y) = (moved.x + dx * (s + 1), moved.y + dy * (s + 1));
        let Some(cell) = board.get(x, y) else {
            return false;
        };
        if s == 0 || s == moved.speed - 1 {
            if cell != 0 {
                return false;
            }
        } else if cell != 0 {
            interior_occupied = true;
        }
    }
    interior_occupied
}
