// Snail family: keep going straight for as long as possible

use rand::RngCore;

use super::{acting, outcome, survives, Jump, Policy, PolicyKind};
use crate::board::{Board, Player};
use crate::config::HeuristicsConfig;
use crate::flood_fill::FloodFill;
use crate::rules::MoveOutcome;
use crate::types::Action;

const SNAIL_ORDER: [Action; 4] = [
    Action::ChangeNothing,
    Action::TurnLeft,
    Action::TurnRight,
    Action::SlowDown,
];

/// Last resort once nothing survives: brake if possible
fn brake(me: &Player) -> Action {
    if me.speed > 1 {
        Action::SlowDown
    } else {
        Action::ChangeNothing
    }
}

/// Prefers `change_nothing`; when the path ahead is blocked tries
/// `turn_left`, `turn_right`, then `slow_down`
pub struct Snail;

impl Snail {
    pub(crate) fn choose(board: &Board, me: &Player) -> Action {
        SNAIL_ORDER
            .iter()
            .copied()
            .find(|&a| survives(board, me, a, false))
            .unwrap_or_else(|| brake(me))
    }
}

impl Policy for Snail {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Snail
    }

    fn decide(&mut self, board: &Board, id: u8, _rng: &mut dyn RngCore) -> Action {
        match acting(board, id) {
            Some(me) => Snail::choose(board, &me),
            None => Action::ChangeNothing,
        }
    }
}

/// Snail that looks further along each option and favours ending next to
/// walls or tails, which makes it trace the boundary of its region
pub struct SuperSnail {
    lookahead: i32,
}

impl SuperSnail {
    pub fn new(lookahead: i32) -> Self {
        SuperSnail { lookahead: lookahead.max(1) }
    }

    fn score(&self, board: &Board, moved: &Player, end: (i32, i32)) -> i32 {
        let (dx, dy) = moved.direction.delta();
        let behind = (end.0 - dx, end.1 - dy);

        let contact = [(end.0 - 1, end.1), (end.0 + 1, end.1), (end.0, end.1 - 1), (end.0, end.1 + 1)]
            .iter()
            .filter(|&&n| n != behind && !board.is_free(n.0, n.1))
            .count() as i32;

        let mut room = 0;
        let (mut x, mut y) = end;
        for _ in 0..self.lookahead {
            x += dx;
            y += dy;
            if !board.is_free(x, y) {
                break;
            }
            room += 1;
        }

        if room == 0 {
            // dead end unless a turn saves it next round
            return -10 + contact;
        }
        contact * 4 + room
    }
}

impl Policy for SuperSnail {
    fn kind(&self) -> PolicyKind {
        PolicyKind::SuperSnail
    }

    fn decide(&mut self, board: &Board, id: u8, _rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };

        let mut best: Option<(Action, i32)> = None;
        for action in SNAIL_ORDER {
            if let Some((moved, MoveOutcome::Clear { x, y, .. })) = outcome(board, &me, action, false) {
                let score = self.score(board, &moved, (x, y));
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((action, score));
                }
            }
        }

        best.map_or_else(|| brake(&me), |(action, _)| action)
    }
}

/// Snail that switches to jump seeking once its region gets small
pub struct JumpingSnail {
    threshold: usize,
    flood_fill: FloodFill,
    jump: Jump,
}

impl JumpingSnail {
    pub fn new(cfg: &HeuristicsConfig) -> Self {
        JumpingSnail {
            threshold: cfg.jumping_snail_free_threshold,
            flood_fill: FloodFill::new(),
            jump: Jump::new(cfg),
        }
    }
}

impl Policy for JumpingSnail {
    fn kind(&self) -> PolicyKind {
        PolicyKind::JumpingSnail
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };

        let free = self
            .flood_fill
            .free_reachable(board, me.x, me.y, Some(self.threshold + 1));
        if free < self.threshold {
            return self.jump.decide(board, id, rng);
        }

        if me.speed > 1 {
            // plenty of room: get back to speed 1 first
            return [Action::SlowDown, Action::TurnLeft, Action::TurnRight]
                .iter()
                .copied()
                .find(|&a| survives(board, &me, a, false))
                .unwrap_or(Action::SlowDown);
        }

        Snail::choose(board, &me)
    }
}
