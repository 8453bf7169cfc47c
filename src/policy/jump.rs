// Jump seeking: builds up speed and uses hole rounds to cross tails

use rand::RngCore;

use super::{acting, outcome, stamped_path, survives, Policy, PolicyKind, SuperRandom};
use crate::board::{Board, Player};
use crate::config::HeuristicsConfig;
use crate::flood_fill::FloodFill;
use crate::rules::{next_round_has_holes, MoveOutcome, HOLE_SPEED};
use crate::types::Action;

pub struct Jump {
    cutoff: usize,
    flood_fill: FloodFill,
}

impl Jump {
    pub fn new(cfg: &HeuristicsConfig) -> Self {
        Jump {
            cutoff: cfg.largest_free_cutoff,
            flood_fill: FloodFill::new(),
        }
    }

    /// Among the actions that jump over a stamped cell next round, the one
    /// landing in the largest free region
    fn best_jump(&mut self, board: &Board, me: &Player) -> Option<Action> {
        let mut best: Option<(Action, usize)> = None;
        for action in Action::ALL {
            let Some((moved, MoveOutcome::Clear { x, y, jumped: true })) = outcome(board, me, action, true) else {
                continue;
            };
            if moved.speed < HOLE_SPEED {
                continue;
            }
            let blocked = stamped_path(&moved, true);
            let room = self
                .flood_fill
                .free_reachable_excluding(board, x, y, Some(self.cutoff), &blocked);
            if best.map_or(true, |(_, r)| room > r) {
                best = Some((action, room));
            }
        }
        best.map(|(action, _)| action)
    }
}

impl Policy for Jump {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Jump
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };

        if next_round_has_holes(me.step_counter) {
            if let Some(action) = self.best_jump(board, &me) {
                return action;
            }
        }

        if me.speed < HOLE_SPEED && survives(board, &me, Action::SpeedUp, true) {
            return Action::SpeedUp;
        }

        if survives(board, &me, Action::ChangeNothing, true) {
            return Action::ChangeNothing;
        }
        Action::ALL
            .iter()
            .copied()
            .find(|&a| survives(board, &me, a, true))
            .unwrap_or_else(|| SuperRandom.decide(board, id, rng))
    }
}
