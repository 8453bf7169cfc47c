// Largest free region: move towards the most room

use rand::RngCore;

use super::{acting, outcome, stamped_path, Policy, PolicyKind, SuperRandom};
use crate::board::Board;
use crate::flood_fill::FloodFill;
use crate::rules::MoveOutcome;
use crate::types::Action;

/// Picks the surviving action whose landing cell reaches the most empty
/// cells once the move itself is stamped.
///
/// The jumping variant also considers moves that only survive thanks to a
/// hole, so it will happily cross a tail into a bigger region.
pub struct LargestFree {
    jumping: bool,
    cutoff: usize,
    flood_fill: FloodFill,
}

impl LargestFree {
    pub fn new(jumping: bool, cutoff: usize) -> Self {
        LargestFree {
            jumping,
            cutoff,
            flood_fill: FloodFill::new(),
        }
    }
}

impl Policy for LargestFree {
    fn kind(&self) -> PolicyKind {
        if self.jumping {
            PolicyKind::JumpingLargestFree
        } else {
            PolicyKind::LargestFree
        }
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };

        let mut best: Option<(Action, usize)> = None;
        for action in Action::ALL {
            let Some((moved, MoveOutcome::Clear { x, y, .. })) = outcome(board, &me, action, self.jumping) else {
                continue;
            };
            let blocked = stamped_path(&moved, self.jumping);
            let room = self
                .flood_fill
                .free_reachable_excluding(board, x, y, Some(self.cutoff), &blocked);
            if best.map_or(true, |(_, r)| room > r) {
                best = Some((action, room));
            }
        }

        match best {
            Some((action, _)) => action,
            None => SuperRandom.decide(board, id, rng),
        }
    }
}
