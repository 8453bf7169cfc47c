// Fixed action sequences

use rand::RngCore;

use super::{acting, survives, Policy, PolicyKind, Snail};
use crate::board::Board;
use crate::types::Action;

use crate::types::Action::{ChangeNothing as N, SlowDown as D, SpeedUp as U, TurnLeft as L, TurnRight as R};

/// Never changes anything; rides straight into whatever comes
pub struct EndRound;

impl Policy for EndRound {
    fn kind(&self) -> PolicyKind {
        PolicyKind::EndRound
    }

    fn decide(&mut self, _board: &Board, _id: u8, _rng: &mut dyn RngCore) -> Action {
        Action::ChangeNothing
    }
}

const HEART: [Action; 16] = [N, N, L, N, R, N, R, N, R, N, N, L, N, L, N, R];
const CHRISTMAS: [Action; 14] = [U, N, R, D, N, R, N, L, N, L, N, R, N, R];

/// Replays a drawing pattern indexed by the player's step counter and
/// drops to snail behaviour whenever the next step would be fatal
pub struct Pattern {
    kind: PolicyKind,
    steps: &'static [Action],
}

impl Pattern {
    pub fn heart() -> Self {
        Pattern { kind: PolicyKind::Heart, steps: &HEART }
    }

    pub fn christmas() -> Self {
        Pattern { kind: PolicyKind::Christmas, steps: &CHRISTMAS }
    }
}

impl Policy for Pattern {
    fn kind(&self) -> PolicyKind {
        self.kind
    }

    fn decide(&mut self, board: &Board, id: u8, _rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };
        let planned = self.steps[me.step_counter as usize % self.steps.len()];
        if survives(board, &me, planned, true) {
            planned
        } else {
            Snail::choose(board, &me)
        }
    }
}
