// Meta policy: asks a panel of policies and keeps the proposal that
// survives longest in a short solo look-ahead

use rand::RngCore;

use super::{acting, Policy, PolicyKind, SuperRandom};
use crate::board::Board;
use crate::config::HeuristicsConfig;
use crate::simulator::play_round;
use crate::types::Action;

pub struct Meta {
    members: Vec<Box<dyn Policy>>,
    lookahead: u32,
}

impl Meta {
    pub fn new(cfg: &HeuristicsConfig) -> Self {
        let members = cfg
            .meta_members
            .iter()
            .filter(|&&k| k != PolicyKind::Meta)
            .map(|k| k.build(cfg))
            .collect();
        Meta {
            members,
            lookahead: cfg.meta_lookahead_rounds.max(1),
        }
    }

    /// Rounds `id` survives when it plays `first` and then follows member
    /// `member` on a board where everyone else has stopped
    fn solo_rounds(&mut self, board: &Board, id: u8, first: Action, member: usize, rng: &mut dyn RngCore) -> u32 {
        let mut scratch = board.clone();
        for p in scratch.players.iter_mut().filter(|p| p.id != id) {
            p.active = false;
        }
        let Some(seat) = scratch.players.iter().position(|p| p.id == id) else {
            return 0;
        };

        let mut actions = vec![None; scratch.players.len()];
        let mut action = first;
        let mut survived = 0;
        while survived < self.lookahead {
            actions[seat] = Some(action);
            play_round(&mut scratch, &actions);
            if !scratch.players[seat].active {
                break;
            }
            survived += 1;
            action = self.members[member].decide(&scratch, id, rng);
        }
        survived
    }
}

impl Policy for Meta {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Meta
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        if acting(board, id).is_none() {
            return Action::ChangeNothing;
        }

        let mut tried: Vec<Action> = Vec::with_capacity(self.members.len());
        let mut best: Option<(Action, u32)> = None;
        for member in 0..self.members.len() {
            let proposal = self.members[member].decide(board, id, rng);
            if tried.contains(&proposal) {
                continue;
            }
            tried.push(proposal);

            let score = self.solo_rounds(board, id, proposal, member, rng);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((proposal, score));
            }
        }

        match best {
            Some((action, _)) => action,
            None => SuperRandom.decide(board, id, rng),
        }
    }
}
