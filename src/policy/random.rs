// Random policies, from no safety at all to a one-move safety screen

use rand::{Rng, RngCore};

use super::{acting, lands_on_board, Policy, PolicyKind};
use crate::board::Board;
use crate::types::Action;

fn pick(candidates: &[Action], rng: &mut dyn RngCore) -> Option<Action> {
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}

/// Uniform over all five actions, no safety check at all
pub struct BadRandom;

impl Policy for BadRandom {
    fn kind(&self) -> PolicyKind {
        PolicyKind::BadRandom
    }

    fn decide(&mut self, _board: &Board, _id: u8, rng: &mut dyn RngCore) -> Action {
        Action::ALL[rng.random_range(0..Action::ALL.len())]
    }
}

/// Uniform over the actions that keep the speed legal and the move on the board
pub struct Random;

impl Random {
    pub(crate) fn candidates(board: &Board, id: u8) -> Vec<Action> {
        let Some(me) = acting(board, id) else {
            return Vec::new();
        };
        Action::ALL
            .iter()
            .copied()
            // tails are ignored here, only walls and speed limits count
            .filter(|&a| me.projected(a).map_or(false, |moved| lands_on_board(board, &moved)))
            .collect()
    }
}

impl Policy for Random {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        pick(&Random::candidates(board, id), rng).unwrap_or_else(|| BadRandom.decide(board, id, rng))
    }
}

/// Like `Random` but never accelerates
pub struct RandomSlow;

impl Policy for RandomSlow {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RandomSlow
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        let mut candidates = Random::candidates(board, id);
        candidates.retain(|&a| a != Action::SpeedUp);
        pick(&candidates, rng).unwrap_or(Action::ChangeNothing)
    }
}

/// Uniform over the actions whose move stays on the board and only enters
/// empty cells (hole cells excepted). Default rollout policy.
pub struct SuperRandom;

impl SuperRandom {
    pub(crate) fn candidates(board: &Board, id: u8) -> Vec<Action> {
        let Some(me) = acting(board, id) else {
            return Vec::new();
        };
        Action::ALL
            .iter()
            .copied()
            .filter(|&a| super::survives(board, &me, a, true))
            .collect()
    }
}

impl Policy for SuperRandom {
    fn kind(&self) -> PolicyKind {
        PolicyKind::SuperRandom
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        match pick(&SuperRandom::candidates(board, id), rng) {
            Some(action) => action,
            None => Random.decide(board, id, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Player;
    use crate::types::Direction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn corner_board() -> Board {
        // player 1 in the top-left corner heading up, tail to its right
        let mut board = Board::from_rows(&[&[1, 2, 0], &[0, 0, 0], &[0, 0, 0]]);
        board.add_player(Player {
            id: 1,
            x: 0,
            y: 0,
            direction: Direction::Up,
            speed: 1,
            active: true,
            step_counter: 0,
        });
        board
    }

    #[test]
    fn test_random_screens_walls_and_speed() {
        let board = corner_board();
        // up and left are walls and slowing to 0 is fatal; turning right
        // heads into the tail, which Random does not look at
        assert_eq!(Random::candidates(&board, 1), vec![Action::TurnRight]);
    }

    #[test]
    fn test_super_random_avoids_tails() {
        let board = corner_board();
        assert!(SuperRandom::candidates(&board, 1).is_empty());

        let mut open = corner_board();
        open.set_cell(1, 0, 0);
        assert_eq!(SuperRandom::candidates(&open, 1), vec![Action::TurnRight]);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(SuperRandom.decide(&open, 1, &mut rng), Action::TurnRight);
        }
    }

    #[test]
    fn test_random_slow_never_speeds_up() {
        let mut board = Board::new(20, 20);
        board.add_player(Player {
            id: 1,
            x: 10,
            y: 10,
            direction: Direction::Right,
            speed: 2,
            active: true,
            step_counter: 0,
        });
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_ne!(RandomSlow.decide(&board, 1, &mut rng), Action::SpeedUp);
        }
    }
}
