// Mirror: copy the nearest opponent, heading the opposite way

use rand::RngCore;

use super::{acting, survives, Policy, PolicyKind, SuperRandom};
use crate::board::{Board, Player};
use crate::types::Action;

pub struct Mirror;

fn nearest_opponent(board: &Board, me: &Player) -> Option<Player> {
    board
        .players
        .iter()
        .filter(|p| p.active && p.id != me.id)
        .min_by_key(|p| (p.x - me.x).abs() + (p.y - me.y).abs())
        .copied()
}

impl Mirror {
    fn mirrored(me: &Player, other: &Player) -> Action {
        let target = other.direction.opposite();
        if me.direction == target {
            return match other.speed.cmp(&me.speed) {
                std::cmp::Ordering::Greater => Action::SpeedUp,
                std::cmp::Ordering::Less => Action::SlowDown,
                std::cmp::Ordering::Equal => Action::ChangeNothing,
            };
        }
        if me.direction.turned_left() == target {
            Action::TurnLeft
        } else {
            Action::TurnRight
        }
    }
}

impl Policy for Mirror {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Mirror
    }

    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action {
        let Some(me) = acting(board, id) else {
            return Action::ChangeNothing;
        };
        if let Some(other) = nearest_opponent(board, &me) {
            let action = Mirror::mirrored(&me, &other);
            if survives(board, &me, action, true) {
                return action;
            }
        }
        SuperRandom.decide(board, id, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn player(id: u8, x: i32, y: i32, direction: Direction, speed: i32) -> Player {
        Player { id, x, y, direction, speed, active: true, step_counter: 1 }
    }

    #[test]
    fn test_turns_towards_mirrored_heading() {
        let mut board = Board::new(10, 6);
        board.add_player(player(1, 2, 2, Direction::Up, 1));
        board.add_player(player(2, 6, 2, Direction::Left, 1));
        board.set_cell(2, 2, 1);
        board.set_cell(6, 2, 2);
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(Mirror.decide(&board, 1, &mut rng), Action::TurnRight);
    }

    #[test]
    fn test_matches_speed_when_aligned() {
        let mut board = Board::new(20, 6);
        board.add_player(player(1, 2, 2, Direction::Right, 1));
        board.add_player(player(2, 15, 4, Direction::Left, 3));
        board.set_cell(2, 2, 1);
        board.set_cell(15, 4, 2);
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(Mirror.decide(&board, 1, &mut rng), Action::SpeedUp);
    }

    #[test]
    fn test_alone_behaves_like_super_random() {
        let mut board = Board::from_rows(&[&[1, 0, 0], &[0, 0, 0]]);
        board.add_player(player(1, 0, 0, Direction::Up, 1));
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(Mirror.decide(&board, 1, &mut rng), Action::TurnRight);
    }
}
