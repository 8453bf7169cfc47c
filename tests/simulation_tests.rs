//! Rollout kernel tests
//!
//! Literal boards played through `Simulator::simulate` and `play_round`,
//! covering early cut-offs, the hole rule and simultaneous collisions.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use speed_montecarlo::board::{Board, Player};
use speed_montecarlo::config::{Config, PoolEntry};
use speed_montecarlo::policy::PolicyKind;
use speed_montecarlo::rules::{COLLISION, MAX_PLAYERS};
use speed_montecarlo::simulator::{play_round, RolloutResult, Simulator};
use speed_montecarlo::types::{Action, Direction};

fn player(id: u8, x: i32, y: i32, direction: Direction, speed: i32, step_counter: u32) -> Player {
    Player {
        id,
        x,
        y,
        direction,
        speed,
        active: true,
        step_counter,
    }
}

/// Every seat, including our own after the seed, just keeps going
fn straight_ahead_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.rollout.self_policy = PolicyKind::EndRound;
    config.rollout.first_round_policy = PolicyKind::EndRound;
    config.rollout.opponent_pool = vec![PoolEntry {
        policy: PolicyKind::EndRound,
        weight: 1,
    }];
    config
}

fn simulate(config: &Config, board: Board, seed: Action) -> RolloutResult {
    let mut simulator = Simulator::new(&config.rollout, &config.heuristics);
    let mut rng = SmallRng::seed_from_u64(42);
    simulator.simulate(board, seed, &mut rng)
}

#[test]
fn test_single_player_wins_immediately() {
    let mut board = Board::new(5, 1);
    board.add_player(player(1, 0, 0, Direction::Right, 1, 0));

    let result = simulate(&Config::default_hardcoded(), board, Action::ChangeNothing);
    assert!(result.won);
    assert_eq!(result.rounds, 1);
    assert_eq!(result.survived, 1);
    assert_eq!(result.survived_opponent, 0);
}

#[test]
fn test_head_on_tie() {
    let mut board = Board::new(5, 1);
    board.add_player(player(1, 0, 0, Direction::Right, 1, 0));
    board.add_player(player(2, 4, 0, Direction::Left, 1, 0));

    // round 1 takes both to (1,0) and (3,0); round 2 both enter (2,0)
    let result = simulate(&straight_ahead_config(), board, Action::ChangeNothing);
    assert!(!result.won);
    assert_eq!(result.rounds, 2);
    assert_eq!(result.survived, 2);
    assert_eq!(result.survived_opponent, 2);
}

#[test]
fn test_head_on_collision_marks_the_cell() {
    let mut board = Board::new(5, 1);
    board.add_player(player(1, 1, 0, Direction::Right, 1, 1));
    board.add_player(player(2, 3, 0, Direction::Left, 1, 1));

    play_round(&mut board, &[Some(Action::ChangeNothing), Some(Action::ChangeNothing)]);
    assert_eq!(board.cell(2, 0), COLLISION);
    assert!(!board.players[0].active);
    assert!(!board.players[1].active);
    assert_eq!(board.active_count(), 0);
}

#[test]
fn test_hole_jump_survives() {
    let rows: &[&[i8]] = &[&[0, 0, 2, 2, 2, 2, 2, 0, 0]];
    let mut board = Board::from_rows(rows);
    board.add_player(player(1, 0, 0, Direction::Right, 7, 5));

    let result = simulate(&Config::default_hardcoded(), board.clone(), Action::ChangeNothing);
    assert!(result.won);
    assert_eq!(result.rounds, 1);

    play_round(&mut board, &[Some(Action::ChangeNothing)]);
    let me = board.players[0];
    assert!(me.active);
    assert_eq!((me.x, me.y), (7, 0));
    assert_eq!(me.step_counter, 6);
    // first and last cell of the move stamped, interior untouched
    assert_eq!(board.row(0), &[0, 1, 2, 2, 2, 2, 2, 1, 0]);
}

#[test]
fn test_suicidal_speed_up_is_cut_off() {
    let mut board = Board::new(2, 1);
    board.add_player(player(1, 0, 0, Direction::Right, 10, 0));

    let result = simulate(&Config::default_hardcoded(), board, Action::SpeedUp);
    assert_eq!(
        result,
        RolloutResult {
            seed: Action::SpeedUp,
            won: false,
            survived: 0,
            survived_opponent: 0,
            rounds: 0,
        }
    );
}

#[test]
fn test_slow_down_at_minimum_speed_is_cut_off() {
    let mut board = Board::new(10, 10);
    board.add_player(player(1, 5, 5, Direction::Up, 1, 0));
    board.add_player(player(2, 1, 1, Direction::Down, 1, 0));

    let result = simulate(&Config::default_hardcoded(), board, Action::SlowDown);
    assert!(!result.won);
    assert_eq!((result.survived, result.rounds), (0, 0));
}

#[test]
fn test_leaving_the_board_in_round_one() {
    let mut board = Board::new(6, 6);
    // a hole round and a high speed do not help against the border
    board.add_player(player(1, 0, 3, Direction::Left, 4, 5));
    board.add_player(player(2, 5, 5, Direction::Up, 1, 0));

    let result = simulate(&straight_ahead_config(), board, Action::ChangeNothing);
    assert!(!result.won);
    assert_eq!(result.rounds, 1);
    assert_eq!(result.survived, 1);
}

#[test]
fn test_dead_self_keeps_simulating_while_opponents_fight() {
    let mut board = Board::new(10, 3);
    board.add_player(player(1, 0, 0, Direction::Up, 1, 0));
    // 2 and 3 meet head-on after a few rounds
    board.add_player(player(2, 1, 2, Direction::Right, 1, 0));
    board.add_player(player(3, 7, 2, Direction::Left, 1, 0));

    let result = simulate(&straight_ahead_config(), board, Action::ChangeNothing);
    assert!(!result.won);
    assert_eq!(result.survived, 1);
    assert_eq!(result.rounds, 3);
    assert_eq!(result.survived_opponent, 3);
}

#[test]
fn test_crossing_in_a_hole_round_is_symmetric() {
    let mut board = Board::new(5, 5);
    board.add_player(player(1, 0, 2, Direction::Right, 3, 5));
    board.add_player(player(2, 2, 0, Direction::Down, 3, 5));

    play_round(&mut board, &[Some(Action::ChangeNothing), Some(Action::ChangeNothing)]);

    // both pass over (2,2) without stamping it
    assert_eq!(board.cell(2, 2), 0);
    assert!(board.players[0].active);
    assert!(board.players[1].active);
    assert_eq!(board.cell(1, 2), 1);
    assert_eq!(board.cell(3, 2), 1);
    assert_eq!(board.cell(2, 1), 2);
    assert_eq!(board.cell(2, 3), 2);
}

#[test]
fn test_same_seed_same_rollout() {
    let mut board = Board::new(20, 20);
    board.add_player(player(1, 3, 3, Direction::Right, 1, 0));
    board.add_player(player(2, 16, 3, Direction::Down, 1, 0));
    board.add_player(player(3, 10, 16, Direction::Left, 2, 0));

    let config = Config::default_hardcoded();
    for seed in Action::ALL {
        let a = {
            let mut sim = Simulator::new(&config.rollout, &config.heuristics);
            sim.simulate(board.clone(), seed, &mut SmallRng::seed_from_u64(1234))
        };
        let b = {
            let mut sim = Simulator::new(&config.rollout, &config.heuristics);
            sim.simulate(board.clone(), seed, &mut SmallRng::seed_from_u64(1234))
        };
        assert_eq!(a, b, "seed action {} diverged", seed);
    }
}

#[test]
fn test_rollout_leaves_the_real_board_alone() {
    let mut board = Board::new(12, 12);
    board.add_player(player(1, 2, 2, Direction::Right, 1, 0));
    board.add_player(player(2, 9, 9, Direction::Left, 1, 0));
    let before = board.clone();

    let config = Config::default_hardcoded();
    let mut simulator = Simulator::new(&config.rollout, &config.heuristics);
    let mut rng = SmallRng::seed_from_u64(9);
    for seed in Action::ALL {
        let result = simulator.simulate(board.clone(), seed, &mut rng);
        assert!(result.rounds >= result.survived || result.won);
    }
    assert_eq!(board, before);
}

/// Checks the board invariants after every round of mixed-policy games:
/// cells stay in range, live heads sit on their own mark (or a collision)
/// and eliminated players stay out where they fell.
#[test]
fn test_board_invariants_hold_through_mixed_games() {
    let heuristics = Config::default_hardcoded().heuristics;
    let kinds = [
        PolicyKind::BadRandom,
        PolicyKind::SuperRandom,
        PolicyKind::Snail,
        PolicyKind::JumpingSnail,
        PolicyKind::Jump,
        PolicyKind::JumpingLargestFree,
        PolicyKind::Mirror,
        PolicyKind::Heart,
    ];
    let starts = [
        (2, 2, Direction::Right),
        (17, 2, Direction::Down),
        (17, 17, Direction::Left),
        (2, 17, Direction::Up),
        (9, 6, Direction::Left),
        (10, 13, Direction::Right),
    ];

    for game in 0..12u64 {
        let mut rng = SmallRng::seed_from_u64(game);
        let mut board = Board::new(20, 20);
        for (i, &(x, y, direction)) in starts.iter().enumerate() {
            let id = i as u8 + 1;
            board.add_player(Player {
                id,
                x,
                y,
                direction,
                speed: 1 + (game as i32 + i as i32) % 4,
                active: true,
                step_counter: 0,
            });
            board.set_cell(x, y, id as i8);
        }
        let mut policies: Vec<_> = (0..starts.len())
            .map(|i| kinds[(game as usize + i) % kinds.len()].build(&heuristics))
            .collect();

        let mut fallen: Vec<Option<(i32, i32)>> = vec![None; starts.len()];
        for _ in 0..400 {
            if board.active_count() <= 1 {
                break;
            }
            let actions: Vec<Option<Action>> = board
                .players
                .iter()
                .zip(policies.iter_mut())
                .map(|(p, policy)| p.active.then(|| policy.decide(&board, p.id, &mut rng)))
                .collect();
            play_round(&mut board, &actions);

            assert!(board
                .cells()
                .iter()
                .all(|&v| (COLLISION..=MAX_PLAYERS as i8).contains(&v)));
            for (i, p) in board.players.iter().enumerate() {
                if p.active {
                    assert!(fallen[i].is_none(), "player {} came back in game {}", p.id, game);
                    let head = board.cell(p.x, p.y);
                    assert!(head == p.id as i8 || head == COLLISION, "head of {} holds {}", p.id, head);
                } else {
                    match fallen[i] {
                        Some(pos) => assert_eq!((p.x, p.y), pos, "player {} moved after elimination", p.id),
                        None => fallen[i] = Some((p.x, p.y)),
                    }
                }
            }
        }
    }
}
