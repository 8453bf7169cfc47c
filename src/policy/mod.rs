// Heuristic policies
//
// Every policy maps a board plus the acting player id to one action. They
// drive both the self-player after the seed action and every opponent seat
// in a rollout, so they have to be cheap. A policy never mutates the board
// it is shown; the scratch it keeps (flood-fill buffers) is per instance
// and instances are never shared between threads.

mod jump;
mod largest_free;
mod meta;
mod mirror;
mod pattern;
mod random;
mod snail;

pub use jump::Jump;
pub use largest_free::LargestFree;
pub use meta::Meta;
pub use mirror::Mirror;
pub use pattern::{EndRound, Pattern};
pub use random::{BadRandom, Random, RandomSlow, SuperRandom};
pub use snail::{JumpingSnail, Snail, SuperSnail};

use rand::{Rng, RngCore};
use serde::Deserialize;

use crate::board::{Board, Player};
use crate::config::{HeuristicsConfig, PoolEntry};
use crate::rules::{is_hole, trace_move, MoveOutcome};
use crate::types::Action;

pub trait Policy: Send {
    fn kind(&self) -> PolicyKind;

    /// Chooses the next action of player `id`.
    ///
    /// Must tolerate `id` being inactive (any action is fine then, it is
    /// ignored by the simulator).
    fn decide(&mut self, board: &Board, id: u8, rng: &mut dyn RngCore) -> Action;
}

/// Names of all available policies, as used in Speed.toml
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    BadRandom,
    Random,
    RandomSlow,
    SuperRandom,
    Snail,
    SuperSnail,
    JumpingSnail,
    Jump,
    LargestFree,
    JumpingLargestFree,
    Mirror,
    EndRound,
    Meta,
    Heart,
    Christmas,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 15] = [
        PolicyKind::BadRandom,
        PolicyKind::Random,
        PolicyKind::RandomSlow,
        PolicyKind::SuperRandom,
        PolicyKind::Snail,
        PolicyKind::SuperSnail,
        PolicyKind::JumpingSnail,
        PolicyKind::Jump,
        PolicyKind::LargestFree,
        PolicyKind::JumpingLargestFree,
        PolicyKind::Mirror,
        PolicyKind::EndRound,
        PolicyKind::Meta,
        PolicyKind::Heart,
        PolicyKind::Christmas,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::BadRandom => "bad_random",
            PolicyKind::Random => "random",
            PolicyKind::RandomSlow => "random_slow",
            PolicyKind::SuperRandom => "super_random",
            PolicyKind::Snail => "snail",
            PolicyKind::SuperSnail => "super_snail",
            PolicyKind::JumpingSnail => "jumping_snail",
            PolicyKind::Jump => "jump",
            PolicyKind::LargestFree => "largest_free",
            PolicyKind::JumpingLargestFree => "jumping_largest_free",
            PolicyKind::Mirror => "mirror",
            PolicyKind::EndRound => "end_round",
            PolicyKind::Meta => "meta",
            PolicyKind::Heart => "heart",
            PolicyKind::Christmas => "christmas",
        }
    }

    /// Instantiates a fresh policy of this kind
    pub fn build(self, cfg: &HeuristicsConfig) -> Box<dyn Policy> {
        match self {
            PolicyKind::BadRandom => Box::new(BadRandom),
            PolicyKind::Random => Box::new(Random),
            PolicyKind::RandomSlow => Box::new(RandomSlow),
            PolicyKind::SuperRandom => Box::new(SuperRandom),
            PolicyKind::Snail => Box::new(Snail),
            PolicyKind::SuperSnail => Box::new(SuperSnail::new(cfg.super_snail_lookahead)),
            PolicyKind::JumpingSnail => Box::new(JumpingSnail::new(cfg)),
            PolicyKind::Jump => Box::new(Jump::new(cfg)),
            PolicyKind::LargestFree => Box::new(LargestFree::new(false, cfg.largest_free_cutoff)),
            PolicyKind::JumpingLargestFree => Box::new(LargestFree::new(true, cfg.largest_free_cutoff)),
            PolicyKind::Mirror => Box::new(Mirror),
            PolicyKind::EndRound => Box::new(EndRound),
            PolicyKind::Meta => Box::new(Meta::new(cfg)),
            PolicyKind::Heart => Box::new(Pattern::heart()),
            PolicyKind::Christmas => Box::new(Pattern::christmas()),
        }
    }
}

/// Lazily built instances, one per kind, owned by a single worker
///
/// Policies keep no per-player state, so seats sharing a kind share the
/// instance (and its scratch buffers).
pub struct PolicyBook {
    cfg: HeuristicsConfig,
    slots: Vec<Option<Box<dyn Policy>>>,
}

impl PolicyBook {
    pub fn new(cfg: &HeuristicsConfig) -> Self {
        PolicyBook {
            cfg: cfg.clone(),
            slots: PolicyKind::ALL.iter().map(|_| None).collect(),
        }
    }

    pub fn get(&mut self, kind: PolicyKind) -> &mut dyn Policy {
        let cfg = &self.cfg;
        self.slots[kind.index()]
            .get_or_insert_with(|| kind.build(cfg))
            .as_mut()
    }
}

/// Weighted pool opponent seats draw their policy from
#[derive(Debug, Clone)]
pub struct PolicyPool {
    entries: Vec<(PolicyKind, u32)>,
    total: u32,
}

impl PolicyPool {
    pub fn new(entries: &[PoolEntry]) -> Self {
        let entries: Vec<(PolicyKind, u32)> = entries
            .iter()
            .filter(|e| e.weight > 0)
            .map(|e| (e.policy, e.weight))
            .collect();
        let total = entries.iter().map(|(_, w)| w).sum();
        PolicyPool { entries, total }
    }

    /// Draws a policy kind proportionally to its weight
    pub fn pick(&self, rng: &mut dyn RngCore) -> PolicyKind {
        if self.total == 0 {
            return PolicyKind::SuperRandom;
        }
        let mut roll = rng.random_range(0..self.total);
        for &(kind, weight) in &self.entries {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        PolicyKind::SuperRandom
    }
}

/// Copy of the acting player if it is present and active
pub(crate) fn acting(board: &Board, id: u8) -> Option<Player> {
    board.player(id).copied().filter(|p| p.active)
}

/// Outcome of playing `action` from `player`'s current state, ignoring
/// everyone else's moves this round. `None` when the speed leaves its range.
pub(crate) fn outcome(board: &Board, player: &Player, action: Action, use_holes: bool) -> Option<(Player, MoveOutcome)> {
    let moved = player.projected(action)?;
    let result = trace_move(board, &moved, use_holes);
    Some((moved, result))
}

/// Whether a projected straight move ends (and so stays) on the board
pub(crate) fn lands_on_board(board: &Board, moved: &Player) -> bool {
    let (dx, dy) = moved.direction.delta();
    board.in_bounds(moved.x + dx * moved.speed, moved.y + dy * moved.speed)
}

/// Cells a projected move will stamp, head of the move last
pub(crate) fn stamped_path(moved: &Player, use_holes: bool) -> Vec<(i32, i32)> {
    let (dx, dy) = moved.direction.delta();
    (0..moved.speed)
        .filter(|&s| !(use_holes && is_hole(moved.speed, moved.step_counter, s)))
        .map(|s| (moved.x + dx * (s + 1), moved.y + dy * (s + 1)))
        .collect()
}

/// Whether `action` survives the next move against the current cells
pub(crate) fn survives(board: &Board, player: &Player, action: Action, use_holes: bool) -> bool {
    outcome(board, player, action, use_holes).map_or(false, |(_, o)| o.is_clear())
}
