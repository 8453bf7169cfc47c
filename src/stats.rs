// Per-turn aggregation of rollout results

use serde::Serialize;

use crate::simulator::RolloutResult;
use crate::types::Action;

/// Aggregate over all rollouts seeded with one action
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionStats {
    pub run: u64,
    pub won: u64,
    pub survived: u64,
    pub survived_opponent: u64,
    pub rounds: u64,
    /// Survival of every rollout; sorted ascending once the turn is finalized
    pub survived_list: Vec<u32>,
    pub longest_opponent: u32,
}

impl ActionStats {
    pub fn win_rate(&self) -> f64 {
        if self.run == 0 {
            0.0
        } else {
            self.won as f64 / self.run as f64
        }
    }

    pub fn mean_survival(&self) -> f64 {
        if self.run == 0 {
            0.0
        } else {
            self.survived as f64 / self.run as f64
        }
    }

    /// Lower quartile, median and upper quartile of the sorted survival
    /// list, read at indices `len/4`, `len/2` and `len/4*3`
    ///
    /// `None` until at least one rollout was recorded.
    pub fn quartiles(&self) -> Option<[u32; 3]> {
        let n = self.survived_list.len();
        if n == 0 {
            return None;
        }
        let list = &self.survived_list;
        Some([list[n / 4], list[n / 2], list[n / 4 * 3]])
    }
}

/// Everything the collector learned during one turn
#[derive(Debug, Clone, Default, Serialize)]
pub struct TurnStats {
    /// Indexed by `Action::index`
    pub actions: [ActionStats; 5],
    pub longest_win: u32,
    pub longest_win_action: Option<Action>,
    pub longest: u32,
    pub longest_action: Option<Action>,
}

impl TurnStats {
    pub fn new() -> Self {
        TurnStats::default()
    }

    pub fn record(&mut self, result: &RolloutResult) {
        let stats = &mut self.actions[result.seed.index()];
        stats.run += 1;
        stats.survived += u64::from(result.survived);
        stats.survived_opponent += u64::from(result.survived_opponent);
        stats.rounds += u64::from(result.rounds);
        stats.survived_list.push(result.survived);
        stats.longest_opponent = stats.longest_opponent.max(result.survived_opponent);

        if result.won {
            stats.won += 1;
            if result.survived > self.longest_win {
                self.longest_win = result.survived;
                self.longest_win_action = Some(result.seed);
            }
        }
        if result.survived > self.longest {
            self.longest = result.survived;
            self.longest_action = Some(result.seed);
        }
    }

    /// Sorts the survival lists; call once after the last `record`
    pub fn finalize(&mut self) {
        for stats in &mut self.actions {
            stats.survived_list.sort_unstable();
        }
    }

    pub fn get(&self, action: Action) -> &ActionStats {
        &self.actions[action.index()]
    }

    pub fn total_runs(&self) -> u64 {
        self.actions.iter().map(|s| s.run).sum()
    }
}
