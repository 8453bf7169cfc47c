// Final action choice from the turn's aggregates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SelectionConfig;
use crate::stats::TurnStats;
use crate::types::Action;

/// Which rule picked the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    HighWinRate,
    AverageLength,
    LongestPath,
    Fallback,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::HighWinRate => "win > 85%",
            Reason::AverageLength => "average length",
            Reason::LongestPath => "longest path",
            Reason::Fallback => "fallback",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub reason: Reason,
}

/// Applies the first matching rule:
/// 1. highest win rate strictly above `win_threshold`
/// 2. highest mean survival among actions winning more than `viability_floor`
/// 3. the action of the longest single survival
/// 4. `change_nothing`
///
/// Ties go to the earlier action in `Action::ALL`.
pub fn select_action(stats: &TurnStats, cfg: &SelectionConfig) -> Decision {
    let mut best_rate = 0.0;
    let mut by_rate = None;
    for action in Action::ALL {
        let s = stats.get(action);
        if s.run == 0 {
            continue;
        }
        let rate = s.win_rate();
        if rate > cfg.win_threshold && rate > best_rate {
            best_rate = rate;
            by_rate = Some(action);
        }
    }
    if let Some(action) = by_rate {
        return Decision { action, reason: Reason::HighWinRate };
    }

    let mut best_mean = 0.0;
    let mut by_mean = None;
    for action in Action::ALL {
        let s = stats.get(action);
        if s.run == 0 || s.win_rate() <= cfg.viability_floor {
            continue;
        }
        let mean = s.mean_survival();
        if mean > best_mean {
            best_mean = mean;
            by_mean = Some(action);
        }
    }
    if let Some(action) = by_mean {
        return Decision { action, reason: Reason::AverageLength };
    }

    if let Some(action) = stats.longest_action {
        return Decision { action, reason: Reason::LongestPath };
    }

    Decision {
        action: Action::ChangeNothing,
        reason: Reason::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn seeded(entries: &[(Action, u64, u64, u64)]) -> TurnStats {
        let mut stats = TurnStats::new();
        for &(action, run, won, survived) in entries {
            let s = &mut stats.actions[action.index()];
            s.run = run;
            s.won = won;
            s.survived = survived;
        }
        stats
    }

    #[test]
    fn test_empty_stats_fall_back() {
        let cfg = Config::default_hardcoded().selection;
        let decision = select_action(&TurnStats::new(), &cfg);
        assert_eq!(decision.action, Action::ChangeNothing);
        assert_eq!(decision.reason, Reason::Fallback);
        assert_eq!(decision.reason.to_string(), "fallback");
    }

    #[test]
    fn test_threshold_is_strict() {
        let cfg = Config::default_hardcoded().selection;
        // exactly 85% is not enough; 10% viability is not enough either
        let stats = seeded(&[(Action::TurnRight, 100, 85, 500), (Action::SlowDown, 100, 10, 900)]);
        let decision = select_action(&stats, &cfg);
        assert_eq!(decision.action, Action::TurnRight);
        assert_eq!(decision.reason, Reason::AverageLength);
    }

    #[test]
    fn test_ties_keep_iteration_order() {
        let cfg = Config::default_hardcoded().selection;
        let stats = seeded(&[(Action::ChangeNothing, 10, 9, 10), (Action::TurnRight, 10, 9, 10)]);
        assert_eq!(select_action(&stats, &cfg).action, Action::TurnRight);
    }
}
