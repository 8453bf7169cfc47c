// Per-turn orchestration
//
// The session hands over a validated board and its deadline; the bot moves
// the CPU-bound Monte-Carlo run onto a blocking thread, waits for it no
// longer than the collector deadline allows, and turns the statistics into
// a decision.

use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::board::Board;
use crate::config::Config;
use crate::controller::{Deadlines, MonteCarlo};
use crate::error::EngineError;
use crate::selector::{select_action, Decision};
use crate::simulator::is_jump;
use crate::stats::TurnStats;

/// Grace period past the collector deadline before the bot gives up on the
/// blocking task and answers with the results collected so far
const JOIN_GRACE: Duration = Duration::from_millis(100);

/// Everything known about one decided turn
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub round: u32,
    pub decision: Decision,
    pub stats: TurnStats,
    /// The chosen action jumps a stamped cell
    pub jump: bool,
    pub elapsed: Duration,
    /// No rollout result arrived in time; the decision is the fallback
    pub deadline_missed: bool,
}

/// spe_ed player backed by the Monte-Carlo controller
pub struct Bot {
    config: Config,
    engine: Arc<MonteCarlo>,
    max: Option<Duration>,
}

impl Bot {
    /// Creates a new Bot
    ///
    /// # Arguments
    /// * `config` - Static configuration for the whole game
    /// * `max` - Optional cap on per-turn compute time
    pub fn new(config: Config, max: Option<Duration>) -> Self {
        let engine = Arc::new(MonteCarlo::new(&config));
        Bot { config, engine, max }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decides the action for `board` before `deadline` (RFC3339)
    pub async fn get_move(&self, board: Board, deadline: &str, round: u32) -> Result<TurnReport, EngineError> {
        let deadlines = Deadlines::from_server(deadline, self.max, &self.config.timing)?;
        let start_time = Instant::now();
        let board = Arc::new(board);

        let stats = Arc::new(Mutex::new(TurnStats::new()));
        let engine = Arc::clone(&self.engine);
        let task_board = Arc::clone(&board);
        let task_stats = Arc::clone(&stats);
        let task = tokio::task::spawn_blocking(move || engine.run_into(task_board, deadlines, &task_stats));

        let wait = deadlines.collector.saturating_duration_since(Instant::now()) + JOIN_GRACE;
        let stats = join_rollouts(task, wait, &stats, round).await?;

        Ok(self.finish_turn(&board, stats, round, start_time))
    }

    /// Blocking variant used where no runtime is around (replay)
    pub fn decide_now(&self, board: Arc<Board>, deadlines: Deadlines, round: u32) -> TurnReport {
        let start_time = Instant::now();
        let stats = self.engine.run(Arc::clone(&board), deadlines);
        self.finish_turn(&board, stats, round, start_time)
    }

    fn finish_turn(&self, board: &Board, stats: TurnStats, round: u32, start_time: Instant) -> TurnReport {
        let decision = select_action(&stats, &self.config.selection);
        let runs = stats.total_runs();
        let deadline_missed = runs == 0;
        if deadline_missed {
            warn!("Round {}: no rollout result before the deadline, answering {}", round, decision.action);
        }

        let elapsed = start_time.elapsed();
        info!(
            "Round {}: Chose {} ({}, {} rollouts, {}ms)",
            round,
            decision.action,
            decision.reason,
            runs,
            elapsed.as_millis()
        );

        TurnReport {
            round,
            decision,
            jump: is_jump(board, decision.action),
            stats,
            elapsed,
            deadline_missed,
        }
    }
}

/// Waits up to `wait` for the rollout task. When it overruns, the results
/// recorded into `stats` so far are finalized and used instead.
async fn join_rollouts(
    task: JoinHandle<()>,
    wait: Duration,
    stats: &Mutex<TurnStats>,
    round: u32,
) -> Result<TurnStats, EngineError> {
    match tokio::time::timeout(wait, task).await {
        Ok(Ok(())) => Ok(stats.lock().clone()),
        Ok(Err(e)) => Err(EngineError::Invariant(format!("rollout task failed: {}", e))),
        Err(_) => {
            let mut partial = stats.lock().clone();
            partial.finalize();
            warn!(
                "Round {}: rollouts did not finish in time, deciding on {} collected results",
                round,
                partial.total_runs()
            );
            Ok(partial)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::RolloutResult;
    use crate::types::Action;

    fn result(seed: Action, survived: u32) -> RolloutResult {
        RolloutResult {
            seed,
            won: false,
            survived,
            survived_opponent: 1,
            rounds: survived,
        }
    }

    #[tokio::test]
    async fn test_overrunning_task_keeps_collected_results() {
        let stats = Arc::new(Mutex::new(TurnStats::new()));
        {
            let mut s = stats.lock();
            s.record(&result(Action::TurnLeft, 9));
            s.record(&result(Action::TurnLeft, 2));
            s.record(&result(Action::SpeedUp, 4));
        }
        let task = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_millis(300)));

        let partial = join_rollouts(task, Duration::from_millis(20), &stats, 7).await.unwrap();
        assert_eq!(partial.total_runs(), 3);
        assert_eq!(partial.get(Action::TurnLeft).survived_list, vec![2, 9]);

        let decision = select_action(&partial, &Config::default_hardcoded().selection);
        assert_eq!(decision.action, Action::TurnLeft);
    }

    #[tokio::test]
    async fn test_finished_task_hands_back_its_stats() {
        let stats = Arc::new(Mutex::new(TurnStats::new()));
        let task_stats = Arc::clone(&stats);
        let task = tokio::task::spawn_blocking(move || {
            let mut s = task_stats.lock();
            s.record(&result(Action::ChangeNothing, 5));
            s.finalize();
        });

        let stats = join_rollouts(task, Duration::from_secs(1), &stats, 1).await.unwrap();
        assert_eq!(stats.total_runs(), 1);
    }
}
