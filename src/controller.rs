// Monte-Carlo controller
//
// One rollout worker per rayon thread, one collector on the calling thread.
// Workers share nothing but the read-only board, a cancel flag and the
// bounded result channel.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::{Config, HeuristicsConfig, RolloutConfig, TimingConfig};
use crate::error::EngineError;
use crate::profiler;
use crate::simulator::Simulator;
use crate::stats::TurnStats;
use crate::types::Action;

/// The two per-turn cut-off points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// No rollout starts after this
    pub worker: Instant,
    /// The collector stops reading here
    pub collector: Instant,
}

impl Deadlines {
    /// Derives both deadlines from the server's RFC3339 deadline, capped by
    /// `max` computation time when given
    ///
    /// # Arguments
    /// * `deadline` - Deadline string from the board message
    /// * `max` - Optional cap on compute time (`--max`)
    /// * `timing` - Margins to keep before the server deadline
    pub fn from_server(deadline: &str, max: Option<Duration>, timing: &TimingConfig) -> Result<Self, EngineError> {
        let parsed = DateTime::parse_from_rfc3339(deadline)
            .map_err(|e| EngineError::Protocol(format!("unparseable deadline {:?}: {}", deadline, e)))?;
        // a deadline already in the past leaves no budget at all
        let remaining = (parsed.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let budget = match max {
            Some(cap) if cap < remaining => cap,
            _ => remaining,
        };
        Ok(Self::from_budget(Instant::now(), budget, timing))
    }

    /// Deadlines for a server deadline `budget` after `now`
    pub fn from_budget(now: Instant, budget: Duration, timing: &TimingConfig) -> Self {
        Deadlines {
            worker: now + budget.saturating_sub(timing.worker_margin()),
            collector: now + budget.saturating_sub(timing.collector_margin()),
        }
    }

    /// Deadlines giving workers `compute` of rollout time from now, used
    /// when there is no server clock (replay, tests)
    pub fn for_compute(compute: Duration, timing: &TimingConfig) -> Self {
        Self::from_budget(Instant::now(), compute + timing.worker_margin(), timing)
    }
}

/// Schedules rollouts for one turn and aggregates their results
#[derive(Debug, Clone)]
pub struct MonteCarlo {
    rollout: RolloutConfig,
    heuristics: HeuristicsConfig,
}

impl MonteCarlo {
    pub fn new(config: &Config) -> Self {
        MonteCarlo {
            rollout: config.rollout.clone(),
            heuristics: config.heuristics.clone(),
        }
    }

    pub fn worker_count(&self) -> usize {
        if self.rollout.workers > 0 {
            self.rollout.workers
        } else {
            rayon::current_num_threads().max(1)
        }
    }

    /// Runs rollouts from `board` until the collector deadline and returns
    /// the finalized statistics. Blocks the calling thread.
    pub fn run(&self, board: Arc<Board>, deadlines: Deadlines) -> TurnStats {
        let stats = Mutex::new(TurnStats::new());
        self.run_into(board, deadlines, &stats);
        stats.into_inner()
    }

    /// Like `run`, but records every result into `stats` as it arrives so a
    /// caller that stops waiting can still read what was collected so far.
    /// `stats` is finalized once the collector is done.
    pub fn run_into(&self, board: Arc<Board>, deadlines: Deadlines, stats: &Mutex<TurnStats>) {
        let workers = self.worker_count();
        let (tx, rx) = mpsc::sync_channel(workers);
        let cancel = Arc::new(AtomicBool::new(false));

        for _ in 0..workers {
            let tx = tx.clone();
            let board = Arc::clone(&board);
            let cancel = Arc::clone(&cancel);
            let mut simulator = Simulator::new(&self.rollout, &self.heuristics);
            let worker_deadline = deadlines.worker;

            rayon::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(rand::random());
                while !cancel.load(Ordering::Relaxed) && Instant::now() < worker_deadline {
                    let seed = Action::ALL[rng.random_range(0..Action::ALL.len())];
                    let result = simulator.simulate((*board).clone(), seed, &mut rng);
                    // the collector hung up: turn is over
                    if tx.send(result).is_err() {
                        break;
                    }
                }
                profiler::merge_thread_local();
            });
        }
        drop(tx);

        loop {
            let now = Instant::now();
            if now >= deadlines.collector {
                break;
            }
            match rx.recv_timeout(deadlines.collector - now) {
                Ok(result) => stats.lock().record(&result),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        cancel.store(true, Ordering::Relaxed);
        // unblocks any worker waiting on a full channel
        drop(rx);

        stats.lock().finalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margins_from_budget() {
        let timing = Config::default_hardcoded().timing;
        let now = Instant::now();
        let d = Deadlines::from_budget(now, Duration::from_secs(2), &timing);
        assert_eq!(d.worker, now + Duration::from_millis(1500));
        assert_eq!(d.collector, now + Duration::from_millis(1750));
    }

    #[test]
    fn test_past_deadline_leaves_no_budget() {
        let timing = Config::default_hardcoded().timing;
        let before = Instant::now();
        let d = Deadlines::from_server("2001-01-01T00:00:00Z", None, &timing).unwrap();
        assert!(d.worker <= Instant::now());
        assert!(d.collector >= before);
        assert!(d.collector <= Instant::now());
    }

    #[test]
    fn test_max_caps_the_budget() {
        let timing = Config::default_hardcoded().timing;
        let far = (Utc::now() + chrono::Duration::seconds(60)).to_rfc3339();
        let before = Instant::now();
        let d = Deadlines::from_server(&far, Some(Duration::from_millis(800)), &timing).unwrap();
        assert!(d.collector <= before + Duration::from_millis(800));
        assert!(d.worker >= before + Duration::from_millis(250));
    }

    #[test]
    fn test_run_into_fills_shared_stats() {
        let mut config = Config::default_hardcoded();
        config.rollout.workers = 1;
        let mut board = Board::new(10, 10);
        board.add_player(crate::board::Player {
            id: 1,
            x: 2,
            y: 2,
            direction: crate::types::Direction::Right,
            speed: 1,
            active: true,
            step_counter: 0,
        });

        let stats = Mutex::new(TurnStats::new());
        let deadlines = Deadlines::for_compute(Duration::from_millis(50), &config.timing);
        MonteCarlo::new(&config).run_into(Arc::new(board), deadlines, &stats);

        let stats = stats.into_inner();
        assert!(stats.total_runs() > 0);
        for action in Action::ALL {
            let list = &stats.get(action).survived_list;
            assert!(list.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_rejects_garbage_deadline() {
        let timing = Config::default_hardcoded().timing;
        let err = Deadlines::from_server("tomorrow-ish", None, &timing).unwrap_err();
        assert!(matches!(err, EngineError::Protocol(_)));
    }
}
