// Replay module for re-deciding recorded turns
//
// This module provides functionality to:
// 1. Parse JSONL state dumps written by `--dump`
// 2. Re-run the decision engine on every recorded board
// 3. Compare recorded vs replayed actions

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::board::Board;
use crate::bot::Bot;
use crate::config::Config;
use crate::controller::Deadlines;
use crate::selector::Reason;
use crate::sink::DumpEntry;
use crate::types::Action;

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub round: u32,
    pub original_action: Action,
    pub replayed_action: Action,
    pub replayed_reason: Reason,
    pub matches: bool,
    pub runs: u64,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing state dumps
pub struct ReplayEngine {
    bot: Bot,
    budget: Duration,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `budget` - Rollout time per replayed turn
    /// * `verbose` - Log every turn
    pub fn new(config: Config, budget: Duration, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config, None),
            budget,
            verbose,
        }
    }

    /// Loads all entries from a JSONL dump
    pub fn load_dump_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DumpEntry>, String> {
        let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open dump file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DumpEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} dump entries", entries.len());
        Ok(entries)
    }

    /// Re-decides a single recorded turn and compares the result
    pub fn replay_entry(&self, entry: &DumpEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying round {}...", entry.round);
        }

        let board = Board::from_message(&entry.state, entry.round).map_err(|e| e.to_string())?;
        let deadlines = Deadlines::for_compute(self.budget, &self.bot.config().timing);
        let report = self.bot.decide_now(Arc::new(board), deadlines, entry.round);

        let replayed_action = report.decision.action;
        let matches = replayed_action == entry.action;

        let result = ReplayResult {
            round: entry.round,
            original_action: entry.action,
            replayed_action,
            replayed_reason: report.decision.reason,
            matches,
            runs: report.stats.total_runs(),
            computation_time_ms: report.elapsed.as_millis(),
        };

        if self.verbose {
            if matches {
                info!(
                    "Round {}: ✓ MATCH - {} ({}, {} rollouts, {}ms)",
                    entry.round, replayed_action, result.replayed_reason, result.runs, result.computation_time_ms
                );
            } else {
                warn!(
                    "Round {}: ✗ MISMATCH - Original: {} ({}), Replayed: {} ({}, {} rollouts)",
                    entry.round, entry.action, entry.reason, replayed_action, result.replayed_reason, result.runs
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries
    pub fn replay_all(&self, entries: &[DumpEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", entry.round, e);
                }
            }
        }

        results
    }

    /// Replays specific rounds
    pub fn replay_rounds(&self, entries: &[DumpEntry], rounds: &[u32]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for round in rounds {
            let entry = entries
                .iter()
                .find(|e| e.round == *round)
                .ok_or_else(|| format!("Round {} not found in dump file", round))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", round, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a summary report
    pub fn print_report(&self, results: &[ReplayResult], stats: &ReplayStats) {
        println!("\n========== REPLAY REPORT ==========");
        println!("Total rounds analyzed: {}", stats.total_turns);
        println!("Matches: {}", stats.matches);
        println!("Mismatches: {}", stats.mismatches);
        println!("Match rate: {:.2}%", stats.match_rate);

        let mismatched: Vec<&ReplayResult> = results.iter().filter(|r| !r.matches).collect();
        if !mismatched.is_empty() {
            println!("\n---------- MISMATCHES ----------");
            for r in mismatched {
                println!(
                    "Round {:>4}: recorded {:<15} replayed {:<15} ({})",
                    r.round,
                    r.original_action.as_str(),
                    r.replayed_action.as_str(),
                    r.replayed_reason
                );
            }
        }
        println!("===================================\n");
    }
}
