// Configuration module for reading Speed.toml
// The file is optional: without it the hardcoded defaults below apply.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::policy::PolicyKind;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub selection: SelectionConfig,
    pub rollout: RolloutConfig,
    pub heuristics: HeuristicsConfig,
}

/// Deadline margins against the server clock
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Workers stop starting rollouts this long before the server deadline
    pub worker_margin_ms: u64,
    /// The collector finalizes this long before the server deadline
    pub collector_margin_ms: u64,
    /// Smallest accepted `--max` value
    pub min_max_duration_ms: u64,
    /// Per-turn budget used by the replay tool
    pub replay_budget_ms: u64,
}

impl TimingConfig {
    pub fn worker_margin(&self) -> Duration {
        Duration::from_millis(self.worker_margin_ms)
    }

    pub fn collector_margin(&self) -> Duration {
        Duration::from_millis(self.collector_margin_ms)
    }

    pub fn min_max_duration(&self) -> Duration {
        Duration::from_millis(self.min_max_duration_ms)
    }
}

/// Action selection thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    /// Tier 1 picks an action only when its win rate is strictly above this
    pub win_threshold: f64,
    /// Tier 2 ignores actions whose win rate is not strictly above this
    pub viability_floor: f64,
}

/// One entry of the weighted opponent pool
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PoolEntry {
    pub policy: PolicyKind,
    pub weight: u32,
}

/// Rollout setup
#[derive(Debug, Deserialize, Clone)]
pub struct RolloutConfig {
    /// Number of rollout workers; 0 means one per logical CPU
    pub workers: usize,
    /// Policy driving the self-player after the seed action
    pub self_policy: PolicyKind,
    /// Policy driving opponents on the first simulated round
    pub first_round_policy: PolicyKind,
    /// Opponent seats draw their policy from this pool at rollout start
    pub opponent_pool: Vec<PoolEntry>,
}

/// Heuristic policy constants
#[derive(Debug, Deserialize, Clone)]
pub struct HeuristicsConfig {
    /// Jumping snail switches to jump seeking below this many free cells
    pub jumping_snail_free_threshold: usize,
    /// Flood-fill cutoff for the largest-free policies
    pub largest_free_cutoff: usize,
    /// Cells checked beyond a move by the super snail
    pub super_snail_lookahead: i32,
    /// Rounds simulated by the meta policy per candidate
    pub meta_lookahead_rounds: u32,
    /// Policies the meta policy chooses from
    pub meta_members: Vec<PolicyKind>,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Speed.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Speed.toml in the working directory
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Speed.toml")
    }

    /// Checks values the types alone cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.timing.collector_margin_ms > self.timing.worker_margin_ms {
            return Err("collector_margin_ms must not exceed worker_margin_ms".to_string());
        }
        if self.rollout.opponent_pool.iter().all(|e| e.weight == 0) {
            return Err("opponent_pool needs at least one entry with a positive weight".to_string());
        }
        if self.heuristics.meta_members.contains(&PolicyKind::Meta) {
            return Err("meta_members must not contain meta".to_string());
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values in Speed.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                worker_margin_ms: 500,
                collector_margin_ms: 250,
                min_max_duration_ms: 500,
                replay_budget_ms: 1000,
            },
            selection: SelectionConfig {
                win_threshold: 0.85,
                viability_floor: 0.10,
            },
            rollout: RolloutConfig {
                workers: 0,
                self_policy: PolicyKind::SuperRandom,
                first_round_policy: PolicyKind::BadRandom,
                opponent_pool: vec![
                    PoolEntry { policy: PolicyKind::SuperRandom, weight: 8 },
                    PoolEntry { policy: PolicyKind::Random, weight: 2 },
                    PoolEntry { policy: PolicyKind::Snail, weight: 2 },
                    PoolEntry { policy: PolicyKind::SuperSnail, weight: 1 },
                    PoolEntry { policy: PolicyKind::JumpingSnail, weight: 2 },
                    PoolEntry { policy: PolicyKind::LargestFree, weight: 2 },
                    PoolEntry { policy: PolicyKind::JumpingLargestFree, weight: 1 },
                    PoolEntry { policy: PolicyKind::Mirror, weight: 1 },
                    PoolEntry { policy: PolicyKind::Jump, weight: 1 },
                ],
            },
            heuristics: HeuristicsConfig {
                jumping_snail_free_threshold: 50,
                largest_free_cutoff: 150,
                super_snail_lookahead: 3,
                meta_lookahead_rounds: 6,
                meta_members: vec![
                    PolicyKind::Snail,
                    PolicyKind::SuperSnail,
                    PolicyKind::LargestFree,
                    PolicyKind::JumpingSnail,
                    PolicyKind::SuperRandom,
                ],
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Speed.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

/// Parses a duration written like `750ms`, `1.5s` or `1m30s`
///
/// Accepted units are `ns`, `us`, `µs`, `ms`, `s`, `m` and `h`; a bare `0`
/// is allowed as well.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = 0.0_f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {:?}", text));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid number in duration {:?}", text))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("missing unit in duration {:?}", text)),
            unit => return Err(format!("unknown unit {:?} in duration {:?}", unit, text)),
        };
        rest = &rest[unit_len..];
        total += value * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).map_err(|e| format!("invalid duration {:?}: {}", text, e))
}
