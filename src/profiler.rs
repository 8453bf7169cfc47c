//! Opt-in timing counters for the rollout hot path
//!
//! Guards record into thread-local totals; workers merge them into the
//! global table when they exit. Enabled with `--profile <path>`, which also
//! receives the report at the end of the game.

use parking_lot::Mutex;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Rollout,
    Policy,
    FloodFill,
}

impl Category {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            Category::Rollout => 0,
            Category::Policy => 1,
            Category::FloodFill => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Rollout => "Rollouts",
            Category::Policy => "Policy decisions",
            Category::FloodFill => "Flood fills",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Totals {
    pub time_ns: u64,
    pub calls: u64,
}

static ENABLED: AtomicBool = AtomicBool::new(false);
static GLOBAL: Mutex<[Totals; Category::COUNT]> = parking_lot::const_mutex([Totals { time_ns: 0, calls: 0 }; Category::COUNT]);

thread_local! {
    static LOCAL: RefCell<[Totals; Category::COUNT]> = RefCell::new([Totals::default(); Category::COUNT]);
}

pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub struct ProfileGuard {
    start: Instant,
    category: Category,
}

impl ProfileGuard {
    pub fn new(category: Category) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let idx = self.category.index();
        LOCAL.with(|l| {
            let mut l = l.borrow_mut();
            l[idx].time_ns += elapsed_ns;
            l[idx].calls += 1;
        });
    }
}

/// Moves this thread's totals into the global table
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    let local = LOCAL.with(|l| std::mem::take(&mut *l.borrow_mut()));
    let mut global = GLOBAL.lock();
    for (g, l) in global.iter_mut().zip(local.iter()) {
        g.time_ns += l.time_ns;
        g.calls += l.calls;
    }
}

pub fn snapshot(category: Category) -> Totals {
    GLOBAL.lock()[category.index()]
}

pub fn report(total_time_ms: u64) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out, "                 PERFORMANCE PROFILE");
    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out, "Wall time: {}ms (summed over all workers below)\n", total_time_ms);

    for category in [Category::Rollout, Category::Policy, Category::FloodFill] {
        let t = snapshot(category);
        let avg_us = if t.calls > 0 {
            t.time_ns as f64 / (t.calls as f64 * 1000.0)
        } else {
            0.0
        };
        let _ = writeln!(out, "{}:", category.label());
        let _ = writeln!(out, "  Time:     {:.2}ms", t.time_ns as f64 / 1_000_000.0);
        let _ = writeln!(out, "  Calls:    {}", t.calls);
        let _ = writeln!(out, "  Avg:      {:.2}µs/call\n", avg_us);
    }

    out
}

pub fn write_report<P: AsRef<Path>>(path: P, total_time_ms: u64) -> Result<(), EngineError> {
    merge_thread_local();
    std::fs::write(path.as_ref(), report(total_time_ms)).map_err(|e| {
        EngineError::Sink(format!(
            "failed to write profile to {}: {}",
            path.as_ref().display(),
            e
        ))
    })
}
