// Connected free-space counting
//
// The visited buffer is owned by the instance and reused across calls; an
// instance must not be shared between threads, each policy keeps its own.

use crate::board::Board;
use crate::profiler::{Category, ProfileGuard};

#[derive(Debug, Default, Clone)]
pub struct FloodFill {
    visited: Vec<bool>,
    stack: Vec<(i32, i32)>,
}

impl FloodFill {
    pub fn new() -> Self {
        FloodFill::default()
    }

    /// Counts empty cells 4-connected to `(x, y)`.
    ///
    /// `(x, y)` itself is counted only if empty, but its neighbours are
    /// explored either way, so a player's head position works as a start.
    /// With a cutoff the walk stops as soon as the count exceeds it, which
    /// keeps the result between `min(true_count, cutoff + 1)` and the true
    /// count.
    pub fn free_reachable(&mut self, board: &Board, x: i32, y: i32, cutoff: Option<usize>) -> usize {
        self.free_reachable_excluding(board, x, y, cutoff, &[])
    }

    /// Same as `free_reachable`, treating every position in `blocked` as
    /// stamped. Used to evaluate a destination before the move that leads
    /// there is applied.
    pub fn free_reachable_excluding(
        &mut self,
        board: &Board,
        x: i32,
        y: i32,
        cutoff: Option<usize>,
        blocked: &[(i32, i32)],
    ) -> usize {
        let _guard = ProfileGuard::new(Category::FloodFill);

        let size = (board.width() * board.height()) as usize;
        if self.visited.len() != size {
            self.visited = vec![false; size];
        } else {
            self.visited.iter_mut().for_each(|v| *v = false);
        }
        self.stack.clear();

        for &(bx, by) in blocked {
            if board.in_bounds(bx, by) {
                self.visited[board.index(bx, by)] = true;
            }
        }

        let mut count = 0;

        if board.in_bounds(x, y) {
            let idx = board.index(x, y);
            if !self.visited[idx] {
                self.visited[idx] = true;
                if board.cell(x, y) == 0 {
                    count += 1;
                }
            }
        }
        self.push_neighbours(board, x, y);

        while let Some((cx, cy)) = self.stack.pop() {
            if let Some(limit) = cutoff {
                if count > limit {
                    break;
                }
            }

            let idx = board.index(cx, cy);
            if self.visited[idx] {
                continue;
            }
            self.visited[idx] = true;

            if board.cell(cx, cy) != 0 {
                continue;
            }
            count += 1;
            self.push_neighbours(board, cx, cy);
        }

        count
    }

    fn push_neighbours(&mut self, board: &Board, x: i32, y: i32) {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if board.in_bounds(nx, ny) && !self.visited[board.index(nx, ny)] {
                self.stack.push((nx, ny));
            }
        }
    }
}

/// One-shot convenience wrapper allocating its own scratch
pub fn free_reachable(board: &Board, x: i32, y: i32, cutoff: Option<usize>) -> usize {
    FloodFill::new().free_reachable(board, x, y, cutoff)
}
