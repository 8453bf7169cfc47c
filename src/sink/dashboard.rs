// Full-screen terminal dashboard (`--ui`)
//
// Every decided turn is kept as a rendered frame. The terminal stays in
// line mode: a key followed by Enter walks through the history while the
// game keeps running.
//
//   h / <   previous turn      l / >   next turn
//   0       first turn         $       latest turn, follow the game

use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use super::Sink;
use crate::board::Board;
use crate::error::EngineError;
use crate::render::{overview_lines, render_board, result_line, Overview};
use crate::session::GameOutcome;

const CLEAR: &str = "\x1b[2J\x1b[H";

/// One step through the turn history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    First,
    Previous,
    Next,
    Last,
}

impl Nav {
    pub fn from_input(line: &str) -> Option<Nav> {
        match line.trim() {
            "0" | "home" => Some(Nav::First),
            "h" | "<" | "left" => Some(Nav::Previous),
            "l" | ">" | "right" => Some(Nav::Next),
            "$" | "end" => Some(Nav::Last),
            _ => None,
        }
    }
}

/// Rendered turns plus the one on screen
#[derive(Debug, Default)]
pub struct History {
    status: &'static str,
    frames: Vec<String>,
    /// `None` follows the latest frame
    cursor: Option<usize>,
    result: Option<String>,
}

impl History {
    pub fn push(&mut self, frame: String) {
        self.frames.push(frame);
    }

    pub fn navigate(&mut self, nav: Nav) {
        let Some(last) = self.frames.len().checked_sub(1) else {
            return;
        };
        let at = self.cursor.unwrap_or(last);
        self.cursor = match nav {
            Nav::First => Some(0),
            Nav::Previous => Some(at.saturating_sub(1)),
            Nav::Next if at + 1 >= last => None,
            Nav::Next => Some(at + 1),
            Nav::Last => None,
        };
    }

    /// Index and text of the frame on screen
    pub fn current(&self) -> Option<(usize, &str)> {
        let last = self.frames.len().checked_sub(1)?;
        let at = self.cursor.unwrap_or(last).min(last);
        Some((at, self.frames[at].as_str()))
    }

    pub fn is_live(&self) -> bool {
        self.cursor.is_none()
    }

    fn screen(&self) -> String {
        let mut out = String::from(CLEAR);
        match self.current() {
            None => out.push_str(&format!("[{}]\nWaiting for game\n", self.status.bold())),
            Some((at, frame)) => {
                let mode = if self.is_live() { "live" } else { "h/l/0/$ + Enter" };
                out.push_str(&format!(
                    "[{}] turn {}/{} ({})\n{}\n",
                    self.status.bold(),
                    at + 1,
                    self.frames.len(),
                    mode,
                    frame
                ));
            }
        }
        if let Some(result) = &self.result {
            out.push_str(&format!("\n{}\n", result));
        }
        out
    }
}

fn draw(history: &History) -> Result<(), EngineError> {
    let mut out = io::stdout().lock();
    out.write_all(history.screen().as_bytes())?;
    out.flush()?;
    Ok(())
}

pub struct DashboardSink {
    history: Arc<Mutex<History>>,
}

impl DashboardSink {
    pub fn new() -> Self {
        let history = History {
            status: "ready",
            ..History::default()
        };
        DashboardSink {
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// Reads navigation keys from stdin until it closes; the thread dies
    /// with the process
    fn spawn_keys(&self) -> Result<(), EngineError> {
        let history = Arc::clone(&self.history);
        std::thread::Builder::new()
            .name("dashboard-keys".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if let Some(nav) = Nav::from_input(&line) {
                        let mut history = history.lock();
                        history.navigate(nav);
                        if let Err(e) = draw(&history) {
                            log::warn!("Dashboard redraw failed: {}", e);
                            break;
                        }
                    }
                }
            })?;
        Ok(())
    }
}

impl Default for DashboardSink {
    fn default() -> Self {
        DashboardSink::new()
    }
}

impl Sink for DashboardSink {
    fn initialise(&mut self) -> Result<(), EngineError> {
        if !io::stdout().is_terminal() {
            return Err(EngineError::Sink("the dashboard needs stdout to be a terminal".to_string()));
        }
        if io::stdin().is_terminal() {
            self.spawn_keys()?;
        }
        draw(&self.history.lock())
    }

    fn new_round(&mut self, _board: &Board, _round: u32) -> Result<(), EngineError> {
        self.history.lock().status = "running";
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError> {
        let mut frame = render_board(data.board, true);
        frame.push_str("\n\n");
        frame.push_str(&overview_lines(data, true).join("\n"));

        let mut history = self.history.lock();
        history.push(frame);
        draw(&history)
    }

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        let line = result_line(outcome.won, outcome.last_alive, outcome.rounds);
        let line = if outcome.won { line.green() } else { line.red() };

        let mut history = self.history.lock();
        history.status = "finished";
        history.result = Some(line.to_string());
        draw(&history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(frames: &[&str]) -> History {
        let mut history = History::default();
        for frame in frames {
            history.push(frame.to_string());
        }
        history
    }

    #[test]
    fn test_follows_the_latest_turn() {
        let mut h = history(&["t1", "t2"]);
        assert_eq!(h.current(), Some((1, "t2")));
        h.push("t3".to_string());
        assert_eq!(h.current(), Some((2, "t3")));
        assert!(h.is_live());
    }

    #[test]
    fn test_browsing_pins_the_view() {
        let mut h = history(&["t1", "t2", "t3"]);
        h.navigate(Nav::Previous);
        h.navigate(Nav::Previous);
        h.navigate(Nav::Previous);
        assert_eq!(h.current(), Some((0, "t1")));

        // new turns arrive while looking back
        h.push("t4".to_string());
        assert_eq!(h.current(), Some((0, "t1")));
        assert!(!h.is_live());

        h.navigate(Nav::Next);
        assert_eq!(h.current(), Some((1, "t2")));
        h.navigate(Nav::Last);
        assert_eq!(h.current(), Some((3, "t4")));
        assert!(h.is_live());
    }

    #[test]
    fn test_stepping_onto_the_last_turn_goes_live() {
        let mut h = history(&["t1", "t2", "t3"]);
        h.navigate(Nav::First);
        h.navigate(Nav::Next);
        assert_eq!(h.current(), Some((1, "t2")));
        h.navigate(Nav::Next);
        assert!(h.is_live());
        h.push("t4".to_string());
        assert_eq!(h.current(), Some((3, "t4")));
    }

    #[test]
    fn test_empty_history_ignores_keys() {
        let mut h = History::default();
        h.navigate(Nav::Previous);
        assert_eq!(h.current(), None);
        assert!(h.is_live());
        assert!(h.screen().contains("Waiting for game"));
    }

    #[test]
    fn test_screen_shows_position_and_result() {
        let mut h = history(&["t1", "t2"]);
        h.navigate(Nav::First);
        h.result = Some("Loss! (3 / 7)".to_string());
        let screen = h.screen();
        assert!(screen.contains("turn 1/2"));
        assert!(screen.contains("t1"));
        assert!(screen.ends_with("Loss! (3 / 7)\n"));
    }

    #[test]
    fn test_keys() {
        assert_eq!(Nav::from_input("h\n"), Some(Nav::Previous));
        assert_eq!(Nav::from_input(" > "), Some(Nav::Next));
        assert_eq!(Nav::from_input("0"), Some(Nav::First));
        assert_eq!(Nav::from_input("end"), Some(Nav::Last));
        assert_eq!(Nav::from_input("q"), None);
    }
}
