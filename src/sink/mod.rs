// Output sinks
//
// Every sink sees the same three events: a new board arrived, a turn was
// decided (or skipped because we are out), and the game ended. Sinks are
// selected from the command line and fanned out by `SinkSet`.

mod console;
mod dashboard;
mod dump;
mod printwin;
mod tee;

pub use self::console::LogSink;
pub use self::dashboard::DashboardSink;
pub use self::dump::{DumpEntry, DumpSink};
pub use self::printwin::PrintWinSink;
pub use self::tee::TeeSink;

use crate::board::Board;
use crate::error::EngineError;
use crate::render::Overview;
use crate::session::GameOutcome;

pub trait Sink: Send {
    /// Called once before the first board; a failure aborts the game
    fn initialise(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn new_round(&mut self, _board: &Board, _round: u32) -> Result<(), EngineError> {
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError>;

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError>;
}

/// Fans every event out to all configured sinks
///
/// Errors after initialisation do not stop the game: they are logged and
/// the first one is returned from `finish`.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn Sink>>,
    failure: Option<EngineError>,
}

impl SinkSet {
    pub fn new() -> Self {
        SinkSet::default()
    }

    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn initialise(&mut self) -> Result<(), EngineError> {
        for sink in &mut self.sinks {
            sink.initialise()?;
        }
        Ok(())
    }

    fn remember(&mut self, result: Result<(), EngineError>) {
        if let Err(e) = result {
            log::error!("Output sink failed: {}", e);
            self.failure.get_or_insert(e);
        }
    }

    pub fn new_round(&mut self, board: &Board, round: u32) {
        for i in 0..self.sinks.len() {
            let result = self.sinks[i].new_round(board, round);
            self.remember(result);
        }
    }

    pub fn new_data(&mut self, data: &Overview<'_>) {
        for i in 0..self.sinks.len() {
            let result = self.sinks[i].new_data(data);
            self.remember(result);
        }
    }

    pub fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        for i in 0..self.sinks.len() {
            let result = self.sinks[i].finish(outcome);
            self.remember(result);
        }
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
