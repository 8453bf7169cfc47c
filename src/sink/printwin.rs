// One-line result file (`--printwin`)

use std::fs;
use std::path::PathBuf;

use super::Sink;
use crate::error::EngineError;
use crate::render::{result_line, Overview};
use crate::session::GameOutcome;

pub struct PrintWinSink {
    path: PathBuf,
    initialised: bool,
}

impl PrintWinSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        PrintWinSink {
            path: path.into(),
            initialised: false,
        }
    }
}

impl Sink for PrintWinSink {
    fn initialise(&mut self) -> Result<(), EngineError> {
        self.initialised = true;
        Ok(())
    }

    fn new_data(&mut self, _data: &Overview<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        if !self.initialised {
            return Ok(());
        }
        let line = result_line(outcome.won, outcome.last_alive, outcome.rounds);
        fs::write(&self.path, format!("\n{}", line))
            .map_err(|e| EngineError::Sink(format!("cannot write {}: {}", self.path.display(), e)))
    }
}
