// Per-turn state dump (`--dump`)
//
// One JSON object per decided turn, flushed as it is written so a crashed
// game still leaves a usable file. The replay tool reads it back.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::Sink;
use crate::error::EngineError;
use crate::render::Overview;
use crate::selector::Reason;
use crate::session::GameOutcome;
use crate::types::{Action, GameMessage};

/// A single dump line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpEntry {
    pub round: u32,
    pub action: Action,
    pub reason: Reason,
    pub runs: u64,
    pub state: GameMessage,
    pub timestamp: String,
}

pub struct DumpSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    written: usize,
}

impl DumpSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        DumpSink {
            path: path.into(),
            file: None,
            written: 0,
        }
    }
}

impl Sink for DumpSink {
    fn initialise(&mut self) -> Result<(), EngineError> {
        let file = File::create(&self.path)
            .map_err(|e| EngineError::Sink(format!("cannot create {}: {}", self.path.display(), e)))?;
        log::info!("Dumping game states to {}", self.path.display());
        self.file = Some(BufWriter::new(file));
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError> {
        let Some(report) = data.report else {
            return Ok(());
        };
        let Some(out) = self.file.as_mut() else {
            return Ok(());
        };

        let entry = DumpEntry {
            round: data.round,
            action: report.decision.action,
            reason: report.decision.reason,
            runs: report.stats.total_runs(),
            state: data.board.to_message(None),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let line = serde_json::to_string(&entry).map_err(|e| EngineError::Sink(e.to_string()))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self, _outcome: &GameOutcome) -> Result<(), EngineError> {
        if let Some(mut out) = self.file.take() {
            out.flush()?;
            log::info!("Wrote {} turns to {}", self.written, self.path.display());
        }
        Ok(())
    }
}
