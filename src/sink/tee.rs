// Plain-text game log written to a file (`--print`)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::Sink;
use crate::error::EngineError;
use crate::render::{overview_lines, render_board, result_line, Overview};
use crate::session::GameOutcome;

pub struct TeeSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl TeeSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        TeeSink {
            path: path.into(),
            file: None,
        }
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, EngineError> {
        self.file
            .as_mut()
            .ok_or_else(|| EngineError::Sink(format!("{} is not open", self.path.display())))
    }
}

impl Sink for TeeSink {
    fn initialise(&mut self) -> Result<(), EngineError> {
        if self.file.is_some() {
            return Err(EngineError::Sink("file already opened".to_string()));
        }
        let file = File::create(&self.path)
            .map_err(|e| EngineError::Sink(format!("cannot create {}: {}", self.path.display(), e)))?;
        self.file = Some(BufWriter::new(file));
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError> {
        let mut text = format!(
            "\n{}\n\nRound {} - You: {}\n",
            render_board(data.board, false),
            data.round,
            data.board.you
        );
        for line in overview_lines(data, false) {
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');

        let out = self.writer()?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        let line = result_line(outcome.won, outcome.last_alive, outcome.rounds);
        let mut out = self
            .file
            .take()
            .ok_or_else(|| EngineError::Sink(format!("{} is not open", self.path.display())))?;
        write!(out, "\n{}", line)?;
        out.flush()?;
        Ok(())
    }
}
