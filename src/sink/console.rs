// Default sink: boards and overviews through the log facade

use log::info;

use super::Sink;
use crate::board::Board;
use crate::error::EngineError;
use crate::render::{alive_line, overview_lines, render_board, result_line, Overview};
use crate::session::GameOutcome;

pub struct LogSink {
    colour: bool,
}

impl LogSink {
    pub fn new(colour: bool) -> Self {
        LogSink { colour }
    }
}

impl Sink for LogSink {
    fn initialise(&mut self) -> Result<(), EngineError> {
        info!("Waiting for game");
        Ok(())
    }

    fn new_round(&mut self, board: &Board, round: u32) -> Result<(), EngineError> {
        info!(
            "Round {} - You: {} ({})\n{}",
            round,
            board.you,
            alive_line(board),
            render_board(board, self.colour)
        );
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError> {
        let text: Vec<String> = overview_lines(data, false)
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect();
        info!("{}", text.join("\n"));
        Ok(())
    }

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        info!("{}", result_line(outcome.won, outcome.last_alive, outcome.rounds));
        Ok(())
    }
}
