// Game session: reads boards from the server, answers with actions
//
// The session owns the connection and the sinks; the only thing it does
// between receiving a board and sending the answer is awaiting the bot.

use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use std::time::Instant;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::board::Board;
use crate::bot::Bot;
use crate::error::EngineError;
use crate::render::Overview;
use crate::sink::SinkSet;
use crate::types::{ActionMessage, GameMessage};

/// Duplex text channel to the game server
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Next text frame, `None` once the peer has closed the connection
    async fn recv(&mut self) -> Result<Option<String>, EngineError>;

    async fn send(&mut self, text: String) -> Result<(), EngineError>;
}

/// `<api>?key=<key>` with the key query-escaped
pub fn connection_url(api: &str, key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for b in key.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => escaped.push(b as char),
            b' ' => escaped.push('+'),
            _ => escaped.push_str(&format!("%{:02X}", b)),
        }
    }
    format!("{}?key={}", api, escaped)
}

pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    pub async fn connect(api: &str, key: &str) -> Result<Self, EngineError> {
        let url = connection_url(api, key);
        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| EngineError::Transport(format!("cannot connect to {}: {}", api, e)))?;
        info!("Connected to {}", api);
        Ok(WebSocketTransport { stream })
    }
}

impl Transport for WebSocketTransport {
    async fn recv(&mut self) -> Result<Option<String>, EngineError> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(EngineError::Transport(format!("read failed: {}", e))),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(_))) => return Ok(None),
                // ping, pong, binary
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), EngineError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| EngineError::Transport(format!("write failed: {}", e)))
    }
}

/// How the game ended for the self-player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// Self-player still active on the final board
    pub won: bool,
    /// Last round in which the self-player was alive
    pub last_alive: u32,
    pub rounds: u32,
}

pub struct Session<T: Transport> {
    transport: T,
    bot: Bot,
    sinks: SinkSet,
    round: u32,
    last_alive: u32,
    jumps: u32,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, bot: Bot, sinks: SinkSet) -> Self {
        Session {
            transport,
            bot,
            sinks,
            round: 0,
            last_alive: 0,
            jumps: 0,
        }
    }

    /// Plays one game to the end
    ///
    /// Sink failures are logged and never cost a finished game its
    /// outcome; protocol and transport failures end the game immediately.
    pub async fn play(mut self) -> Result<GameOutcome, EngineError> {
        self.sinks.initialise()?;

        match self.run().await {
            Ok(won) => {
                let outcome = GameOutcome {
                    won,
                    last_alive: self.last_alive,
                    rounds: self.round,
                };
                info!(
                    "Game over after {} rounds: {}",
                    outcome.rounds,
                    if won { "win" } else { "loss" }
                );
                if let Err(sink_err) = self.sinks.finish(&outcome) {
                    warn!("Output sinks failed during the game: {}", sink_err);
                }
                Ok(outcome)
            }
            Err(e) => {
                // close files and the dashboard before bailing out
                let outcome = GameOutcome {
                    won: false,
                    last_alive: self.last_alive,
                    rounds: self.round,
                };
                if let Err(sink_err) = self.sinks.finish(&outcome) {
                    warn!("Output sinks failed while shutting down: {}", sink_err);
                }
                Err(e)
            }
        }
    }

    /// Round loop; returns whether the self-player is alive at the end
    async fn run(&mut self) -> Result<bool, EngineError> {
        let mut first_board: Option<Instant> = None;

        loop {
            self.round += 1;
            let round = self.round;
            let text = self
                .transport
                .recv()
                .await?
                .ok_or_else(|| EngineError::Transport("connection closed before the game ended".to_string()))?;
            let started = *first_board.get_or_insert_with(Instant::now);

            let msg = GameMessage::decode(&text)?;
            let board = Board::from_message(&msg, round)?;
            let alive = board.me().map_or(false, |p| p.active);

            if !msg.running || !alive {
                self.sinks.new_data(&Overview {
                    board: &board,
                    round,
                    alive,
                    report: None,
                    jumps: self.jumps,
                    runtime: started.elapsed(),
                });
            }
            if !msg.running {
                return Ok(alive);
            }

            self.sinks.new_round(&board, round);
            if !alive {
                continue;
            }
            self.last_alive = round;

            let deadline = msg
                .deadline
                .as_deref()
                .ok_or_else(|| EngineError::Protocol(format!("round {} is running but has no deadline", round)))?;
            let report = self.bot.get_move(board.clone(), deadline, round).await?;

            let answer = ActionMessage { action: report.decision.action }.encode()?;
            self.transport.send(answer).await?;

            if report.jump {
                self.jumps += 1;
            }
            self.sinks.new_data(&Overview {
                board: &board,
                round,
                alive: true,
                report: Some(&report),
                jumps: self.jumps,
                runtime: started.elapsed(),
            });
        }
    }
}
