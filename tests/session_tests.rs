//! Game session tests against an in-memory transport

use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;

use speed_montecarlo::board::Board;
use speed_montecarlo::bot::Bot;
use speed_montecarlo::config::Config;
use speed_montecarlo::error::EngineError;
use speed_montecarlo::render::Overview;
use speed_montecarlo::session::{GameOutcome, Session, Transport};
use speed_montecarlo::sink::{Sink, SinkSet};
use speed_montecarlo::types::{Action, ActionMessage, GameMessage};

/// Replays canned server frames and keeps everything sent back
struct MockTransport {
    frames: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    fn new(frames: Vec<String>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport {
            frames: frames.into(),
            sent: Arc::clone(&sent),
        };
        (transport, sent)
    }
}

impl Transport for MockTransport {
    async fn recv(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.frames.pop_front())
    }

    async fn send(&mut self, text: String) -> Result<(), EngineError> {
        self.sent.lock().push(text);
        Ok(())
    }
}

/// Logs sink events as short strings
struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

impl Sink for RecordingSink {
    fn new_round(&mut self, _board: &Board, round: u32) -> Result<(), EngineError> {
        self.events.lock().push(format!("round {}", round));
        Ok(())
    }

    fn new_data(&mut self, data: &Overview<'_>) -> Result<(), EngineError> {
        let action = data.report.map_or("-", |r| r.decision.action.as_str());
        self.events.lock().push(format!("data {} {}", data.round, action));
        Ok(())
    }

    fn finish(&mut self, outcome: &GameOutcome) -> Result<(), EngineError> {
        self.events
            .lock()
            .push(format!("finish won={} rounds={}", outcome.won, outcome.rounds));
        Ok(())
    }
}

fn recording_sinks() -> (SinkSet, Arc<Mutex<Vec<String>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut sinks = SinkSet::new();
    sinks.push(Box::new(RecordingSink {
        events: Arc::clone(&events),
    }));
    (sinks, events)
}

fn bot() -> Bot {
    let mut config = Config::default_hardcoded();
    config.rollout.workers = 2;
    Bot::new(config, None)
}

/// 3x3 board where player 1 can only survive by turning right
fn forced_frame(deadline_ms: i64) -> String {
    let deadline = (chrono::Utc::now() + chrono::Duration::milliseconds(deadline_ms)).to_rfc3339();
    json!({
        "width": 3,
        "height": 3,
        "cells": [[1, 0, 0], [2, 0, 0], [0, 0, 0]],
        "players": {
            "1": { "x": 0, "y": 0, "direction": "up", "speed": 1, "active": true },
            "2": { "x": 0, "y": 1, "direction": "down", "speed": 1, "active": true, "name": "other" }
        },
        "you": 1,
        "running": true,
        "deadline": deadline
    })
    .to_string()
}

fn final_frame(self_active: bool) -> String {
    json!({
        "width": 3,
        "height": 3,
        "cells": [[1, 1, 0], [-1, 0, 0], [0, 0, 0]],
        "players": {
            "1": { "x": 1, "y": 0, "direction": "right", "speed": 1, "active": self_active },
            "2": { "x": 0, "y": 2, "direction": "down", "speed": 1, "active": false }
        },
        "you": 1,
        "running": false
    })
    .to_string()
}

#[tokio::test]
async fn test_plays_a_short_game() {
    let (transport, sent) = MockTransport::new(vec![forced_frame(900), final_frame(true)]);
    let (sinks, events) = recording_sinks();

    let outcome = Session::new(transport, bot(), sinks).play().await.unwrap();
    assert_eq!(
        outcome,
        GameOutcome {
            won: true,
            last_alive: 1,
            rounds: 2,
        }
    );

    let sent = sent.lock();
    assert_eq!(sent.len(), 1);
    let answer = ActionMessage::decode(&sent[0]).unwrap();
    assert_eq!(answer.action, Action::TurnRight);

    let events = events.lock();
    assert_eq!(
        *events,
        vec![
            "round 1".to_string(),
            "data 1 turn_right".to_string(),
            "data 2 -".to_string(),
            "finish won=true rounds=2".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_loss_is_reported() {
    let (transport, _sent) = MockTransport::new(vec![forced_frame(900), final_frame(false)]);
    let (sinks, _events) = recording_sinks();

    let outcome = Session::new(transport, bot(), sinks).play().await.unwrap();
    assert!(!outcome.won);
    assert_eq!(outcome.rounds, 2);
}

/// Fails every write, like a dump file on a full disk
struct BrokenSink;

impl Sink for BrokenSink {
    fn new_data(&mut self, _data: &Overview<'_>) -> Result<(), EngineError> {
        Err(EngineError::Sink("no space left on device".to_string()))
    }

    fn finish(&mut self, _outcome: &GameOutcome) -> Result<(), EngineError> {
        Err(EngineError::Sink("no space left on device".to_string()))
    }
}

#[tokio::test]
async fn test_failing_sink_keeps_the_outcome() {
    let (transport, sent) = MockTransport::new(vec![forced_frame(900), final_frame(true)]);
    let (mut sinks, events) = recording_sinks();
    sinks.push(Box::new(BrokenSink));

    let outcome = Session::new(transport, bot(), sinks).play().await.unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(sent.lock().len(), 1);
    // the healthy sink still saw the end of the game
    assert_eq!(events.lock().last().map(String::as_str), Some("finish won=true rounds=2"));
}

#[tokio::test]
async fn test_closed_connection_is_a_transport_error() {
    let (transport, _sent) = MockTransport::new(vec![forced_frame(900)]);
    let (sinks, events) = recording_sinks();

    let err = Session::new(transport, bot(), sinks).play().await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
    // sinks are still closed with a loss
    assert_eq!(events.lock().last().map(String::as_str), Some("finish won=false rounds=2"));
}

#[tokio::test]
async fn test_malformed_frame_is_a_protocol_error() {
    let (transport, sent) = MockTransport::new(vec!["{\"width\": 3".to_string()]);
    let (sinks, _events) = recording_sinks();

    let err = Session::new(transport, bot(), sinks).play().await.unwrap_err();
    assert!(matches!(err, EngineError::Protocol(_)));
    assert!(sent.lock().is_empty());
}

#[test]
fn test_server_frame_round_trip() {
    let text = final_frame(true);
    let msg = GameMessage::decode(&text).unwrap();
    assert_eq!(msg.players.len(), 2);
    assert_eq!(msg.deadline, None);

    let board = Board::from_message(&msg, 7).unwrap();
    assert_eq!(board.me().map(|p| p.step_counter), Some(6));
    assert_eq!(board.cell(0, 1), -1);

    let back = board.to_message(None);
    assert_eq!(back.cells, msg.cells);
    assert_eq!(back.players, msg.players);
    assert_eq!(back.you, msg.you);
    assert!(!back.running);
}

#[test]
fn test_invalid_boards_are_rejected() {
    let mut msg = GameMessage::decode(&final_frame(true)).unwrap();
    msg.you = 5;
    assert!(matches!(Board::from_message(&msg, 1), Err(EngineError::Invariant(_))));

    let mut msg = GameMessage::decode(&final_frame(true)).unwrap();
    msg.cells.pop();
    assert!(matches!(Board::from_message(&msg, 1), Err(EngineError::Protocol(_))));
}
